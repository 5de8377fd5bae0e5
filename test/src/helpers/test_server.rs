use std::time::{Duration, Instant};

use devlink_server::{
    shared::{Entities, EntityHandle},
    Server, ServerConfig, ServerEvents,
};

use crate::{helpers::TestClient, local_socket::{LocalAcceptor, LocalConnector}};

/// A [`Server`] listening on the in-memory transport, with its own entity
/// registry and a clock that only moves when told to
pub struct TestServer {
    pub server: Server,
    pub entities: Entities,
    pub now: Instant,
    connector: LocalConnector,
}

impl TestServer {
    pub fn new(config: ServerConfig, entities: Entities) -> Self {
        let now = Instant::now();
        let mut server = Server::new(config, now);
        let (acceptor, connector) = LocalAcceptor::new();
        server.listen(acceptor);
        Self {
            server,
            entities,
            now,
            connector,
        }
    }

    pub fn with_entities(entities: Entities) -> Self {
        Self::new(ServerConfig::default(), entities)
    }

    /// Opens a client; the server accepts it on the next poll
    pub fn connect(&self) -> TestClient {
        TestClient::connect(&self.connector)
    }

    /// Connects a client and completes the handshake without a password
    pub fn connect_authenticated(&mut self) -> TestClient {
        let mut client = self.connect();
        client.hello();
        self.poll();
        client.receive();
        client
    }

    pub fn poll(&mut self) -> ServerEvents {
        self.server.poll(&self.entities, self.now)
    }

    /// Moves the clock forward by `by`, then polls
    pub fn advance(&mut self, by: Duration) -> ServerEvents {
        self.now += by;
        self.poll()
    }

    pub fn send_state(&mut self, entity: EntityHandle) {
        self.server.send_state(&self.entities, entity, self.now);
    }

    pub fn send_event(&mut self, entity: EntityHandle, event_type: &str) {
        self.server
            .send_event(&self.entities, entity, event_type, self.now);
    }
}
