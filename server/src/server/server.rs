use std::{mem, time::Instant};

use log::{debug, info, warn};

use devlink_shared::{
    entities::Event, messages::HomeassistantActionRequest, Entities, Entity, EntityHandle,
    EntityKind, LogLevel, Timer,
};

use crate::{
    connection::{Connection, ConnectionContext, ConnectionKey, ConnectionState},
    error::{DevlinkServerError, PskError, PskStoreError},
    events::{RebootRequest, ServerEvents},
    transport::Acceptor,
};

use super::{ActionCallRegistry, NoisePsk, PskManager, PskStore, ServerConfig};

/// Device-side endpoint that accepts controller connections and keeps each
/// of them up to date with the entities the host application owns.
///
/// Nothing here blocks or spawns: the host calls [`poll`](Self::poll)
/// from its main loop with the current entity registry and time.
pub struct Server {
    config: ServerConfig,
    acceptor: Option<Box<dyn Acceptor>>,
    connections: Vec<Connection>,
    next_key: u64,
    shared_buffer: Vec<u8>,
    action_calls: ActionCallRegistry,
    psk: PskManager,
    incoming_events: ServerEvents,
    idle_timer: Timer,
    reboot_requested: bool,
    shutting_down: bool,
}

impl Server {
    /// Create a new Server
    pub fn new(config: ServerConfig, now: Instant) -> Self {
        Self {
            action_calls: ActionCallRegistry::new(config.action_call_timeout),
            psk: PskManager::new(config.psk_activation_delay),
            idle_timer: Timer::new(config.reboot_timeout, now),
            config,
            acceptor: None,
            connections: Vec::new(),
            next_key: 0,
            shared_buffer: Vec::new(),
            incoming_events: ServerEvents::new(),
            reboot_requested: false,
            shutting_down: false,
        }
    }

    /// Installs persistent storage for the Noise PSK and adopts the key it
    /// holds
    pub fn set_psk_store(&mut self, store: Box<dyn PskStore>) -> Result<(), PskStoreError> {
        self.psk.set_store(store)
    }

    /// Start accepting clients from `acceptor`
    pub fn listen<A: Into<Box<dyn Acceptor>>>(&mut self, acceptor: A) {
        self.acceptor = Some(acceptor.into());
    }

    /// Returns whether or not the Server is accepting clients
    pub fn is_listening(&self) -> bool {
        self.acceptor
            .as_ref()
            .map(|acceptor| acceptor.is_listening())
            .unwrap_or(false)
    }

    /// Binds a TCP acceptor on the configured port and backlog and listens
    /// on it. Returns the bound address.
    #[cfg(feature = "transport_tcp")]
    pub fn listen_tcp(&mut self) -> std::io::Result<std::net::SocketAddr> {
        let acceptor = crate::transport::TcpAcceptor::from_config(&self.config)?;
        let address = acceptor.local_addr()?;
        self.listen(acceptor);
        Ok(address)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Must be called regularly. Accepts new clients, services every
    /// connection, and returns what happened since the last call.
    pub fn poll(&mut self, entities: &Entities, now: Instant) -> ServerEvents {
        self.update(entities, now);
        mem::replace(&mut self.incoming_events, ServerEvents::new())
    }

    fn update(&mut self, entities: &Entities, now: Instant) {
        self.accept_clients(entities, now);

        if self.connections.is_empty() {
            self.check_reboot(now);
        }

        let mut index = 0;
        while index < self.connections.len() {
            {
                let (connections, mut ctx) = self.split(entities, now);
                connections[index].poll(&mut ctx);
            }
            if self.connections[index].is_removed() {
                // Connection order carries no meaning
                let connection = self.connections.swap_remove(index);
                self.on_removed(connection, now);
                continue;
            }
            index += 1;
        }

        if self.psk.apply_due(now) {
            for connection in self.connections.iter_mut() {
                connection.request_disconnect(now);
            }
        }

        let expired = self.action_calls.expire(now);
        if expired > 0 {
            debug!("{} action calls timed out", expired);
        }
    }

    fn split<'s>(
        &'s mut self,
        entities: &'s Entities,
        now: Instant,
    ) -> (&'s mut Vec<Connection>, ConnectionContext<'s>) {
        let batch_delay = if self.shutting_down {
            self.config.shutdown_batch_delay
        } else {
            self.config.batch_delay
        };
        (
            &mut self.connections,
            ConnectionContext {
                now,
                batch_delay,
                entities,
                config: &self.config,
                shared_buffer: &mut self.shared_buffer,
                action_calls: &mut self.action_calls,
                psk: &mut self.psk,
                events: &mut self.incoming_events,
            },
        )
    }

    fn accept_clients(&mut self, entities: &Entities, now: Instant) {
        let Some(mut acceptor) = self.acceptor.take() else {
            return;
        };
        loop {
            let client = match acceptor.accept(self.psk.active()) {
                Ok(Some(client)) => client,
                Ok(None) => break,
                Err(error) => {
                    warn!("Failed to accept client: {}", error);
                    self.incoming_events
                        .push_error(DevlinkServerError::Accept(error.kind()));
                    break;
                }
            };

            if self.connections.len() >= self.config.max_connections {
                warn!(
                    "Rejecting {}: already serving {} clients",
                    client.peer, self.config.max_connections
                );
                let mut helper = client.helper;
                if let Err(error) = helper.close() {
                    debug!("{}: {}", client.peer, error);
                }
                continue;
            }

            let key = ConnectionKey::new(self.next_key);
            self.next_key += 1;
            info!("Accepted {} as connection {}", client.peer, key);

            let mut connection = Connection::new(key, client.helper, &self.config.connection, now);
            {
                let (_, mut ctx) = self.split(entities, now);
                connection.start(&mut ctx);
            }
            self.connections.push(connection);
        }
        self.acceptor = Some(acceptor);
    }

    fn on_removed(&mut self, connection: Connection, now: Instant) {
        let key = connection.key();
        let dropped = self.action_calls.unregister_connection(key);
        if dropped > 0 {
            debug!("Dropped {} pending action calls of {}", dropped, key);
        }
        info!("{} ({}) disconnected", connection.client_info(), connection.peer_name());
        self.incoming_events
            .push_disconnection(key, connection.peer_name().to_string());

        if self.connections.is_empty() {
            self.idle_timer.reset(now);
            self.reboot_requested = false;
        }
    }

    fn check_reboot(&mut self, now: Instant) {
        if self.config.reboot_timeout.is_zero() || self.reboot_requested {
            return;
        }
        if self.idle_timer.ringing(now) {
            let idle_for = self.idle_timer.elapsed(now);
            warn!("No clients for {:?}, requesting reboot", idle_for);
            self.reboot_requested = true;
            self.incoming_events.push_reboot(RebootRequest { idle_for });
        }
    }

    // Fan-out

    /// Queues the current state of `entity` for every subscribed client
    pub fn send_state(&mut self, entities: &Entities, entity: EntityHandle, now: Instant) {
        let Some(state) = entities.get(entity) else {
            warn!("Not sending state of removed entity {:?}", entity);
            return;
        };
        if state.common().internal {
            return;
        }
        let (connections, mut ctx) = self.split(entities, now);
        for connection in connections.iter_mut() {
            connection.send_state(entity, &mut ctx);
        }
    }

    /// Reports that `event_type` fired on the event entity `entity`
    pub fn send_event(
        &mut self,
        entities: &Entities,
        entity: EntityHandle,
        event_type: &str,
        now: Instant,
    ) {
        let Some(event) = entities
            .get(entity)
            .filter(|_| entity.kind == EntityKind::Event)
            .and_then(|entity| entity.as_any().downcast_ref::<Event>())
        else {
            warn!("{:?} is not an event entity", entity);
            return;
        };
        if event.common.internal {
            return;
        }
        let Some(index) = event.event_type_index(event_type) else {
            warn!(
                "'{}' is not an event type of {}",
                event_type,
                event.common().object_id
            );
            return;
        };
        let (connections, mut ctx) = self.split(entities, now);
        for connection in connections.iter_mut() {
            connection.send_event(entity, index, &mut ctx);
        }
    }

    /// Forwards a log line to every client subscribed at `level` or more
    /// verbose
    pub fn send_log_message(
        &mut self,
        entities: &Entities,
        level: LogLevel,
        message: &str,
        now: Instant,
    ) {
        let (connections, mut ctx) = self.split(entities, now);
        for connection in connections.iter_mut() {
            connection.send_log_message(level, message, &mut ctx);
        }
    }

    /// Asks every subscribed controller to run one of its own actions
    pub fn send_homeassistant_action(
        &mut self,
        entities: &Entities,
        request: &HomeassistantActionRequest,
        now: Instant,
    ) {
        let (connections, mut ctx) = self.split(entities, now);
        for connection in connections.iter_mut() {
            connection.send_homeassistant_action(request, &mut ctx);
        }
    }

    /// Answers the service call the host received as `action_call_id`.
    /// Returns `false` if that call is unknown, timed out, or its client is
    /// gone.
    pub fn send_action_response(
        &mut self,
        entities: &Entities,
        action_call_id: u32,
        success: bool,
        error_message: &str,
        response_data: &[u8],
        now: Instant,
    ) -> bool {
        let Some(call) = self.action_calls.unregister(action_call_id) else {
            debug!("No pending action call {}", action_call_id);
            return false;
        };
        let (connections, mut ctx) = self.split(entities, now);
        let Some(connection) = connections
            .iter_mut()
            .find(|connection| connection.key() == call.connection)
        else {
            debug!(
                "Client {} of action call {} is gone",
                call.connection, action_call_id
            );
            return false;
        };
        connection.send_action_response(
            call.client_call_id,
            success,
            error_message,
            response_data,
            &mut ctx,
        )
    }

    // PSK

    /// Persists a new Noise PSK and, with `make_active`, switches to it
    /// shortly after. Every client is asked to reconnect on the switch.
    pub fn save_noise_psk(
        &mut self,
        psk: NoisePsk,
        make_active: bool,
        now: Instant,
    ) -> Result<(), PskError> {
        self.psk.save_noise_psk(psk, make_active, now)
    }

    pub fn noise_psk(&self) -> Option<&NoisePsk> {
        self.psk.active()
    }

    // Shutdown

    /// Stops accepting clients and asks every connected one to disconnect.
    /// Batches flush faster from here on.
    pub fn on_shutdown(&mut self, now: Instant) {
        if self.shutting_down {
            return;
        }
        info!("Shutting down, disconnecting {} clients", self.connections.len());
        self.shutting_down = true;
        self.acceptor = None;
        for connection in self.connections.iter_mut() {
            connection.request_disconnect(now);
        }
    }

    /// Keeps connections moving after [`on_shutdown`](Self::on_shutdown).
    /// Returns `true` once every client is gone. Events raised meanwhile
    /// are returned by the next [`poll`](Self::poll).
    pub fn teardown(&mut self, entities: &Entities, now: Instant) -> bool {
        self.update(entities, now);
        self.connections.is_empty()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    // Connections

    /// Whether any client is authenticated. With `state_subscription`, only
    /// clients that also subscribed to state updates count.
    pub fn is_connected(&self, state_subscription: bool) -> bool {
        self.connections.iter().any(|connection| {
            connection.is_authenticated()
                && (!state_subscription || connection.has_state_subscription())
        })
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connection_keys(&self) -> Vec<ConnectionKey> {
        self.connections.iter().map(Connection::key).collect()
    }

    pub fn connection_state(&self, key: ConnectionKey) -> Option<ConnectionState> {
        self.connections
            .iter()
            .find(|connection| connection.key() == key)
            .map(Connection::state)
    }

    pub fn pending_action_calls(&self) -> usize {
        self.action_calls.len()
    }
}
