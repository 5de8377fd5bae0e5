use std::time::Duration;

use devlink_server::shared::{messages::DisconnectResponse, Entities};
use devlink_test::{assert_kinds, TestServer};

#[test]
fn shutdown_asks_clients_to_leave() {
    let mut server = TestServer::with_entities(Entities::new());
    let mut first = server.connect_authenticated();
    let mut second = server.connect_authenticated();

    let now = server.now;
    server.server.on_shutdown(now);
    assert!(!server.server.is_listening());
    assert!(server.server.is_shutting_down());

    server.now += Duration::from_millis(5);
    let now = server.now;
    assert!(!server.server.teardown(&server.entities, now));
    assert_kinds!(first.receive(), [DisconnectRequest]);
    assert_kinds!(second.receive(), [DisconnectRequest]);

    first.send(&DisconnectResponse);
    second.send(&DisconnectResponse);
    assert!(server.server.teardown(&server.entities, now));
    assert!(first.is_disconnected());
}

#[test]
fn no_clients_are_accepted_after_shutdown() {
    let mut server = TestServer::with_entities(Entities::new());
    let now = server.now;
    server.server.on_shutdown(now);

    let mut late = server.connect();
    late.hello();
    server.poll();
    assert!(late.receive().is_empty());
    assert_eq!(server.server.connection_count(), 0);
}
