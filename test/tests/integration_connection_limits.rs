use devlink_server::{shared::Entities, ConnectEvent, DisconnectEvent, ErrorEvent, ServerConfig};
use devlink_test::TestServer;

#[test]
fn clients_over_the_limit_are_closed() {
    let config = ServerConfig {
        max_connections: 1,
        ..Default::default()
    };
    let mut server = TestServer::new(config, Entities::new());
    let mut first = server.connect_authenticated();

    let mut second = server.connect();
    second.hello();
    let mut events = server.poll();
    assert!(!events.has::<ConnectEvent>());
    assert!(!events.has::<DisconnectEvent>());
    assert!(second.is_disconnected());
    assert!(second.receive().is_empty());
    assert_eq!(server.server.connection_count(), 1);

    first.close();
    events = server.poll();
    assert_eq!(events.read::<DisconnectEvent>().count(), 1);
    // A peer hanging up is not an error
    assert!(!events.has::<ErrorEvent>());
    assert_eq!(server.server.connection_count(), 0);

    let mut third = server.connect();
    third.hello();
    events = server.poll();
    assert!(events.has::<ConnectEvent>());
    assert!(!third.is_disconnected());
}

#[test]
fn connection_keys_are_never_reused() {
    let mut server = TestServer::with_entities(Entities::new());
    let mut first = server.connect_authenticated();
    let first_key = server.server.connection_keys()[0];
    first.close();
    server.poll();

    let _second = server.connect_authenticated();
    let second_key = server.server.connection_keys()[0];
    assert_ne!(first_key, second_key);
}
