use std::time::Duration;

use devlink_server::{
    shared::{
        messages::{PingRequest, PingResponse},
        Entities,
    },
    DisconnectEvent,
};
use devlink_test::{assert_kinds, TestServer};

const KEEPALIVE: Duration = Duration::from_secs(60);

#[test]
fn silent_client_is_pinged() {
    let mut server = TestServer::with_entities(Entities::new());
    let mut client = server.connect_authenticated();

    server.advance(KEEPALIVE - Duration::from_secs(1));
    assert!(client.receive().is_empty());
    server.advance(Duration::from_secs(1));
    assert_kinds!(client.receive(), [PingRequest]);

    // One outstanding ping at a time
    server.advance(Duration::from_secs(30));
    assert!(client.receive().is_empty());
}

#[test]
fn answered_ping_keeps_connection() {
    let mut server = TestServer::with_entities(Entities::new());
    let mut client = server.connect_authenticated();
    server.advance(KEEPALIVE);
    assert_kinds!(client.receive(), [PingRequest]);

    client.send(&PingResponse);
    server.advance(Duration::from_secs(1));
    server.advance(KEEPALIVE * 2);
    assert!(!client.is_disconnected());
    assert_eq!(server.server.connection_count(), 1);
}

#[test]
fn unanswered_ping_drops_client() {
    let mut server = TestServer::with_entities(Entities::new());
    let mut client = server.connect_authenticated();
    server.advance(KEEPALIVE);

    let mut events = server.advance(KEEPALIVE);
    assert!(!events.has::<DisconnectEvent>());
    events = server.advance(KEEPALIVE / 2);
    assert_eq!(events.read::<DisconnectEvent>().count(), 1);
    assert!(client.is_disconnected());
}

#[test]
fn client_traffic_postpones_ping() {
    let mut server = TestServer::with_entities(Entities::new());
    let mut client = server.connect_authenticated();
    for _ in 0..6 {
        server.advance(KEEPALIVE / 2);
        client.send(&PingRequest);
        server.poll();
        assert_kinds!(client.receive(), [PingResponse]);
    }
}
