use std::time::Duration;

use devlink_server::{shared::Entities, RebootEvent, ServerConfig};
use devlink_test::TestServer;

const MINUTE: Duration = Duration::from_secs(60);

#[test]
fn idle_device_asks_for_reboot_once() {
    let mut server = TestServer::with_entities(Entities::new());

    let mut events = server.advance(4 * MINUTE + Duration::from_secs(59));
    assert!(!events.has::<RebootEvent>());

    events = server.advance(Duration::from_secs(1));
    let requests: Vec<_> = events.read::<RebootEvent>().collect();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].idle_for, 5 * MINUTE);

    events = server.advance(10 * MINUTE);
    assert!(!events.has::<RebootEvent>());
}

#[test]
fn idle_clock_restarts_when_last_client_leaves() {
    let mut server = TestServer::with_entities(Entities::new());
    server.advance(3 * MINUTE);
    let mut client = server.connect_authenticated();
    server.advance(MINUTE / 2);
    client.close();
    server.poll();

    let mut events = server.advance(4 * MINUTE + Duration::from_secs(59));
    assert!(!events.has::<RebootEvent>());
    events = server.advance(Duration::from_secs(1));
    assert!(events.has::<RebootEvent>());
}

#[test]
fn zero_timeout_disables_reboot() {
    let config = ServerConfig {
        reboot_timeout: Duration::ZERO,
        ..Default::default()
    };
    let mut server = TestServer::new(config, Entities::new());
    let events = server.advance(60 * MINUTE);
    assert!(!events.has::<RebootEvent>());
}
