use std::time::Duration;

use devlink_server::shared::{
    messages::{
        EventResponse, HomeassistantActionRequest, KeyValue, MessageKind,
        SubscribeHomeassistantServicesRequest, SubscribeLogsRequest, SubscribeLogsResponse,
        SubscribeStatesRequest,
    },
    LogLevel,
};
use devlink_server::DisconnectEvent;
use devlink_test::{assert_kinds, decode_all, TestEntityBuilder, TestServer};

#[test]
fn logs_respect_subscribed_level() {
    let (entities, _) = TestEntityBuilder::new().build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    let mut silent = server.connect_authenticated();
    client.send(&SubscribeLogsRequest {
        level: LogLevel::Info,
        dump_config: false,
    });
    server.poll();

    let now = server.now;
    server
        .server
        .send_log_message(&server.entities, LogLevel::Debug, "noise", now);
    server
        .server
        .send_log_message(&server.entities, LogLevel::Warn, "sensor offline", now);

    let frames = client.receive();
    let logs: Vec<SubscribeLogsResponse> = decode_all(&frames, MessageKind::SubscribeLogsResponse);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].level, LogLevel::Warn);
    assert_eq!(logs[0].message, b"sensor offline".to_vec());
    assert!(silent.receive().is_empty());
}

#[test]
fn actions_only_reach_subscribers() {
    let (entities, _) = TestEntityBuilder::new().build();
    let mut server = TestServer::with_entities(entities);
    let mut subscriber = server.connect_authenticated();
    let mut other = server.connect_authenticated();
    subscriber.send(&SubscribeHomeassistantServicesRequest);
    server.poll();

    let request = HomeassistantActionRequest {
        service: "light.turn_on".to_string(),
        data: vec![KeyValue {
            key: "entity_id".to_string(),
            value: "light.hall".to_string(),
        }],
        ..Default::default()
    };
    let now = server.now;
    server
        .server
        .send_homeassistant_action(&server.entities, &request, now);

    let frames = subscriber.receive();
    let received: Vec<HomeassistantActionRequest> =
        decode_all(&frames, MessageKind::HomeassistantActionRequest);
    assert_eq!(received, vec![request]);
    assert!(other.receive().is_empty());
}

#[test]
fn events_fire_immediately_by_name() {
    let (entities, handles) = TestEntityBuilder::new()
        .event(&["single", "double"])
        .build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.send(&SubscribeStatesRequest);
    server.poll();
    server.advance(Duration::from_millis(100));
    // Events have no standing state to replay
    assert!(client.receive().is_empty());

    server.send_event(handles[0], "double");
    server.send_event(handles[0], "triple");
    let frames = client.receive();
    assert_kinds!(frames, [EventResponse]);
    let fired: Vec<EventResponse> = decode_all(&frames, MessageKind::EventResponse);
    assert_eq!(fired[0].event_type, "double");
    assert_eq!(fired[0].key, 1);
}

#[test]
fn events_keep_their_order_after_a_full_socket() {
    let (entities, handles) = TestEntityBuilder::new()
        .event(&["press", "hold"])
        .build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.send(&SubscribeStatesRequest);
    server.poll();

    client.block_server_writes(true);
    server.send_event(handles[0], "press");
    server.send_event(handles[0], "hold");
    client.block_server_writes(false);
    server.poll();
    server.send_event(handles[0], "press");
    server.advance(Duration::from_millis(100));

    let frames = client.receive();
    let fired: Vec<String> = decode_all::<EventResponse>(&frames, MessageKind::EventResponse)
        .into_iter()
        .map(|event| event.event_type)
        .collect();
    assert_eq!(fired, ["press", "hold", "press"]);
}

#[test]
fn log_lines_are_skipped_while_the_client_is_backed_up() {
    let (entities, _) = TestEntityBuilder::new().build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.send(&SubscribeLogsRequest {
        level: LogLevel::Debug,
        dump_config: false,
    });
    server.poll();

    client.block_server_writes(true);
    let line = "x".repeat(200);
    let now = server.now;
    for _ in 0..2_000 {
        server
            .server
            .send_log_message(&server.entities, LogLevel::Info, &line, now);
    }
    client.block_server_writes(false);
    let mut events = server.poll();

    assert!(!events.has::<DisconnectEvent>());
    let frames = client.receive();
    let logs: Vec<SubscribeLogsResponse> = decode_all(&frames, MessageKind::SubscribeLogsResponse);
    assert_eq!(logs.len(), 1);
    assert_eq!(server.server.connection_count(), 1);
}

#[test]
fn client_that_stops_reading_is_dropped_once_its_queue_is_full() {
    let (entities, _) = TestEntityBuilder::new().build();
    let mut server = TestServer::with_entities(entities);
    let mut stalled = server.connect_authenticated();
    let mut healthy = server.connect_authenticated();
    stalled.send(&SubscribeHomeassistantServicesRequest);
    healthy.send(&SubscribeHomeassistantServicesRequest);
    server.poll();

    stalled.block_server_writes(true);
    let request = HomeassistantActionRequest {
        service: "notify.phone".to_string(),
        data: vec![KeyValue {
            key: "message".to_string(),
            value: "y".repeat(1_000),
        }],
        ..Default::default()
    };
    let now = server.now;
    for _ in 0..20 {
        server
            .server
            .send_homeassistant_action(&server.entities, &request, now);
    }

    let mut events = server.poll();
    assert_eq!(events.read::<DisconnectEvent>().count(), 1);
    assert_eq!(server.server.connection_count(), 1);
    assert!(stalled.is_disconnected());
    let received: Vec<HomeassistantActionRequest> =
        decode_all(&healthy.receive(), MessageKind::HomeassistantActionRequest);
    assert_eq!(received.len(), 20);
}
