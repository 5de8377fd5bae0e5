use std::time::Duration;

use devlink_server::shared::messages::{ListEntitiesRequest, MessageKind, SubscribeStatesRequest};
use devlink_shared::ReadFrame;
use devlink_test::{assert_kinds, kinds, TestClient, TestEntityBuilder, TestServer};

/// Polls in batch-delay steps until `expected` frames arrived or the
/// server went quiet
fn drain(server: &mut TestServer, client: &mut TestClient, expected: usize) -> Vec<ReadFrame> {
    let mut frames = Vec::new();
    for _ in 0..100 {
        server.advance(Duration::from_millis(100));
        frames.extend(client.receive());
        if frames.len() >= expected {
            break;
        }
    }
    frames
}

#[test]
fn listing_follows_kind_order_and_skips_internal() {
    let (entities, _) = TestEntityBuilder::new()
        .event(&["press"])
        .service("restart")
        .switch()
        .binary_sensors(1)
        .internal()
        .sensors(1)
        .build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.send(&ListEntitiesRequest);

    let frames = drain(&mut server, &mut client, 5);
    assert_kinds!(
        frames,
        [
            ListEntitiesSensorResponse,
            ListEntitiesSwitchResponse,
            ListEntitiesServicesResponse,
            ListEntitiesEventResponse,
            ListEntitiesDoneResponse,
        ]
    );
}

#[test]
fn subscribe_during_listing_runs_initial_state_once() {
    let (entities, _) = TestEntityBuilder::new().sensors(50).build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.send(&ListEntitiesRequest);
    client.send(&SubscribeStatesRequest);

    let frames = drain(&mut server, &mut client, 101);
    // Nothing else trickles in afterwards
    assert!(drain(&mut server, &mut client, usize::MAX).is_empty());

    let received = kinds(&frames);
    assert_eq!(received.len(), 101);
    let done = received
        .iter()
        .position(|kind| *kind == MessageKind::ListEntitiesDoneResponse)
        .unwrap();
    assert_eq!(done, 50);
    assert!(received[..done]
        .iter()
        .all(|kind| *kind == MessageKind::ListEntitiesSensorResponse));
    assert!(received[done + 1..]
        .iter()
        .all(|kind| *kind == MessageKind::SensorStateResponse));
}

#[test]
fn second_listing_waits_for_the_first() {
    let (entities, _) = TestEntityBuilder::new().sensors(3).build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.send(&ListEntitiesRequest);
    client.send(&ListEntitiesRequest);

    let received = kinds(&drain(&mut server, &mut client, 8));
    let done_count = received
        .iter()
        .filter(|kind| **kind == MessageKind::ListEntitiesDoneResponse)
        .count();
    assert_eq!(received.len(), 8);
    assert_eq!(done_count, 2);
    assert_eq!(received[3], MessageKind::ListEntitiesDoneResponse);
}

#[test]
fn legacy_clients_get_object_ids() {
    let (entities, _) = TestEntityBuilder::new().sensors(1).build();
    let mut server = TestServer::with_entities(entities);

    let mut legacy = server.connect();
    legacy.hello_as(1, 9);
    let mut current = server.connect();
    current.hello();
    server.poll();
    legacy.receive();
    current.receive();

    legacy.send(&ListEntitiesRequest);
    current.send(&ListEntitiesRequest);
    let legacy_frames = drain(&mut server, &mut legacy, 2);
    let current_frames = current.receive();

    let contains_object_id =
        |frame: &ReadFrame| frame.payload.windows(8).any(|window| window == b"sensor_1");
    assert!(contains_object_id(&legacy_frames[0]));
    assert!(!contains_object_id(&current_frames[0]));
}

#[test]
fn removed_entities_are_skipped_at_flush() {
    let (entities, handles) = TestEntityBuilder::new().sensors(3).build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.send(&SubscribeStatesRequest);
    server.poll();

    server.entities.remove(handles[1]);
    server.advance(Duration::from_millis(100));
    assert_kinds!(client.receive(), [SensorStateResponse, SensorStateResponse]);
}
