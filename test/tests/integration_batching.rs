use std::time::Duration;

use devlink_server::{
    shared::{
        entities::Sensor,
        messages::{
            ListEntitiesRequest, MessageKind, SensorStateResponse, SubscribeStatesRequest,
        },
    },
    ServerConfig,
};
use devlink_test::{assert_kinds, decode_all, TestEntityBuilder, TestServer};

const BATCH_DELAY: Duration = Duration::from_millis(100);

fn subscribed(server: &mut TestServer) -> devlink_test::TestClient {
    let mut client = server.connect_authenticated();
    client.send(&SubscribeStatesRequest);
    server.poll();
    server.advance(BATCH_DELAY);
    client.receive();
    client.clear_server_writes();
    client
}

#[test]
fn repeated_updates_go_out_once_with_latest_value() {
    let (entities, handles) = TestEntityBuilder::new().sensors(2).build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.send(&SubscribeStatesRequest);

    server.poll();
    assert!(client.receive().is_empty());
    server.advance(BATCH_DELAY);
    assert_kinds!(client.receive(), [SensorStateResponse, SensorStateResponse]);

    client.clear_server_writes();
    let sensor = handles[0];
    server.entities.get_mut::<Sensor>(sensor).unwrap().state = Some(1.5);
    server.send_state(sensor);
    server.entities.get_mut::<Sensor>(sensor).unwrap().state = Some(2.5);
    server.send_state(sensor);

    server.advance(BATCH_DELAY / 2);
    assert!(client.receive().is_empty());
    server.advance(BATCH_DELAY / 2);

    let frames = client.receive();
    let states: Vec<SensorStateResponse> = decode_all(&frames, MessageKind::SensorStateResponse);
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].key, 1);
    assert_eq!(states[0].state, 2.5);
    assert_eq!(client.server_write_sizes().len(), 1);
}

#[test]
fn updates_are_not_sent_without_subscription() {
    let (entities, handles) = TestEntityBuilder::new().sensors(1).build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();

    server.send_state(handles[0]);
    server.advance(BATCH_DELAY);
    assert!(client.receive().is_empty());
}

#[test]
fn update_state_skips_the_batch() {
    let (entities, handles) = TestEntityBuilder::new().sensors(1).update().build();
    let mut server = TestServer::with_entities(entities);
    let mut client = subscribed(&mut server);

    server.send_state(handles[0]);
    server.send_state(handles[1]);
    assert_kinds!(client.receive(), [UpdateStateResponse]);

    server.advance(BATCH_DELAY);
    assert_kinds!(client.receive(), [SensorStateResponse]);
}

#[test]
fn zero_delay_sends_after_initial_state() {
    let (entities, handles) = TestEntityBuilder::new().sensors(3).build();
    let config = ServerConfig {
        batch_delay: Duration::ZERO,
        ..Default::default()
    };
    let mut server = TestServer::new(config, entities);
    let mut client = server.connect_authenticated();
    client.send(&SubscribeStatesRequest);
    server.poll();
    server.poll();
    assert_eq!(client.receive().len(), 3);

    server.send_state(handles[2]);
    let frames = client.receive();
    let states: Vec<SensorStateResponse> = decode_all(&frames, MessageKind::SensorStateResponse);
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].key, 3);
}

#[test]
fn full_socket_delays_but_does_not_lose_output() {
    let (entities, handles) = TestEntityBuilder::new().sensors(1).build();
    let mut server = TestServer::with_entities(entities);
    let mut client = subscribed(&mut server);

    client.block_server_writes(true);
    server.send_state(handles[0]);
    server.advance(BATCH_DELAY);
    assert!(client.receive().is_empty());

    client.block_server_writes(false);
    server.poll();
    assert_kinds!(client.receive(), [SensorStateResponse]);
}

#[test]
fn large_listing_respects_packet_ceiling() {
    let (entities, _) = TestEntityBuilder::new()
        .name_padding(24)
        .sensors(150)
        .build();
    let mut server = TestServer::with_entities(entities);
    let mut client = server.connect_authenticated();
    client.clear_server_writes();
    client.send(&ListEntitiesRequest);

    let mut frames = Vec::new();
    for _ in 0..100 {
        server.advance(BATCH_DELAY);
        frames.extend(client.receive());
        if frames
            .last()
            .map(|frame| frame.message_type == MessageKind::ListEntitiesDoneResponse.id())
            .unwrap_or(false)
        {
            break;
        }
    }

    assert_eq!(frames.len(), 151);
    let sizes = client.server_write_sizes();
    assert!(sizes.len() > 1);
    assert!(
        sizes.iter().all(|&size| size <= 1390),
        "oversized write in {:?}",
        sizes
    );
}

#[test]
fn internal_entities_are_never_reported() {
    let (entities, handles) = TestEntityBuilder::new()
        .sensors(1)
        .internal()
        .sensors(1)
        .build();
    let mut server = TestServer::with_entities(entities);
    let mut client = subscribed(&mut server);

    server.send_state(handles[0]);
    server.send_state(handles[1]);
    server.advance(BATCH_DELAY);

    let frames = client.receive();
    let states: Vec<SensorStateResponse> = decode_all(&frames, MessageKind::SensorStateResponse);
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].key, 2);
}
