use std::time::Duration;

use devlink_server::{
    shared::messages::{ExecuteServiceRequest, ExecuteServiceResponse, MessageKind},
    ActionCallEvent,
};
use devlink_test::{assert_kinds, decode_all, TestEntityBuilder, TestServer};

fn call(key: u32, call_id: u32) -> ExecuteServiceRequest {
    ExecuteServiceRequest {
        key,
        call_id,
        return_response: true,
        ..Default::default()
    }
}

fn server_with_service() -> TestServer {
    let (entities, _) = TestEntityBuilder::new().service("calibrate").build();
    TestServer::with_entities(entities)
}

#[test]
fn equal_client_ids_are_routed_to_their_own_client() {
    let mut server = server_with_service();
    let mut first = server.connect_authenticated();
    let mut second = server.connect_authenticated();

    first.send(&call(1, 5));
    second.send(&call(1, 5));
    let mut events = server.poll();
    let calls: Vec<_> = events.read::<ActionCallEvent>().collect();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0].action_call_id, calls[1].action_call_id);
    assert_ne!(calls[0].connection, calls[1].connection);
    assert_eq!(server.server.pending_action_calls(), 2);

    let second_key = server.server.connection_keys()[1];
    let second_call = calls
        .iter()
        .find(|call| call.connection == second_key)
        .and_then(|call| call.action_call_id)
        .unwrap();

    let now = server.now;
    assert!(server.server.send_action_response(
        &server.entities,
        second_call,
        true,
        "",
        b"ok",
        now
    ));
    assert!(first.receive().is_empty());
    let frames = second.receive();
    let responses: Vec<ExecuteServiceResponse> =
        decode_all(&frames, MessageKind::ExecuteServiceResponse);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].call_id, 5);
    assert!(responses[0].success);
    assert_eq!(responses[0].response_data, b"ok".to_vec());

    // Answered calls are forgotten
    assert!(!server.server.send_action_response(
        &server.entities,
        second_call,
        true,
        "",
        &[],
        now
    ));
    assert_eq!(server.server.pending_action_calls(), 1);
}

#[test]
fn calls_time_out() {
    let mut server = server_with_service();
    let mut client = server.connect_authenticated();
    client.send(&call(1, 8));
    let mut events = server.poll();
    let id = events
        .read::<ActionCallEvent>()
        .next()
        .and_then(|call| call.action_call_id)
        .unwrap();

    server.advance(Duration::from_secs(30));
    assert_eq!(server.server.pending_action_calls(), 0);
    let now = server.now;
    assert!(!server
        .server
        .send_action_response(&server.entities, id, false, "too late", &[], now));
    assert!(client.receive().is_empty());
}

#[test]
fn disconnect_drops_pending_calls() {
    let mut server = server_with_service();
    let mut client = server.connect_authenticated();
    client.send(&call(1, 2));
    server.poll();
    assert_eq!(server.server.pending_action_calls(), 1);

    client.close();
    server.poll();
    assert_eq!(server.server.pending_action_calls(), 0);
}

#[test]
fn fire_and_forget_calls_are_not_tracked() {
    let mut server = server_with_service();
    let mut client = server.connect_authenticated();
    client.send(&call(1, 0));
    let mut events = server.poll();

    let calls: Vec<_> = events.read::<ActionCallEvent>().collect();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].action_call_id, None);
    assert_eq!(server.server.pending_action_calls(), 0);
}

#[test]
fn unknown_service_is_answered_with_failure() {
    let mut server = server_with_service();
    let mut client = server.connect_authenticated();
    client.send(&call(99, 4));
    client.send(&call(98, 0));
    let mut events = server.poll();

    assert_eq!(events.read::<ActionCallEvent>().count(), 0);
    let frames = client.receive();
    assert_kinds!(frames, [ExecuteServiceResponse]);
    let responses: Vec<ExecuteServiceResponse> =
        decode_all(&frames, MessageKind::ExecuteServiceResponse);
    assert_eq!(responses[0].call_id, 4);
    assert!(!responses[0].success);
    assert_eq!(responses[0].error_message, "Unknown service");
}
