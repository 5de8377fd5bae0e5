use std::time::Instant;

use devlink_shared::{
    messages::{
        DisconnectRequest, DisconnectResponse, ListEntitiesDoneResponse, PingRequest,
        PingResponse,
    },
    ApiVersion, Entity, MessageInfo, MessageKind, ProtoMessage, ProtoWriteBuffer,
};

use super::{
    deferred_batch::{BatchItem, DeferredBatch},
    flags::ConnectionFlags,
};

/// Queues `item` and arms the flush timer if it is not running yet
pub(crate) fn schedule_item(
    batch: &mut DeferredBatch,
    flags: &mut ConnectionFlags,
    item: BatchItem,
    front: bool,
    now: Instant,
) {
    if front {
        batch.add_item_front(item);
    } else {
        batch.add_item(item);
    }
    if !flags.batch_scheduled {
        flags.batch_scheduled = true;
        batch.arm(now);
    }
}

/// Builds the message `kind` for `entity`: its description when `kind` is
/// the entity's list response, its state otherwise
pub(crate) fn entity_message<'e>(
    entity: &'e dyn Entity,
    kind: MessageKind,
    version: ApiVersion,
    aux_index: Option<u8>,
) -> Option<Box<dyn ProtoMessage + 'e>> {
    if kind == entity.kind().info_kind() {
        Some(entity.info_message(version))
    } else {
        entity.state_message(aux_index)
    }
}

/// Messages without a body that can sit in the batch without an entity
pub(crate) fn control_message(kind: MessageKind) -> Option<Box<dyn ProtoMessage>> {
    let message: Box<dyn ProtoMessage> = match kind {
        MessageKind::DisconnectRequest => Box::new(DisconnectRequest),
        MessageKind::DisconnectResponse => Box::new(DisconnectResponse),
        MessageKind::PingRequest => Box::new(PingRequest),
        MessageKind::PingResponse => Box::new(PingResponse),
        MessageKind::ListEntitiesDoneResponse => Box::new(ListEntitiesDoneResponse),
        _ => return None,
    };
    Some(message)
}

/// Appends `message` to `buffer` surrounded by the frame helper's padding
/// and footer. Returns its location and the bytes it took, or `None` if
/// that would exceed `remaining`.
pub(crate) fn encode_into(
    buffer: &mut Vec<u8>,
    message: &dyn ProtoMessage,
    header_padding: usize,
    footer_size: usize,
    remaining: Option<usize>,
) -> Option<(MessageInfo, usize)> {
    let payload_size = message.calculate_size();
    let total = header_padding + payload_size + footer_size;
    if remaining.map(|limit| total > limit).unwrap_or(false) {
        return None;
    }

    let offset = buffer.len();
    buffer.resize(offset + header_padding, 0);
    message.encode(&mut ProtoWriteBuffer::new(buffer));
    debug_assert_eq!(buffer.len(), offset + header_padding + payload_size);
    buffer.resize(offset + total, 0);

    Some((
        MessageInfo::new(message.kind().id(), offset, payload_size),
        total,
    ))
}
