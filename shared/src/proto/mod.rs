//! Minimal protobuf wire codec used by every message in the catalog.

mod error;
mod reader;
mod write_buffer;

pub use error::DecodeError;
pub use reader::{Field, FieldValue, ProtoReader};
pub use write_buffer::{varint_size, ProtoSize, ProtoWriteBuffer};

use crate::messages::MessageKind;

pub(crate) const WIRE_TYPE_VARINT: u8 = 0;
pub(crate) const WIRE_TYPE_FIXED64: u8 = 1;
pub(crate) const WIRE_TYPE_LENGTH_DELIMITED: u8 = 2;
pub(crate) const WIRE_TYPE_FIXED32: u8 = 5;

/// An outbound message: knows its wire id, its exact encoded size, and how
/// to write itself
pub trait ProtoMessage {
    fn kind(&self) -> MessageKind;

    fn encode(&self, buffer: &mut ProtoWriteBuffer);

    fn calculate_size(&self) -> usize;
}

/// A message embedded as a field of another message. It has no wire id of
/// its own.
pub trait NestedMessage {
    fn encode(&self, buffer: &mut ProtoWriteBuffer);

    fn calculate_size(&self) -> usize;
}

/// An inbound message decoded from a frame payload
pub trait ProtoDecode: Sized {
    fn decode(payload: &[u8]) -> Result<Self, DecodeError>;
}
