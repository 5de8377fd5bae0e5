//! Wire framing.
//!
//! A frame helper turns a byte stream into `(message type, payload)` frames
//! and back. Outbound messages are encoded by the caller straight into a
//! shared buffer that reserves [`FrameHelper::header_padding`] bytes before
//! and [`FrameHelper::footer_size`] bytes after every payload, so the helper
//! can frame (or encrypt) in place without copying payloads around.

mod error;
mod plaintext;

pub use error::ApiError;
pub use plaintext::{FrameStream, PlaintextFrameHelper};

/// Location of one encoded message inside the shared write buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MessageInfo {
    pub message_type: u16,
    /// Start of the header padding that precedes the payload
    pub offset: usize,
    pub payload_size: usize,
}

impl MessageInfo {
    pub fn new(message_type: u16, offset: usize, payload_size: usize) -> Self {
        Self {
            message_type,
            offset,
            payload_size,
        }
    }
}

/// A complete inbound frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadFrame {
    pub message_type: u16,
    pub payload: Vec<u8>,
}

pub trait FrameHelper {
    /// Prepares the helper after accept. Plaintext has nothing to do here;
    /// encrypted helpers start their handshake.
    fn init(&mut self) -> Result<(), ApiError>;

    /// Moves pending outbound bytes to the socket
    fn poll(&mut self) -> Result<(), ApiError>;

    /// Returns the next complete frame, or `None` if one has not fully
    /// arrived yet
    fn read_frame(&mut self) -> Result<Option<ReadFrame>, ApiError>;

    /// True when nothing is queued behind the socket, so a new write will
    /// not have to wait
    fn can_write_without_blocking(&self) -> bool;

    /// Frames and sends every message described by `messages` in one write.
    /// `buffer` is laid out as described on [`MessageInfo`]; the helper may
    /// overwrite the padding and footer regions.
    fn write_messages(
        &mut self,
        buffer: &mut Vec<u8>,
        messages: &[MessageInfo],
    ) -> Result<(), ApiError>;

    fn header_padding(&self) -> usize;

    fn footer_size(&self) -> usize;

    fn close(&mut self) -> Result<(), ApiError>;

    /// Human readable peer address, for logs
    fn peer_name(&self) -> &str;
}
