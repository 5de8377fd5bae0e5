use std::io;

use thiserror::Error;

/// Errors raised by a frame helper while moving bytes between the socket
/// and the message layer.
///
/// Only [`ApiError::WouldBlock`] is recoverable; every other variant is fatal
/// to the connection that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The socket cannot take or give more bytes right now
    #[error("Operation would block")]
    WouldBlock,

    /// First byte of a frame was not the plaintext indicator (SECURITY: peer may be speaking another protocol)
    #[error("Bad frame indicator {indicator:#04x}, expected 0x00. The peer may be using encryption")]
    BadIndicator {
        indicator: u8,
    },

    /// Frame header could not be parsed (SECURITY: potentially malicious packet)
    #[error("Malformed frame header ({reason})")]
    BadDataPacket {
        reason: &'static str,
    },

    /// Frame payload larger than the framing can describe
    #[error("Frame payload of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge {
        size: usize,
        max: usize,
    },

    /// Peer closed the connection
    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Socket read failed: {0:?}")]
    SocketRead(io::ErrorKind),

    #[error("Socket write failed: {0:?}")]
    SocketWrite(io::ErrorKind),

    #[error("Failed to close socket: {0:?}")]
    CloseFailed(io::ErrorKind),

    /// The helper was used after `close()`
    #[error("Frame helper is closed")]
    Closed,
}

impl ApiError {
    pub fn is_would_block(&self) -> bool {
        matches!(self, ApiError::WouldBlock)
    }
}
