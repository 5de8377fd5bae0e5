use std::io;

use thiserror::Error;

use devlink_shared::ApiError;

use crate::connection::ConnectionKey;

/// Errors reported by a [`PskStore`](crate::PskStore) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PskStoreError {
    /// Stored key could not be read back
    #[error("Failed to load stored Noise PSK: {reason}")]
    Load {
        reason: String,
    },

    /// Key could not be written to persistent storage
    #[error("Failed to persist Noise PSK: {reason}")]
    Save {
        reason: String,
    },
}

/// Errors that can occur while changing the Noise pre-shared key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PskError {
    /// Key material of the wrong size (SECURITY: never applied, not even partially)
    #[error("Noise PSK must be 32 bytes, got {len}")]
    InvalidLength {
        len: usize,
    },

    /// No store was configured, so the key cannot survive a restart
    #[error("No PSK store configured, refusing to change the Noise PSK")]
    NoStore,

    #[error("Noise PSK was not changed: {0}")]
    Store(#[from] PskStoreError),
}

/// Top-level error type surfaced through [`ErrorEvent`](crate::ErrorEvent)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DevlinkServerError {
    /// Listener could not be created
    #[error("Failed to listen on port {port}: {kind:?}")]
    Listen {
        port: u16,
        kind: io::ErrorKind,
    },

    /// Listener failed while accepting a client
    #[error("Failed to accept client: {0:?}")]
    Accept(io::ErrorKind),

    /// A connection hit a fatal transport error and was closed
    #[error("Connection {connection} closed after transport error: {source}")]
    Connection {
        connection: ConnectionKey,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Psk(#[from] PskError),
}
