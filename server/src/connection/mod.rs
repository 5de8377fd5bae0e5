use std::fmt;

mod connection;
mod connection_config;
mod context;
mod deferred_batch;
mod flags;
mod outbound;

pub(crate) use connection::Connection;
pub use connection_config::ConnectionConfig;
pub(crate) use context::ConnectionContext;
pub use deferred_batch::{BatchItem, DeferredBatch};
pub use flags::ConnectionState;

/// Server-assigned identity of one client connection. Never reused while
/// the server runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionKey(u64);

impl ConnectionKey {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
