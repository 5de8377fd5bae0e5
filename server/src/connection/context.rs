use std::time::{Duration, Instant};

use devlink_shared::Entities;

use crate::{
    events::ServerEvents,
    server::{ActionCallRegistry, PskManager, ServerConfig},
};

/// Server-owned state lent to one connection at a time.
///
/// There is a single write buffer for the whole server; holding it through
/// this context is what lets a connection encode, and only one connection
/// can hold it.
pub(crate) struct ConnectionContext<'a> {
    pub now: Instant,
    pub batch_delay: Duration,
    pub entities: &'a Entities,
    pub config: &'a ServerConfig,
    pub shared_buffer: &'a mut Vec<u8>,
    pub action_calls: &'a mut ActionCallRegistry,
    pub psk: &'a mut PskManager,
    pub events: &'a mut ServerEvents,
}
