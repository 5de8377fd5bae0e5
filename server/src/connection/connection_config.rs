use std::{default::Default, time::Duration};

use devlink_shared::{
    constants::{
        KEEPALIVE_TIMEOUT, MAX_BATCH_PACKET_SIZE, MAX_INITIAL_PER_BATCH,
        MAX_INITIAL_PER_BATCH_LEGACY, MAX_MESSAGES_PER_POLL, MAX_PACKETS_PER_BATCH,
    },
    ApiVersion,
};

/// Contains Config properties which will be used by every Connection
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// A ping is sent after this long without traffic from the client. With
    /// a ping outstanding, two and a half times this closes the connection.
    pub keepalive_timeout: Duration,
    /// Frames read from one client per poll before moving on
    pub max_messages_per_poll: usize,
    /// Ceiling for one write carrying more than one message
    pub max_batch_packet_size: usize,
    /// Messages written per flush at most
    pub max_packets_per_batch: usize,
    /// Entity messages one enumerator pass may queue for current clients
    pub max_initial_per_batch: usize,
    /// Same, for clients older than 1.14
    pub max_initial_per_batch_legacy: usize,
}

impl ConnectionConfig {
    pub fn max_initial_for(&self, version: ApiVersion) -> usize {
        if version.supports(1, 14) {
            self.max_initial_per_batch
        } else {
            self.max_initial_per_batch_legacy
        }
    }

    pub fn keepalive_fatal_timeout(&self) -> Duration {
        self.keepalive_timeout * 5 / 2
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            keepalive_timeout: KEEPALIVE_TIMEOUT,
            max_messages_per_poll: MAX_MESSAGES_PER_POLL,
            max_batch_packet_size: MAX_BATCH_PACKET_SIZE,
            max_packets_per_batch: MAX_PACKETS_PER_BATCH,
            max_initial_per_batch: MAX_INITIAL_PER_BATCH,
            max_initial_per_batch_legacy: MAX_INITIAL_PER_BATCH_LEGACY,
        }
    }
}
