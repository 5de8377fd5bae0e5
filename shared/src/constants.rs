use std::time::Duration;

pub const DEFAULT_PORT: u16 = 6053;
pub const DEFAULT_LISTEN_BACKLOG: i32 = 4;
pub const DEFAULT_MAX_CONNECTIONS: usize = 8;

/// Upper bound for one physical write carrying more than one message
pub const MAX_BATCH_PACKET_SIZE: usize = 1390;
pub const MAX_PACKETS_PER_BATCH: usize = 64;
pub const MAX_MESSAGES_PER_POLL: usize = 5;

/// Entity messages one enumerator pass may queue, per client generation
pub const MAX_INITIAL_PER_BATCH: usize = 34;
pub const MAX_INITIAL_PER_BATCH_LEGACY: usize = 24;

pub const KEEPALIVE_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const BATCH_DELAY: Duration = Duration::from_millis(100);
pub const SHUTDOWN_BATCH_DELAY: Duration = Duration::from_millis(5);
pub const REBOOT_TIMEOUT: Duration = Duration::from_millis(300_000);
pub const ACTION_CALL_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const PSK_ACTIVATION_DELAY: Duration = Duration::from_millis(100);

/// Bytes a frame helper keeps for a socket that stopped taking data
pub const MAX_TX_QUEUE_SIZE: usize = 8 * 1024;

pub const PLAINTEXT_HEADER_PADDING: usize = 6;
pub const PLAINTEXT_FOOTER_SIZE: usize = 0;
pub const NOISE_HEADER_PADDING: usize = 7;
pub const NOISE_FOOTER_SIZE: usize = 16;

/// Length of a Noise pre-shared key
pub const NOISE_PSK_SIZE: usize = 32;
