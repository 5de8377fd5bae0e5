mod server;
pub use server::Server;

mod server_config;
pub use server_config::{DeviceInfo, ServerConfig};

mod action_calls;
pub use action_calls::{ActionCallRegistry, ActiveActionCall};

mod psk;
pub use psk::{MemoryPskStore, NoisePsk, PskManager, PskStore};
