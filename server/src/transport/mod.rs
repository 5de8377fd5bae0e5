cfg_if! {
    if #[cfg(feature = "transport_tcp")] {
        mod tcp;
        pub use tcp::TcpAcceptor;
    } else {}
}

pub use inner::{Acceptor, PendingClient};

mod inner {

    use std::io;

    use devlink_shared::FrameHelper;

    use crate::server::NoisePsk;

    /// A freshly accepted client, already wrapped in its frame helper
    pub struct PendingClient {
        pub helper: Box<dyn FrameHelper>,
        pub peer: String,
    }

    pub trait Acceptor {
        /// Accepts one waiting client without blocking. `psk` is the key
        /// encrypted helpers must use for this client; plaintext acceptors
        /// ignore it.
        fn accept(&mut self, psk: Option<&NoisePsk>) -> io::Result<Option<PendingClient>>;

        /// Whether the acceptor still takes new clients
        fn is_listening(&self) -> bool {
            true
        }
    }
}
