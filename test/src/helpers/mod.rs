pub mod assertions;
pub mod entity_builder;
pub mod test_client;
pub mod test_server;

pub use assertions::{decode_all, kinds};
pub use entity_builder::TestEntityBuilder;
pub use test_client::TestClient;
pub use test_server::TestServer;
