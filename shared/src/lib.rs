//! # Devlink Shared
//! Wire catalog, protobuf codec, entity model and framing shared by
//! devlink-server and its test harness.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod api_version;
pub mod constants;
pub mod entities;
pub mod frame;
pub mod messages;
pub mod proto;
mod timer;
mod types;

pub use api_version::{ApiVersion, SERVER_API_VERSION};
pub use entities::{Entities, EntitiesFull, Entity, EntityCommon, EntityHandle, EntityKind};
pub use frame::{
    ApiError, FrameHelper, FrameStream, MessageInfo, PlaintextFrameHelper, ReadFrame,
};
pub use messages::MessageKind;
pub use proto::{DecodeError, ProtoDecode, ProtoMessage, ProtoSize, ProtoWriteBuffer};
pub use timer::Timer;
pub use types::{EntityCategory, LogLevel};
