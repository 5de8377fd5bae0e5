//! # Devlink Server
//! The device side of the devlink control-plane protocol: accepts
//! controller connections, walks the entity registry for them, and batches
//! state updates into MTU-sized frames.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod transport;
pub mod shared {
    pub use devlink_shared::{
        constants, entities, messages, ApiError, ApiVersion, Entities, EntitiesFull, Entity,
        EntityHandle, EntityKind, FrameHelper, FrameStream, LogLevel, MessageInfo,
        PlaintextFrameHelper, ReadFrame,
    };
}

mod connection;
mod error;
mod events;
mod iterator;
mod server;

pub use connection::{BatchItem, ConnectionConfig, ConnectionKey, ConnectionState, DeferredBatch};
pub use error::{DevlinkServerError, PskError, PskStoreError};
pub use events::{
    ActionCall, ActionCallEvent, ClientInfo, CommandEvent, ConnectEvent, DisconnectEvent,
    DumpConfigEvent, ErrorEvent, RebootEvent, RebootRequest, ServerEvent, ServerEvents,
};
pub use iterator::{EntityIterator, IteratorKind, IteratorSink};
pub use server::{
    ActionCallRegistry, ActiveActionCall, DeviceInfo, MemoryPskStore, NoisePsk, PskManager,
    PskStore, Server, ServerConfig,
};
