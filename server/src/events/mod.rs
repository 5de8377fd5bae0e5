mod server_events;

pub use server_events::{
    ActionCall, ActionCallEvent, ClientInfo, CommandEvent, ConnectEvent, DisconnectEvent,
    DumpConfigEvent, ErrorEvent, RebootEvent, RebootRequest, ServerEvent, ServerEvents,
};
