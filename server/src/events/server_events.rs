use std::{mem, time::Duration, vec::IntoIter};

use devlink_shared::{
    messages::{CommandRequest, ExecuteServiceArgument},
    ApiVersion, EntityHandle,
};

use crate::{connection::ConnectionKey, DevlinkServerError};

/// Who is on the other end of a freshly authenticated connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_info: String,
    pub peer: String,
    pub api_version: ApiVersion,
}

/// A service invocation the host application has to carry out.
///
/// When `action_call_id` is set the client is waiting for an answer, which
/// the host delivers with [`Server::send_action_response`](crate::Server::send_action_response).
#[derive(Clone, Debug, PartialEq)]
pub struct ActionCall {
    pub connection: ConnectionKey,
    pub service: EntityHandle,
    pub key: u32,
    pub args: Vec<ExecuteServiceArgument>,
    pub action_call_id: Option<u32>,
    pub return_response: bool,
}

/// Emitted once per idle period when no client has been connected for the
/// configured reboot timeout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebootRequest {
    pub idle_for: Duration,
}

/// Everything that happened during one [`Server::poll`](crate::Server::poll)
pub struct ServerEvents {
    connections: Vec<(ConnectionKey, ClientInfo)>,
    disconnections: Vec<(ConnectionKey, String)>,
    commands: Vec<(ConnectionKey, CommandRequest)>,
    action_calls: Vec<ActionCall>,
    dump_config: Vec<ConnectionKey>,
    errors: Vec<DevlinkServerError>,
    reboots: Vec<RebootRequest>,

    empty: bool,
}

impl Default for ServerEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            commands: Vec::new(),
            action_calls: Vec::new(),
            dump_config: Vec::new(),
            errors: Vec::new(),
            reboots: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ServerEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ServerEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, key: ConnectionKey, info: ClientInfo) {
        self.connections.push((key, info));
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, key: ConnectionKey, peer: String) {
        self.disconnections.push((key, peer));
        self.empty = false;
    }

    pub(crate) fn push_command(&mut self, key: ConnectionKey, command: CommandRequest) {
        self.commands.push((key, command));
        self.empty = false;
    }

    pub(crate) fn push_action_call(&mut self, call: ActionCall) {
        self.action_calls.push(call);
        self.empty = false;
    }

    pub(crate) fn push_dump_config(&mut self, key: ConnectionKey) {
        self.dump_config.push(key);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: DevlinkServerError) {
        self.errors.push(error);
        self.empty = false;
    }

    pub(crate) fn push_reboot(&mut self, request: RebootRequest) {
        self.reboots.push(request);
        self.empty = false;
    }
}

// Event Trait
pub trait ServerEvent {
    type Iter;

    fn iter(events: &mut ServerEvents) -> Self::Iter;

    fn has(events: &ServerEvents) -> bool;
}

macro_rules! server_event {
    ($(#[$meta:meta])* $event:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $event;
        impl ServerEvent for $event {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut ServerEvents) -> Self::Iter {
                IntoIterator::into_iter(mem::take(&mut events.$field))
            }

            fn has(events: &ServerEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

server_event!(
    /// A client finished authentication
    ConnectEvent, connections, (ConnectionKey, ClientInfo)
);
server_event!(
    /// A connection was removed, for whatever reason
    DisconnectEvent, disconnections, (ConnectionKey, String)
);
server_event!(CommandEvent, commands, (ConnectionKey, CommandRequest));
server_event!(ActionCallEvent, action_calls, ActionCall);
server_event!(
    /// A log subscriber asked for the configuration dump
    DumpConfigEvent, dump_config, ConnectionKey
);
server_event!(ErrorEvent, errors, DevlinkServerError);
server_event!(RebootEvent, reboots, RebootRequest);
