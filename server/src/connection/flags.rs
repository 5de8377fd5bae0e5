use devlink_shared::LogLevel;

/// Handshake progress. Only ever moves forward.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    #[default]
    AwaitingHello,
    Connected,
    Authenticated,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ConnectionFlags {
    pub state: ConnectionState,
    pub log_subscription: LogLevel,
    pub state_subscription: bool,
    pub service_call_subscription: bool,
    pub sent_ping: bool,
    pub batch_scheduled: bool,
    pub batch_first_message: bool,
    pub should_try_send_immediately: bool,
    /// Close once the pending response has left the socket
    pub next_close: bool,
    /// Dead; the server drops the connection on its next pass
    pub remove: bool,
    pub list_entities_pending: bool,
    pub initial_state_pending: bool,
}

impl ConnectionFlags {
    pub fn advance_state(&mut self, state: ConnectionState) {
        if state > self.state {
            self.state = state;
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == ConnectionState::Authenticated
    }
}
