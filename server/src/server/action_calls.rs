use std::time::{Duration, Instant};

use log::debug;

use crate::connection::ConnectionKey;

/// A service invocation whose client is waiting for a response
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActiveActionCall {
    /// Server-wide id handed to the host application
    pub action_call_id: u32,
    /// Id the client chose; only unique per connection
    pub client_call_id: u32,
    pub connection: ConnectionKey,
    pub deadline: Instant,
}

/// Correlates host responses with the client calls that asked for them.
///
/// Two clients may well pick the same call id, so the host only ever sees
/// server-issued ids.
pub struct ActionCallRegistry {
    calls: Vec<ActiveActionCall>,
    next_id: u32,
    timeout: Duration,
}

impl ActionCallRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            calls: Vec::new(),
            next_id: 1,
            timeout,
        }
    }

    fn issue_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        if self.next_id == 0 {
            self.next_id = 1;
        }
        id
    }

    pub fn register(
        &mut self,
        client_call_id: u32,
        connection: ConnectionKey,
        now: Instant,
    ) -> u32 {
        let action_call_id = self.issue_id();
        self.calls.push(ActiveActionCall {
            action_call_id,
            client_call_id,
            connection,
            deadline: now + self.timeout,
        });
        action_call_id
    }

    pub fn get(&self, action_call_id: u32) -> Option<&ActiveActionCall> {
        self.calls
            .iter()
            .find(|call| call.action_call_id == action_call_id)
    }

    pub fn unregister(&mut self, action_call_id: u32) -> Option<ActiveActionCall> {
        let index = self
            .calls
            .iter()
            .position(|call| call.action_call_id == action_call_id)?;
        Some(self.calls.remove(index))
    }

    /// Drops every call owned by `connection` and returns how many there
    /// were
    pub fn unregister_connection(&mut self, connection: ConnectionKey) -> usize {
        let before = self.calls.len();
        self.calls.retain(|call| call.connection != connection);
        before - self.calls.len()
    }

    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.calls.len();
        self.calls.retain(|call| {
            let alive = call.deadline > now;
            if !alive {
                debug!(
                    "action call {} from {} timed out",
                    call.action_call_id, call.connection
                );
            }
            alive
        });
        before - self.calls.len()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
