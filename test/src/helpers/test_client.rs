use devlink_server::shared::{
    constants::PLAINTEXT_HEADER_PADDING,
    messages::{ConnectRequest, HelloRequest},
    FrameHelper, MessageInfo, PlaintextFrameHelper, ReadFrame,
};
use devlink_shared::{ProtoMessage, ProtoWriteBuffer};

use crate::local_socket::{LocalConnector, LocalStream, WriteGate, WriteLog};

/// Controller side of a connection, speaking plaintext frames over a
/// [`LocalStream`]
pub struct TestClient {
    helper: PlaintextFrameHelper<LocalStream>,
    server_writes: WriteLog,
    server_gate: WriteGate,
    buffer: Vec<u8>,
    disconnected: bool,
}

impl TestClient {
    pub fn connect(connector: &LocalConnector) -> Self {
        let (stream, server_writes, server_gate) = connector.connect();
        Self {
            helper: PlaintextFrameHelper::new(stream, "test-server"),
            server_writes,
            server_gate,
            buffer: Vec::new(),
            disconnected: false,
        }
    }

    pub fn send<M: ProtoMessage>(&mut self, message: &M) {
        self.buffer.clear();
        self.buffer.resize(PLAINTEXT_HEADER_PADDING, 0);
        message.encode(&mut ProtoWriteBuffer::new(&mut self.buffer));
        let info = MessageInfo::new(
            message.kind().id(),
            0,
            self.buffer.len() - PLAINTEXT_HEADER_PADDING,
        );
        self.helper
            .write_messages(&mut self.buffer, &[info])
            .expect("client write failed");
    }

    pub fn hello(&mut self) {
        self.hello_as(1, 14);
    }

    pub fn hello_as(&mut self, major: u32, minor: u32) {
        self.send(&HelloRequest {
            client_info: "devlink-test".to_string(),
            api_version_major: major,
            api_version_minor: minor,
        });
    }

    pub fn login(&mut self, password: &str) {
        self.send(&ConnectRequest {
            password: password.to_string(),
        });
    }

    /// Every complete frame the server has sent since the last call
    pub fn receive(&mut self) -> Vec<ReadFrame> {
        let mut frames = Vec::new();
        if self.disconnected {
            return frames;
        }
        loop {
            match self.helper.read_frame() {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                Err(_) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        frames
    }

    /// True once the server has closed its end and everything it sent
    /// before that has been read
    pub fn is_disconnected(&mut self) -> bool {
        if !self.disconnected && self.helper.stream().is_closed() {
            let _ = self.receive();
        }
        self.disconnected
    }

    /// Size of each write the server made to this client
    pub fn server_write_sizes(&self) -> Vec<usize> {
        self.server_writes.sizes()
    }

    pub fn clear_server_writes(&self) {
        self.server_writes.clear();
    }

    /// Simulates a full socket on the server side
    pub fn block_server_writes(&self, blocked: bool) {
        self.server_gate.set_blocked(blocked);
    }

    pub fn close(&mut self) {
        let _ = self.helper.close();
    }
}
