/// In-memory byte streams for end-to-end testing.
/// Routes bytes between server and client without network I/O and keeps a
/// log of every write so tests can check how output was packed.
use std::{
    collections::VecDeque,
    io::{self, Read, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use devlink_server::{
    shared::{FrameStream, PlaintextFrameHelper},
    transport::{Acceptor, PendingClient},
    NoisePsk,
};

#[derive(Default)]
struct Pipe {
    bytes: VecDeque<u8>,
    closed: bool,
}

/// One end of an in-memory duplex stream. Reads report `WouldBlock` while
/// the other end is open but silent, like a non-blocking socket.
pub struct LocalStream {
    inbound: Arc<Mutex<Pipe>>,
    outbound: Arc<Mutex<Pipe>>,
    writes: Arc<Mutex<Vec<usize>>>,
    blocked: Arc<AtomicBool>,
}

impl LocalStream {
    pub fn pair() -> (LocalStream, LocalStream) {
        let a_to_b = Arc::new(Mutex::new(Pipe::default()));
        let b_to_a = Arc::new(Mutex::new(Pipe::default()));
        let a = LocalStream {
            inbound: b_to_a.clone(),
            outbound: a_to_b.clone(),
            writes: Arc::new(Mutex::new(Vec::new())),
            blocked: Arc::new(AtomicBool::new(false)),
        };
        let b = LocalStream {
            inbound: a_to_b,
            outbound: b_to_a,
            writes: Arc::new(Mutex::new(Vec::new())),
            blocked: Arc::new(AtomicBool::new(false)),
        };
        (a, b)
    }

    /// Size of every write made on this end, oldest first
    pub fn write_log(&self) -> WriteLog {
        WriteLog(self.writes.clone())
    }

    /// Handle that makes writes on this end fail with `WouldBlock`
    pub fn write_gate(&self) -> WriteGate {
        WriteGate(self.blocked.clone())
    }

    pub fn is_closed(&self) -> bool {
        self.inbound.lock().unwrap().closed
    }
}

impl Read for LocalStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut pipe = self.inbound.lock().unwrap();
        if pipe.bytes.is_empty() {
            if pipe.closed {
                return Ok(0);
            }
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let count = buf.len().min(pipe.bytes.len());
        for (slot, byte) in buf.iter_mut().zip(pipe.bytes.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}

impl Write for LocalStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.blocked.load(Ordering::SeqCst) {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let mut pipe = self.outbound.lock().unwrap();
        if pipe.closed {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        pipe.bytes.extend(buf);
        self.writes.lock().unwrap().push(buf.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FrameStream for LocalStream {
    fn shutdown(&mut self) -> io::Result<()> {
        self.inbound.lock().unwrap().closed = true;
        self.outbound.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Shared view of a [`LocalStream`]'s write sizes
#[derive(Clone)]
pub struct WriteLog(Arc<Mutex<Vec<usize>>>);

impl WriteLog {
    pub fn sizes(&self) -> Vec<usize> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

#[derive(Clone)]
pub struct WriteGate(Arc<AtomicBool>);

impl WriteGate {
    pub fn set_blocked(&self, blocked: bool) {
        self.0.store(blocked, Ordering::SeqCst);
    }
}

/// Accepted server-side ends waiting to be picked up
type Backlog = Arc<Mutex<VecDeque<LocalStream>>>;

/// Server side of the in-memory transport
pub struct LocalAcceptor {
    backlog: Backlog,
    accepted: usize,
}

/// Client side of the in-memory transport: each call opens a new stream
#[derive(Clone)]
pub struct LocalConnector {
    backlog: Backlog,
}

impl LocalAcceptor {
    pub fn new() -> (LocalAcceptor, LocalConnector) {
        let backlog = Backlog::default();
        (
            LocalAcceptor {
                backlog: backlog.clone(),
                accepted: 0,
            },
            LocalConnector { backlog },
        )
    }
}

impl LocalConnector {
    /// Returns the client end; the server end is accepted on the next poll.
    /// The write log and gate belong to the server end.
    pub fn connect(&self) -> (LocalStream, WriteLog, WriteGate) {
        let (client, server) = LocalStream::pair();
        let log = server.write_log();
        let gate = server.write_gate();
        self.backlog.lock().unwrap().push_back(server);
        (client, log, gate)
    }
}

impl Acceptor for LocalAcceptor {
    fn accept(&mut self, _psk: Option<&NoisePsk>) -> io::Result<Option<PendingClient>> {
        let Some(stream) = self.backlog.lock().unwrap().pop_front() else {
            return Ok(None);
        };
        self.accepted += 1;
        let peer = format!("local:{}", self.accepted);
        Ok(Some(PendingClient {
            helper: Box::new(PlaintextFrameHelper::new(stream, &peer)),
            peer,
        }))
    }
}

impl From<LocalAcceptor> for Box<dyn Acceptor> {
    fn from(acceptor: LocalAcceptor) -> Self {
        Box::new(acceptor)
    }
}
