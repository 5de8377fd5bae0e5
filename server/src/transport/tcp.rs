use std::{
    io,
    net::{Ipv6Addr, SocketAddr, TcpListener},
};

use log::{debug, info, warn};
use socket2::{Domain, Protocol, Socket, Type};

use devlink_shared::PlaintextFrameHelper;

use super::{Acceptor, PendingClient};
use crate::server::{NoisePsk, ServerConfig};

/// Non-blocking TCP listener handing out plaintext frame helpers
pub struct TcpAcceptor {
    listener: TcpListener,
}

impl TcpAcceptor {
    /// Listens on the port and backlog of `config`
    pub fn from_config(config: &ServerConfig) -> io::Result<Self> {
        Self::bind(config.port, config.listen_backlog)
    }

    /// Listens on every interface, IPv4 and IPv6, at `port`. Port 0 picks
    /// a free one; see [`local_addr`](Self::local_addr). Hosts without IPv6
    /// get an IPv4-only listener.
    pub fn bind(port: u16, backlog: i32) -> io::Result<Self> {
        match Self::bind_dual_stack(port, backlog) {
            Ok(acceptor) => Ok(acceptor),
            Err(error) => {
                warn!("IPv6 listener failed ({}), falling back to IPv4", error);
                Self::bind_v4(([0, 0, 0, 0], port).into(), backlog)
            }
        }
    }

    fn bind_dual_stack(port: u16, backlog: i32) -> io::Result<Self> {
        let address = SocketAddr::from((Ipv6Addr::UNSPECIFIED, port));
        let socket = Socket::new(Domain::IPV6, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_only_v6(false)?;
        socket.set_reuse_address(true)?;
        socket.bind(&address.into())?;
        socket.listen(backlog)?;
        socket.set_nonblocking(true)?;

        let listener: TcpListener = socket.into();
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    /// Same as [`bind`](Self::bind) on loopback only, IPv4
    pub fn bind_local(port: u16, backlog: i32) -> io::Result<Self> {
        Self::bind_v4(([127, 0, 0, 1], port).into(), backlog)
    }

    fn bind_v4(address: SocketAddr, backlog: i32) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&address.into())?;
        socket.listen(backlog)?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            listener: socket.into(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Acceptor for TcpAcceptor {
    fn accept(&mut self, _psk: Option<&NoisePsk>) -> io::Result<Option<PendingClient>> {
        let (stream, address) = match self.listener.accept() {
            Ok(accepted) => accepted,
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(error) => return Err(error),
        };
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;

        let peer = address.to_string();
        debug!("Accepted TCP client {}", peer);
        Ok(Some(PendingClient {
            helper: Box::new(PlaintextFrameHelper::new(stream, &peer)),
            peer,
        }))
    }
}

impl From<TcpAcceptor> for Box<dyn Acceptor> {
    fn from(acceptor: TcpAcceptor) -> Self {
        Box::new(acceptor)
    }
}
