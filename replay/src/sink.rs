use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
};

use crate::error::{ReplayError, Result};

pub trait DatagramSink {
    /// Sends one payload as a single datagram.
    fn send(&mut self, payload: &[u8]) -> io::Result<()>;
}

/// A connected UDP socket. Fire and forget: nothing is ever read back.
pub struct UdpSink {
    socket: UdpSocket,
}

impl UdpSink {
    /// Binds an ephemeral local port of the same address family as `peer`
    /// and connects to it.
    pub fn connect(peer: SocketAddr) -> Result<Self> {
        let local: SocketAddr = match peer {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket_err = |source| ReplayError::Socket { addr: peer, source };

        let socket = UdpSocket::bind(local).map_err(socket_err)?;
        socket.connect(peer).map_err(socket_err)?;

        Ok(Self { socket })
    }
}

impl DatagramSink for UdpSink {
    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.socket.send(payload).map(|_| ())
    }
}

impl<S: DatagramSink + ?Sized> DatagramSink for &mut S {
    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        (**self).send(payload)
    }
}
