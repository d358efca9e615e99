use std::{
    fmt,
    io,
    net::{SocketAddr, ToSocketAddrs},
    str::FromStr,
};

use crate::error::{ReplayError, Result};

/// Errors parsing a `host:port` argument
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DestinationError {
    #[error("expected <host>:<port>, got {0:?}")]
    MissingPort(String),

    #[error("expected a single ':' in {0:?}")]
    TooManyColons(String),

    #[error("empty host in {0:?}")]
    EmptyHost(String),

    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

/// Where samples are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub host: String,
    pub port: u16,
}

impl Destination {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Destination {
            host: host.into(),
            port,
        }
    }

    /// Resolves the host with the system resolver. The first IPv4 address wins.
    pub fn resolve(&self) -> Result<SocketAddr> {
        let resolve_err = |source| ReplayError::Resolve {
            host: self.host.clone(),
            port: self.port,
            source,
        };

        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(resolve_err)
            .and_then(|addrs| {
                first_ipv4(addrs).ok_or_else(|| {
                    resolve_err(io::Error::new(
                        io::ErrorKind::NotFound,
                        "no IPv4 address returned",
                    ))
                })
            })
    }
}

/// Samples always travel over IPv4, even when the resolver lists IPv6 first.
fn first_ipv4(addrs: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    addrs.into_iter().find(SocketAddr::is_ipv4)
}

impl FromStr for Destination {
    type Err = DestinationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (host, port) = s
            .split_once(':')
            .ok_or_else(|| DestinationError::MissingPort(s.to_string()))?;

        if port.contains(':') {
            return Err(DestinationError::TooManyColons(s.to_string()));
        }
        if host.is_empty() {
            return Err(DestinationError::EmptyHost(s.to_string()));
        }

        let port = port
            .parse::<u16>()
            .map_err(|_| DestinationError::InvalidPort(port.to_string()))?;

        Ok(Destination::new(host, port))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
