//! Error types for the replayer.
//!
//! [`ReplayError`] aborts a run. [`RowError`] only ever skips a single CSV row.

use std::{io, net::SocketAddr, path::PathBuf};

use crate::destination::DestinationError;

/// Result type alias
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Fatal replay errors
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Malformed `host:port` argument
    #[error("invalid destination: {0}")]
    Destination(#[from] DestinationError),

    /// Host name did not resolve to any address
    #[error("could not resolve {host}:{port}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// CSV file missing or unreadable
    #[error("could not open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Structural CSV failure (bad UTF-8, read error mid-file)
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Local socket could not be bound or connected
    #[error("could not open UDP socket to {addr}")]
    Socket {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Datagram send failed
    #[error("failed to send datagram")]
    Send(#[source] io::Error),

    /// Sample could not be serialized
    #[error("failed to encode sample: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Per-row conversion failures. The row is skipped and the run continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("column `{column}`: could not convert {value:?} to a number")]
    InvalidNumber { column: &'static str, value: String },

    #[error("column `{column}`: {value} is not a finite number")]
    NotFinite { column: &'static str, value: f64 },

    #[error("column `{column}`: {value} is out of range")]
    OutOfRange { column: &'static str, value: f64 },
}
