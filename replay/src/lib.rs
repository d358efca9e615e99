//! Replays CSV network measurements as UDP telemetry datagrams.

pub mod config;
pub mod destination;
pub mod error;
pub mod protocol;
pub mod replayer;
pub mod row;
pub mod sink;

pub use config::{Args, ReplayConfig, SEND_INTERVAL};
pub use destination::Destination;
pub use error::{ReplayError, RowError};
pub use protocol::TelemetrySample;
pub use replayer::{ReplaySummary, Replayer, run};
