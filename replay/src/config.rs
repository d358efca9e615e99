use clap::Parser;
use std::{path::PathBuf, time::Duration};

use crate::destination::Destination;

/// Pause between two sent samples.
pub const SEND_INTERVAL: Duration = Duration::from_secs(1);

/// Replay CSV telemetry samples to a controller over UDP
#[derive(Parser, Debug)]
#[command(name = "replay", version, long_about = None)]
pub struct Args {
    /// Controller address as <host>:<port>
    pub destination: Destination,

    /// CSV file with a header row
    pub csv_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub destination: Destination,
    pub csv_path: PathBuf,
    pub interval_ms: u64,
}

impl ReplayConfig {
    /// Get interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl From<Args> for ReplayConfig {
    fn from(args: Args) -> Self {
        ReplayConfig {
            destination: args.destination,
            csv_path: args.csv_path,
            interval_ms: SEND_INTERVAL.as_millis() as u64,
        }
    }
}
