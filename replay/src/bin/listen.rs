//! Minimal stand-in for the controller's UDP ingest. Prints every sample it
//! receives and flags sequence gaps.

use clap::Parser;
use log::{info, warn};
use std::{net::UdpSocket, process};
use telemetry_replay::protocol::{SeqTracker, TelemetrySample};

const RECV_BUFFER_SIZE: usize = 2048;

/// Receive and print replayed telemetry samples
#[derive(Parser, Debug)]
#[command(name = "replay-listen", version, long_about = None)]
struct Args {
    /// Local address to listen on
    #[arg(default_value = "127.0.0.1:9000")]
    bind: String,
}

fn main() {
    let args = Args::parse();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let socket = UdpSocket::bind(&args.bind).unwrap_or_else(|err| {
        eprintln!("could not bind {}: {}", args.bind, err);
        process::exit(1);
    });
    info!("udp listening {}", args.bind);

    let mut buf = [0u8; RECV_BUFFER_SIZE];
    let mut tracker = SeqTracker::new();

    loop {
        let (n, from) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err) => {
                warn!("udp read error: {}", err);
                continue;
            }
        };

        let sample = match TelemetrySample::from_bytes(&buf[..n]) {
            Ok(sample) => sample,
            Err(err) => {
                warn!("undecodable datagram from {}: {}", from, err);
                continue;
            }
        };

        if let Some(gap) = tracker.observe(sample.seq) {
            warn!("sequence gap: expected {}, got {}", gap.expected, gap.got);
        }

        println!("Received sample from {}: {:?}", from, sample);
    }
}
