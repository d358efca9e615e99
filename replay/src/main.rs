use clap::Parser;
use std::{error::Error, process};
use telemetry_replay::{Args, ReplayConfig};

fn main() {
    let args = Args::parse();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ReplayConfig::from(args);
    if let Err(err) = telemetry_replay::run(&config) {
        eprintln!("replay failed: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}
