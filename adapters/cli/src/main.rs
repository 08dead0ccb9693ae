#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that hosts a headless Skirmish session.

mod config;
mod session;
mod transport;

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::session::{Session, SessionOptions};

/// Runs an authoritative Skirmish host with scripted clients.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with simulation tuning; defaults apply to anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 500)]
    ticks: u64,
    /// Overrides the tick rate from the config file.
    #[arg(long)]
    tick_rate: Option<u32>,
    /// Number of scripted clients, each owning one character.
    #[arg(long, default_value_t = 2)]
    clients: u32,
    /// Number of enemies spawned around the origin.
    #[arg(long, default_value_t = 3)]
    enemies: u32,
    /// Seed for patrol goals and packet loss.
    #[arg(long)]
    seed: Option<u64>,
    /// Probability in [0, 1] that an intent datagram is lost.
    #[arg(long, default_value_t = 0.0)]
    drop_rate: f64,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    ensure!(
        (0.0..=1.0).contains(&args.drop_rate),
        "--drop-rate must lie within [0, 1], got {}",
        args.drop_rate
    );

    let mut config = config::load(args.config.as_deref())?;
    if let Some(tick_rate) = args.tick_rate {
        config.tick_rate_hz = tick_rate;
    }
    if let Some(seed) = args.seed {
        config.pursuit.seed = seed;
    }
    config.validate()?;

    let options = SessionOptions {
        clients: args.clients,
        enemies: args.enemies,
        seed: config.pursuit.seed,
        drop_rate: args.drop_rate,
    };
    let mut session = Session::new(config, options);
    session.run(args.ticks);
    println!("{}", session.summary());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
