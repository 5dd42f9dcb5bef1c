//! ScoreLink Relay Binary
//!
//! Pairs game clients and relays their score messages.

use clap::Parser;
use scorelink::network::Relay;
use scorelink::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// ScoreLink Relay
#[derive(Parser, Debug)]
#[command(name = "scorelink-relay")]
#[command(about = "Two-player score relay")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7777")]
    listen: String,

    /// Maximum concurrent player pairs
    #[arg(short, long, default_value = "64")]
    max_sessions: usize,

    /// Read timeout in milliseconds (0 = block forever)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout in milliseconds (0 = block forever)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scorelink=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("ScoreLink Relay v{}", scorelink::VERSION);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_sessions(args.max_sessions)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let relay = match Relay::bind(config) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to bind relay: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = relay.run() {
        tracing::error!("Relay error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Relay stopped");
}
