//! Hyoshi CLI client.
//!
//! Synchronizes its clock with the coordinator, joins a room and follows the
//! room beat. Input clients send motion values typed on stdin, output clients
//! can change the tempo, subscribers watch the room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hyoshi-client -- --role output --room studio --bpm 96
//! cargo run --bin hyoshi-client -- --role input --room studio
//! cargo run --bin hyoshi-client -- --role subscriber --room studio --resync-every-secs 30
//! ```

use std::time::Duration;

use clap::Parser;

use hyoshi_client::config::{ClientConfig, ClientKind};
use hyoshi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hyoshi-client")]
#[command(about = "Beat-synchronized client for the Hyoshi coordinator", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Room to join
    #[arg(short = 'r', long, default_value = "default")]
    room: String,

    /// How this client takes part in the room
    #[arg(long, value_enum, default_value_t = ClientKind::Output)]
    role: ClientKind,

    /// Initial tempo when this output client starts the room beat
    #[arg(short = 'b', long)]
    bpm: Option<f64>,

    /// Samples per clock-sync round
    #[arg(long, default_value = "30")]
    sync_samples: usize,

    /// Milliseconds between clock-sync probes
    #[arg(long, default_value = "10")]
    sync_interval_ms: u64,

    /// Re-run clock sync every this many seconds
    #[arg(long)]
    resync_every_secs: Option<u64>,

    /// Consecutive failed connections before giving up
    #[arg(long, default_value = "5")]
    max_reconnect_attempts: u32,

    /// Seconds to wait before reconnecting
    #[arg(long, default_value = "3")]
    reconnect_interval_secs: u64,

    /// Output clients assert the beat every this many beats (0 disables)
    #[arg(long, default_value = "4")]
    beat_sync_every: u64,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        Self {
            url: args.url,
            room: args.room,
            kind: args.role,
            bpm: args.bpm,
            sync_samples: args.sync_samples,
            sync_interval: Duration::from_millis(args.sync_interval_ms),
            resync_every: args.resync_every_secs.map(Duration::from_secs),
            max_reconnect_attempts: args.max_reconnect_attempts,
            reconnect_interval: Duration::from_secs(args.reconnect_interval_secs),
            beat_sync_every: args.beat_sync_every,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ClientConfig::from(Args::parse());
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = hyoshi_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
