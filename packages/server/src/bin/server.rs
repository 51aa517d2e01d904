//! Hyoshi beat coordinator.
//!
//! Keeps one shared tempo and beat per room and relays tempo, beat and motion
//! messages between the clients of each room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hyoshi-server
//! cargo run --bin hyoshi-server -- --host 0.0.0.0 --port 3000 --default-bpm 100
//! ```

use clap::Parser;
use hyoshi_server::{config::ServerConfig, domain::Bpm, ui::Server};
use hyoshi_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hyoshi-server")]
#[command(about = "Shared tempo and beat coordinator over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Tempo of a new room when its first output client does not send one
    #[arg(long, default_value = "120")]
    default_bpm: f64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let default_bpm = match Bpm::new(args.default_bpm) {
        Ok(bpm) => bpm,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        default_bpm,
    };

    let server = Server::new(config.build_state());
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
