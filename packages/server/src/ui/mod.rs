//! WebSocket coordinator server implementation.

mod handler;
mod server;
mod signal;
pub mod state; // UseCase 層からアクセスするため public

pub use server::Server;
pub use state::AppState;
