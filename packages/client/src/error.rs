//! Error types for the Hyoshi client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not reach the coordinator, or the socket dropped before the room was joined
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The socket dropped after the room was joined
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The coordinator refused the join or subscribe request
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// No clock-sync reply arrived during a sync round
    #[error("Clock sync failed: no reply from server")]
    SyncFailed,

    /// Invalid configuration given on the command line
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
