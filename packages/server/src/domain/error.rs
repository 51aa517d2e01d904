//! Domain error types.

use thiserror::Error;

/// Errors raised while constructing domain values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Invalid bpm {0}: tempo must be a finite number greater than zero")]
    InvalidBpm(f64),
}

/// Errors raised by room registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Room '{0}' has no running beat")]
    BeatNotRunning(String),

    #[error("Connection is not a member of room '{0}'")]
    NotAMember(String),
}

/// Errors raised while pushing messages to connections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' not found")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
