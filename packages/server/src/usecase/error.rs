//! UseCase layer error types.

use thiserror::Error;

use crate::domain::{DomainError, MessagePushError, RepositoryError};

/// Errors of the room use cases (join, leave, tempo, beat, relays).
///
/// Every variant is reported back to the requesting connection as an
/// `ERROR` message; none of them ends the connection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoomActionError {
    #[error("Invalid bpm {0}: tempo must be a finite number greater than zero")]
    InvalidBpm(f64),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Room '{0}' has no running beat")]
    BeatNotRunning(String),

    #[error("Not a member of room '{0}'")]
    NotAMember(String),

    #[error("Failed to relay message: {0}")]
    RelayFailed(String),
}

impl From<RepositoryError> for RoomActionError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(name) => RoomActionError::RoomNotFound(name),
            RepositoryError::BeatNotRunning(name) => RoomActionError::BeatNotRunning(name),
            RepositoryError::NotAMember(name) => RoomActionError::NotAMember(name),
        }
    }
}

impl From<DomainError> for RoomActionError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidBpm(value) => RoomActionError::InvalidBpm(value),
        }
    }
}

impl From<MessagePushError> for RoomActionError {
    fn from(error: MessagePushError) -> Self {
        RoomActionError::RelayFailed(error.to_string())
    }
}

/// Error when getting room detail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room not found")]
    RoomNotFound,
}
