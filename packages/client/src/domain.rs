//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use hyoshi_server::domain::{Bpm, extrapolate};

use crate::{config::ClientKind, error::ClientError};

/// A line typed on stdin, interpreted for the client's role
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `<frontToBack> <around>` (input clients)
    Motion { front_to_back: f64, around: f64 },
    /// `tempo <bpm>` (output clients)
    Tempo(Bpm),
    /// `sync`: run a clock-sync round now
    Resync,
    /// `quit` or `exit`
    Quit,
}

/// Parse one stdin line.
///
/// # Errors
///
/// Returns `ClientError::InvalidArgument` describing what the role accepts.
pub fn parse_command(line: &str, kind: ClientKind) -> Result<Command, ClientError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match (kind, words.as_slice()) {
        (_, ["sync"]) => Ok(Command::Resync),
        (_, ["quit"]) | (_, ["exit"]) => Ok(Command::Quit),
        (ClientKind::Output, ["tempo", value]) => {
            let value: f64 = value
                .parse()
                .map_err(|_| ClientError::InvalidArgument(format!("'{}' is not a number", value)))?;
            Bpm::new(value)
                .map(Command::Tempo)
                .map_err(|e| ClientError::InvalidArgument(e.to_string()))
        }
        (ClientKind::Input, [front_to_back, around]) => {
            match (front_to_back.parse::<f64>(), around.parse::<f64>()) {
                (Ok(front_to_back), Ok(around)) => Ok(Command::Motion {
                    front_to_back,
                    around,
                }),
                _ => Err(ClientError::InvalidArgument(
                    "motion must be two numbers: <frontToBack> <around>".to_string(),
                )),
            }
        }
        (ClientKind::Input, _) => Err(ClientError::InvalidArgument(
            "expected <frontToBack> <around>, sync or quit".to_string(),
        )),
        (ClientKind::Output, _) => Err(ClientError::InvalidArgument(
            "expected tempo <bpm>, sync or quit".to_string(),
        )),
        (ClientKind::Subscriber, _) => Err(ClientError::InvalidArgument(
            "expected sync or quit".to_string(),
        )),
    }
}

/// Pending beat implied by an anchor, as seen at `now`.
///
/// Returns the number and due time of the first beat at or after `now`
/// (strictly after, when `now` falls exactly on a beat).
pub fn pending_beat(bpm: Bpm, anchor_number: i64, anchor_timestamp: f64, now: f64) -> (i64, f64) {
    let times = extrapolate(bpm, anchor_number, anchor_timestamp, now);
    (times.last_beat_number + 1, times.next_beat_timestamp)
}

/// Check if the client should exit immediately based on the error type.
///
/// A rejected request or a bad argument would fail the same way on every
/// attempt.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::Rejected(_) | ClientError::InvalidArgument(_)
    )
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - Consecutive failed attempts so far
/// * `max_attempts` - The maximum number of consecutive failures allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}
