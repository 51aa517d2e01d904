//! Client configuration.

use std::time::Duration;

use clap::ValueEnum;
use hyoshi_server::domain::Bpm;

use crate::{error::ClientError, sync_estimator::SyncEstimator};

/// How the client takes part in a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClientKind {
    /// Streams motion values read from stdin
    Input,
    /// Follows the room beat and may change its tempo
    Output,
    /// Watches room state, relayed motion and beats
    Subscriber,
}

impl std::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientKind::Input => f.write_str("input"),
            ClientKind::Output => f.write_str("output"),
            ClientKind::Subscriber => f.write_str("subscriber"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the coordinator
    pub url: String,
    pub room: String,
    pub kind: ClientKind,
    /// Tempo to start the room with when this output client creates its beat
    pub bpm: Option<f64>,
    /// Samples per clock-sync round
    pub sync_samples: usize,
    /// Spacing between clock-sync probes
    pub sync_interval: Duration,
    /// Periodic re-synchronization; `None` means manual only
    pub resync_every: Option<Duration>,
    pub max_reconnect_attempts: u32,
    pub reconnect_interval: Duration,
    /// An output client asserts the beat every this many fired beats (0 disables)
    pub beat_sync_every: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080/ws".to_string(),
            room: "default".to_string(),
            kind: ClientKind::Output,
            bpm: None,
            sync_samples: SyncEstimator::DEFAULT_ROUND_SIZE,
            sync_interval: Duration::from_millis(10),
            resync_every: None,
            max_reconnect_attempts: 5,
            reconnect_interval: Duration::from_secs(3),
            beat_sync_every: 4,
        }
    }
}

impl ClientConfig {
    /// Reject settings no session could run with
    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ClientError::InvalidArgument(format!(
                "URL must start with ws:// or wss://: {}",
                self.url
            )));
        }
        if self.room.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "Room name must not be empty".to_string(),
            ));
        }
        if let Some(bpm) = self.bpm {
            Bpm::new(bpm).map_err(|e| ClientError::InvalidArgument(e.to_string()))?;
        }
        if self.sync_samples == 0 {
            return Err(ClientError::InvalidArgument(
                "At least one sync sample is required".to_string(),
            ));
        }
        if self.sync_interval.is_zero() || self.resync_every.is_some_and(|d| d.is_zero()) {
            return Err(ClientError::InvalidArgument(
                "Sync intervals must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
