//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}

/// One entry of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub room_name: String,
    pub input_clients: Vec<u64>,
    pub output_clients: Vec<u64>,
    pub subscriptions_count: usize,
    /// `None` when no beat is running
    pub bpm: Option<f64>,
}

/// Response of `GET /api/rooms/{room_name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub room_name: String,
    pub input_clients: Vec<u64>,
    pub output_clients: Vec<u64>,
    pub subscriptions_count: usize,
    pub beat: Option<BeatDetailDto>,
    pub last_tempo_change: Option<TempoChangeDto>,
}

/// Beat of a room, with human-readable times next to the raw epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatDetailDto {
    pub bpm: f64,
    pub start_timestamp: f64,
    pub started_at: Option<String>,
    pub last_beat_number: i64,
    pub next_beat_timestamp: f64,
    pub next_beat_at: Option<String>,
}

/// Last tempo change stored for a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoChangeDto {
    pub bpm: f64,
    pub action_timestamp: f64,
    pub next_beat_number: i64,
    pub next_beat_timestamp: f64,
}
