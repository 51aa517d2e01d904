//! WebSocket message DTOs.
//!
//! Every frame is a JSON object whose `type` field selects the message.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Role requested in `JOIN_ROOM_REQUEST`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientTypeDto {
    Input,
    Output,
}

/// Tempo change announced by a client and relayed unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTempoPayload {
    pub room_name: String,
    pub bpm: f64,
    pub action_timestamp: f64,
    pub next_beat_number: i64,
    pub next_beat_timestamp: f64,
}

/// A beat asserted (`SYNC_BEAT`) or scheduled (`SCHEDULE_BEAT`) by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatPayload {
    pub room_name: String,
    pub beat_number: i64,
    pub beat_timestamp: f64,
}

/// `SYNC_BEAT` as relayed by the coordinator, carrying the room tempo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatSyncRelay {
    pub room_name: String,
    pub beat_number: i64,
    pub beat_timestamp: f64,
    pub bpm: f64,
}

/// Motion sample streamed by an input client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionInputPayload {
    pub room_name: String,
    pub user_id: u64,
    pub front_to_back: f64,
    pub around: f64,
    pub action_timestamp: f64,
    pub last_beat_number: i64,
    pub next_beat_timestamp: f64,
}

/// Extrapolated beat inside a room state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatDto {
    pub bpm: f64,
    pub start_timestamp: f64,
    pub last_beat_number: i64,
    pub next_beat_timestamp: f64,
}

/// Membership and beat of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateDto {
    pub input_clients: Vec<u64>,
    pub output_clients: Vec<u64>,
    pub subscriptions_count: usize,
    pub beat: Option<BeatDto>,
}

/// Messages sent from clients to the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    Sync {
        t1: f64,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoomRequest {
        room_name: String,
        client_type: ClientTypeDto,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bpm: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    SubscribeToRoomRequest {
        room_name: String,
    },
    #[serde(rename_all = "camelCase")]
    LeaveRoom {
        room_name: String,
    },
    SetTempo(SetTempoPayload),
    SyncBeat(BeatPayload),
    ScheduleBeat(BeatPayload),
    MotionInput(MotionInputPayload),
}

/// Messages sent from the coordinator to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    SyncReply {
        t1: f64,
        t2: f64,
        t3: f64,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoomReply {
        user_id: u64,
        room_state: RoomStateDto,
    },
    #[serde(rename_all = "camelCase")]
    SubscribeToRoomReply {
        room_name: String,
    },
    #[serde(rename_all = "camelCase")]
    RoomStateUpdate {
        room_name: String,
        room_state: RoomStateDto,
    },
    SetTempo(SetTempoPayload),
    SyncBeat(BeatSyncRelay),
    ScheduleBeat(BeatPayload),
    MotionInput(MotionInputPayload),
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// Build an `ERROR` envelope
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to the JSON text pushed over the socket
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
