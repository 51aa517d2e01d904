//! Entities of the coordinator domain.

use std::collections::HashMap;

use super::{
    beat::{BeatTimes, extrapolate},
    value_object::{Bpm, ConnectionId, RoomName, UserId},
};

/// Authoritative beat state of a room
#[derive(Debug, Clone, PartialEq)]
pub struct BeatState {
    /// Last tempo asserted by a tempo change (no smoothing)
    pub bpm: Bpm,
    /// When the beat state was created (epoch ms)
    pub start_timestamp: f64,
    pub last_synced_beat_number: i64,
    pub last_synced_beat_timestamp: f64,
}

impl BeatState {
    /// Fresh beat state anchored at beat 0 at `now`
    pub fn new(bpm: Bpm, now: f64) -> Self {
        Self {
            bpm,
            start_timestamp: now,
            last_synced_beat_number: 0,
            last_synced_beat_timestamp: now,
        }
    }

    pub fn beat_times(&self, now: f64) -> BeatTimes {
        extrapolate(
            self.bpm,
            self.last_synced_beat_number,
            self.last_synced_beat_timestamp,
            now,
        )
    }

    /// Overwrite the anchor with an asserted beat (last write wins)
    pub fn sync_beat(&mut self, beat_number: i64, beat_timestamp: f64) {
        self.last_synced_beat_number = beat_number;
        self.last_synced_beat_timestamp = beat_timestamp;
    }

    /// Adopt a tempo change and re-anchor on the beat it announces
    pub fn apply_tempo_change(&mut self, change: &TempoChange) {
        self.bpm = change.bpm;
        self.sync_beat(change.next_beat_number, change.next_beat_timestamp);
    }
}

/// Tempo change as asserted by an output client, stored verbatim
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoChange {
    pub bpm: Bpm,
    pub action_timestamp: f64,
    pub next_beat_number: i64,
    pub next_beat_timestamp: f64,
}

/// A named scope grouping input and output clients around one shared beat.
///
/// Subscribers are not part of the room: the registry keeps them per room
/// name so they stay attached across the room being dropped and recreated.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub name: RoomName,
    pub input_clients: HashMap<ConnectionId, UserId>,
    pub output_clients: HashMap<ConnectionId, UserId>,
    /// `None` until an output client joins
    pub beat: Option<BeatState>,
    pub last_tempo_change: Option<TempoChange>,
}

impl Room {
    pub fn new(name: RoomName) -> Self {
        Self {
            name,
            input_clients: HashMap::new(),
            output_clients: HashMap::new(),
            beat: None,
            last_tempo_change: None,
        }
    }

    /// A room is active while it has at least one input or output client
    pub fn is_active(&self) -> bool {
        !self.input_clients.is_empty() || !self.output_clients.is_empty()
    }

    pub fn contains(&self, connection: &ConnectionId) -> bool {
        self.input_clients.contains_key(connection) || self.output_clients.contains_key(connection)
    }

    /// Detach a connection from the input and output sets.
    ///
    /// Returns `true` if the connection was a participant.
    pub fn remove_connection(&mut self, connection: &ConnectionId) -> bool {
        let was_input = self.input_clients.remove(connection).is_some();
        let was_output = self.output_clients.remove(connection).is_some();
        was_input || was_output
    }

    /// Input and output connections
    pub fn participants(&self) -> impl Iterator<Item = &ConnectionId> {
        self.input_clients.keys().chain(self.output_clients.keys())
    }

    pub fn snapshot(&self, subscriptions_count: usize, now: f64) -> RoomSnapshot {
        let mut input_clients: Vec<UserId> = self.input_clients.values().copied().collect();
        let mut output_clients: Vec<UserId> = self.output_clients.values().copied().collect();
        input_clients.sort();
        output_clients.sort();

        RoomSnapshot {
            room_name: self.name.clone(),
            input_clients,
            output_clients,
            subscriptions_count,
            beat: self.beat.as_ref().map(|beat| {
                let times = beat.beat_times(now);
                BeatSnapshot {
                    bpm: beat.bpm,
                    start_timestamp: beat.start_timestamp,
                    last_beat_number: times.last_beat_number,
                    next_beat_timestamp: times.next_beat_timestamp,
                }
            }),
            last_tempo_change: self.last_tempo_change,
        }
    }
}

/// Extrapolated beat as seen at snapshot time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatSnapshot {
    pub bpm: Bpm,
    pub start_timestamp: f64,
    pub last_beat_number: i64,
    pub next_beat_timestamp: f64,
}

/// Point-in-time view of a room, as pushed to members
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub room_name: RoomName,
    /// Sorted ascending
    pub input_clients: Vec<UserId>,
    /// Sorted ascending
    pub output_clients: Vec<UserId>,
    pub subscriptions_count: usize,
    pub beat: Option<BeatSnapshot>,
    pub last_tempo_change: Option<TempoChange>,
}

/// A snapshot together with the connections it must be pushed to
#[derive(Debug, Clone, PartialEq)]
pub struct RoomUpdate {
    pub snapshot: RoomSnapshot,
    pub recipients: Vec<ConnectionId>,
}

/// Result of joining a room as input or output
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub user_id: UserId,
    pub update: RoomUpdate,
}

/// Result of a connection leaving one room
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub room_name: RoomName,
    /// `true` when the last input/output client left and the room was dropped
    pub session_ended: bool,
    /// `None` when the room was dropped
    pub update: Option<RoomUpdate>,
}

/// Result of asserting a beat
#[derive(Debug, Clone, PartialEq)]
pub struct BeatSyncOutcome {
    /// Tempo of the room at the time of the assertion
    pub bpm: Bpm,
    pub recipients: Vec<ConnectionId>,
}

/// Timestamps of one clock-sync exchange as seen by the coordinator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncReply {
    /// Client send time, echoed back
    pub t1: f64,
    /// Coordinator receive time
    pub t2: f64,
    /// Coordinator send time
    pub t3: f64,
}
