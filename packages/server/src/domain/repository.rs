//! Repository trait definition
//!
//! The interface the use cases need to reach room state. The concrete
//! implementation lives in the infrastructure layer.

use async_trait::async_trait;

use super::{
    BeatSyncOutcome, Bpm, ClientRole, ConnectionId, Departure, JoinOutcome, RepositoryError,
    RoomName, RoomSnapshot, RoomUpdate, TempoChange,
};

/// Room Repository trait
///
/// Every method is one atomic step against the whole registry: the lookup,
/// the mutation and the selection of notification targets happen together.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Join a room as input or output client
    async fn join_room(
        &self,
        connection: ConnectionId,
        room_name: RoomName,
        role: ClientRole,
        bpm: Option<Bpm>,
        now: f64,
    ) -> JoinOutcome;

    /// Subscribe to a room
    async fn subscribe(&self, connection: ConnectionId, room_name: RoomName, now: f64)
    -> RoomUpdate;

    /// Leave one room
    async fn leave_room(
        &self,
        connection: &ConnectionId,
        room_name: &RoomName,
        now: f64,
    ) -> Result<Departure, RepositoryError>;

    /// Leave every room the connection is in
    async fn disconnect(&self, connection: &ConnectionId, now: f64) -> Vec<Departure>;

    /// Store a tempo change and return the connections to relay it to
    async fn apply_tempo_change(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
        change: TempoChange,
    ) -> Result<Vec<ConnectionId>, RepositoryError>;

    /// Overwrite the beat anchor of a room
    async fn sync_beat(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
        beat_number: i64,
        beat_timestamp: f64,
    ) -> Result<BeatSyncOutcome, RepositoryError>;

    /// Connections a motion message must be relayed to
    async fn motion_targets(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
    ) -> Result<Vec<ConnectionId>, RepositoryError>;

    /// Connections a beat schedule must be relayed to
    async fn schedule_beat_targets(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
    ) -> Result<Vec<ConnectionId>, RepositoryError>;

    /// Snapshot of one room
    async fn get_room_snapshot(&self, room_name: &RoomName, now: f64) -> Option<RoomSnapshot>;

    /// Snapshots of every room, sorted by name
    async fn list_room_snapshots(&self, now: f64) -> Vec<RoomSnapshot>;
}
