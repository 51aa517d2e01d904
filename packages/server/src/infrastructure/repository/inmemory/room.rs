//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `RoomRegistry` を 1 つの Mutex で保護し、全ての操作をその中で完結させます。
//! 1 メッセージの処理（参照・更新・通知先の選定）が他のメッセージと
//! 交互に実行されることはありません。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    BeatSyncOutcome, Bpm, ClientRole, ConnectionId, Departure, JoinOutcome, RepositoryError,
    RoomName, RoomRegistry, RoomRepository, RoomSnapshot, RoomUpdate, TempoChange,
};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// 全ルームのレジストリ
    registry: Arc<Mutex<RoomRegistry>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(registry: Arc<Mutex<RoomRegistry>>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join_room(
        &self,
        connection: ConnectionId,
        room_name: RoomName,
        role: ClientRole,
        bpm: Option<Bpm>,
        now: f64,
    ) -> JoinOutcome {
        let mut registry = self.registry.lock().await;
        registry.join_room(connection, room_name, role, bpm, now)
    }

    async fn subscribe(
        &self,
        connection: ConnectionId,
        room_name: RoomName,
        now: f64,
    ) -> RoomUpdate {
        let mut registry = self.registry.lock().await;
        registry.subscribe(connection, room_name, now)
    }

    async fn leave_room(
        &self,
        connection: &ConnectionId,
        room_name: &RoomName,
        now: f64,
    ) -> Result<Departure, RepositoryError> {
        let mut registry = self.registry.lock().await;
        registry.leave_room(connection, room_name, now)
    }

    async fn disconnect(&self, connection: &ConnectionId, now: f64) -> Vec<Departure> {
        let mut registry = self.registry.lock().await;
        registry.disconnect(connection, now)
    }

    async fn apply_tempo_change(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
        change: TempoChange,
    ) -> Result<Vec<ConnectionId>, RepositoryError> {
        let mut registry = self.registry.lock().await;
        registry.apply_tempo_change(sender, room_name, change)
    }

    async fn sync_beat(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
        beat_number: i64,
        beat_timestamp: f64,
    ) -> Result<BeatSyncOutcome, RepositoryError> {
        let mut registry = self.registry.lock().await;
        registry.sync_beat(sender, room_name, beat_number, beat_timestamp)
    }

    async fn motion_targets(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
    ) -> Result<Vec<ConnectionId>, RepositoryError> {
        let registry = self.registry.lock().await;
        registry.motion_targets(sender, room_name)
    }

    async fn schedule_beat_targets(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
    ) -> Result<Vec<ConnectionId>, RepositoryError> {
        let registry = self.registry.lock().await;
        registry.schedule_beat_targets(sender, room_name)
    }

    async fn get_room_snapshot(&self, room_name: &RoomName, now: f64) -> Option<RoomSnapshot> {
        let registry = self.registry.lock().await;
        registry.snapshot(room_name, now)
    }

    async fn list_room_snapshots(&self, now: f64) -> Vec<RoomSnapshot> {
        let registry = self.registry.lock().await;
        registry.snapshots(now)
    }
}
