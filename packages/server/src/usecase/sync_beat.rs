//! UseCase: beat の同期（SYNC_BEAT）
//!
//! output クライアントが「beat N は時刻 T」と宣言すると、ルームのアンカーを
//! その組で上書きします（last-write-wins）。中継にはルームの現在の bpm を付けます。

use std::sync::Arc;

use crate::domain::{BeatSyncOutcome, ConnectionId, MessagePusher, RoomName, RoomRepository};

use super::error::RoomActionError;

/// beat 同期のユースケース
pub struct SyncBeatUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SyncBeatUseCase {
    /// 新しい SyncBeatUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// アンカーを上書きする
    ///
    /// 中継メッセージには bpm が必要なため、送信は [`Self::relay`] で別に行います。
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
        beat_number: i64,
        beat_timestamp: f64,
    ) -> Result<BeatSyncOutcome, RoomActionError> {
        let outcome = self
            .repository
            .sync_beat(sender, room_name, beat_number, beat_timestamp)
            .await?;
        tracing::debug!(
            "Room '{}' anchored at beat #{} ({})",
            room_name,
            beat_number,
            beat_timestamp
        );
        Ok(outcome)
    }

    /// bpm を付けた SYNC_BEAT を送信者以外のメンバーに中継する
    pub async fn relay(
        &self,
        outcome: BeatSyncOutcome,
        json_message: &str,
    ) -> Result<(), RoomActionError> {
        if outcome.recipients.is_empty() {
            return Ok(());
        }
        self.message_pusher
            .broadcast(outcome.recipients, json_message)
            .await?;
        Ok(())
    }
}
