//! UseCase: テンポ変更（SET_TEMPO）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SetTempoUseCase::execute() メソッド
//! - bpm とアンカーの上書き、送信者以外の全メンバーへの中継
//!
//! ### どのような状況を想定しているか
//! - 正常系：後から届いた変更が勝つ（last-write-wins）
//! - 異常系：beat の無いルームへのテンポ変更

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomName, RoomRepository, TempoChange};

use super::error::RoomActionError;

/// テンポ変更のユースケース
pub struct SetTempoUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SetTempoUseCase {
    /// 新しい SetTempoUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// テンポ変更を保存し、送信者以外のメンバーに中継する
    ///
    /// # Arguments
    ///
    /// * `sender` - テンポ変更を送った接続
    /// * `room_name` - 対象ルーム
    /// * `change` - 受け取ったテンポ変更（そのまま保存される）
    /// * `json_message` - 中継する JSON（受け取ったメッセージと同じ内容）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - 中継先
    /// * `Err(RoomActionError)` - ルームが無い、または beat が動いていない
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
        change: TempoChange,
        json_message: &str,
    ) -> Result<Vec<ConnectionId>, RoomActionError> {
        let targets = self
            .repository
            .apply_tempo_change(sender, room_name, change)
            .await?;
        tracing::info!(
            "Tempo of room '{}' set to {} bpm (next beat #{} at {})",
            room_name,
            change.bpm,
            change.next_beat_number,
            change.next_beat_timestamp
        );

        if !targets.is_empty() {
            self.message_pusher
                .broadcast(targets.clone(), json_message)
                .await?;
        }
        Ok(targets)
    }
}
