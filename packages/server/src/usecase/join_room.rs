//! UseCase: ルーム参加（JOIN_ROOM_REQUEST）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルームの生成、UserId の割り当て、beat の初期化
//!
//! ### どのような状況を想定しているか
//! - 正常系：output クライアントの参加で beat が始まる
//! - 正常系：同じルームへの別接続からの参加で別の UserId が割り当てられる
//! - 異常系：不正な bpm

use std::sync::Arc;

use hyoshi_shared::time::Clock;

use crate::domain::{Bpm, ClientRole, ConnectionId, JoinOutcome, RoomName, RoomRepository};

use super::error::RoomActionError;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 参加する接続
    /// * `room_name` - 参加先のルーム名（無ければ作成される）
    /// * `role` - input / output
    /// * `bpm` - beat を開始する場合のテンポ（省略時はサーバのデフォルト）
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 割り当てた UserId と、全メンバーに送るスナップショット
    /// * `Err(RoomActionError::InvalidBpm)` - bpm が有限の正の数でない
    pub async fn execute(
        &self,
        connection: ConnectionId,
        room_name: RoomName,
        role: ClientRole,
        bpm: Option<f64>,
    ) -> Result<JoinOutcome, RoomActionError> {
        let bpm = bpm.map(Bpm::new).transpose()?;
        let now = self.clock.now_millis();

        let outcome = self
            .repository
            .join_room(connection, room_name.clone(), role, bpm, now)
            .await;
        tracing::info!(
            "Connection '{}' joined room '{}' as {} (user {})",
            connection,
            room_name,
            role,
            outcome.user_id
        );
        Ok(outcome)
    }
}
