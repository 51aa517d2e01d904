//! UseCase: ルーム退出（LEAVE_ROOM）

use std::sync::Arc;

use hyoshi_shared::time::Clock;

use crate::domain::{ConnectionId, Departure, RoomName, RoomRepository};

use super::error::RoomActionError;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// 退出を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Departure)` - 残ったメンバーに送るスナップショット（誰も残らなければ `None`）
    /// * `Err(RoomActionError)` - ルームが無い、またはメンバーでない
    pub async fn execute(
        &self,
        connection: &ConnectionId,
        room_name: &RoomName,
    ) -> Result<Departure, RoomActionError> {
        let now = self.clock.now_millis();
        let departure = self
            .repository
            .leave_room(connection, room_name, now)
            .await?;
        if departure.session_ended {
            tracing::info!(
                "Last active client left room '{}', room dropped",
                room_name
            );
        }
        tracing::info!("Connection '{}' left room '{}'", connection, room_name);
        Ok(departure)
    }
}
