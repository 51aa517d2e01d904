//! UseCase: ルーム情報の取得（HTTP 診断用）

use std::sync::Arc;

use hyoshi_shared::time::Clock;

use crate::domain::{RoomName, RoomRepository, RoomSnapshot};

use super::error::GetRoomDetailError;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// 全ルームのスナップショットを名前順で返す
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        let now = self.clock.now_millis();
        self.repository.list_room_snapshots(now).await
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl GetRoomDetailUseCase {
    /// 新しい GetRoomDetailUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// 指定したルームのスナップショットを返す
    pub async fn execute(&self, room_name: RoomName) -> Result<RoomSnapshot, GetRoomDetailError> {
        let now = self.clock.now_millis();
        self.repository
            .get_room_snapshot(&room_name, now)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}
