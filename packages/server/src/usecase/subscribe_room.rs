//! UseCase: ルーム購読（SUBSCRIBE_TO_ROOM_REQUEST）
//!
//! 購読者は UserId を持たず、ルームの状態と中継されるメッセージを受け取るだけです。
//! ルームが無ければ beat の無い状態で作成されます。

use std::sync::Arc;

use hyoshi_shared::time::Clock;

use crate::domain::{ConnectionId, RoomName, RoomRepository, RoomUpdate};

/// ルーム購読のユースケース
pub struct SubscribeRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl SubscribeRoomUseCase {
    /// 新しい SubscribeRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// 購読を実行し、全メンバーに送るスナップショットを返す
    pub async fn execute(&self, connection: ConnectionId, room_name: RoomName) -> RoomUpdate {
        let now = self.clock.now_millis();
        let update = self
            .repository
            .subscribe(connection, room_name.clone(), now)
            .await;
        tracing::info!("Connection '{}' subscribed to room '{}'", connection, room_name);
        update
    }
}
