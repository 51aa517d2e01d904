//! UseCase: モーション入力の中継（MOTION_INPUT）
//!
//! input クライアントのモーション値を、同じルームの output クライアントと購読者に
//! そのまま中継します。input クライアント同士には送りません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomName, RoomRepository};

use super::error::RoomActionError;

/// モーション中継のユースケース
pub struct RelayMotionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayMotionUseCase {
    /// 新しい RelayMotionUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// モーション入力を中継し、中継先を返す
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
        json_message: &str,
    ) -> Result<Vec<ConnectionId>, RoomActionError> {
        let targets = self.repository.motion_targets(sender, room_name).await?;
        tracing::trace!(
            "Relaying motion in room '{}' to {} connection(s)",
            room_name,
            targets.len()
        );
        if !targets.is_empty() {
            self.message_pusher
                .broadcast(targets.clone(), json_message)
                .await?;
        }
        Ok(targets)
    }
}
