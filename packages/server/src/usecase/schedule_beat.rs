//! UseCase: beat 予定の中継（SCHEDULE_BEAT）
//!
//! 予定された beat を購読者にだけ中継します。ルームの状態は変えません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomName, RoomRepository};

use super::error::RoomActionError;

/// beat 予定中継のユースケース
pub struct ScheduleBeatUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ScheduleBeatUseCase {
    /// 新しい ScheduleBeatUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// beat 予定を購読者に中継し、中継先を返す
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        room_name: &RoomName,
        json_message: &str,
    ) -> Result<Vec<ConnectionId>, RoomActionError> {
        let targets = self
            .repository
            .schedule_beat_targets(sender, room_name)
            .await?;
        if !targets.is_empty() {
            self.message_pusher
                .broadcast(targets.clone(), json_message)
                .await?;
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ClientRole, RoomRegistry, message_pusher::MockMessagePusher},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_schedule_beat_goes_to_subscribers_only() {
        // テスト項目: beat 予定は購読者にだけ中継される
        // given (前提条件):
        let registry = Arc::new(Mutex::new(RoomRegistry::default()));
        let repository = Arc::new(InMemoryRoomRepository::new(registry));
        let room = RoomName::new("lobby");
        let output = ConnectionId::generate();
        let other_output = ConnectionId::generate();
        let subscriber = ConnectionId::generate();
        repository
            .join_room(output, room.clone(), ClientRole::Output, None, 0.0)
            .await;
        repository
            .join_room(other_output, room.clone(), ClientRole::Output, None, 0.0)
            .await;
        repository.subscribe(subscriber, room.clone(), 0.0).await;

        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .withf(move |targets, _| targets == &vec![subscriber])
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = ScheduleBeatUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        let targets = usecase
            .execute(&output, &room, "SCHEDULE_BEAT")
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(targets, vec![subscriber]);
    }
}
