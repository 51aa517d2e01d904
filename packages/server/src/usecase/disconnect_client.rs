//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 接続が属する全てのルームからの退出と MessagePusher からの登録解除
//!
//! ### どのような状況を想定しているか
//! - 正常系：最後の output が切断されると beat がリセットされ、購読者に通知される
//! - エッジケース：どのルームにも属していない接続の切断

use std::sync::Arc;

use hyoshi_shared::time::Clock;

use crate::domain::{ConnectionId, Departure, MessagePusher, RoomRepository};

/// 切断のユースケース
pub struct DisconnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// 退出したルームごとの結果（残ったメンバーへの通知内容を含む）
    pub async fn execute(&self, connection: &ConnectionId) -> Vec<Departure> {
        // 1. もう書き込めないチャンネルを先に外す
        self.message_pusher.unregister_client(connection).await;

        // 2. 全てのルームから退出
        let now = self.clock.now_millis();
        let departures = self.repository.disconnect(connection, now).await;
        for departure in &departures {
            if departure.session_ended {
                tracing::info!(
                    "Last active client left room '{}', room dropped",
                    departure.room_name
                );
            } else if departure.update.is_none() {
                tracing::debug!("Nobody left to notify in room '{}'", departure.room_name);
            }
        }

        departures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ClientRole, RoomName, RoomRegistry},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
    };
    use hyoshi_shared::time::FixedClock;
    use std::collections::HashMap;
    use tokio::sync::{Mutex, mpsc};

    fn create_test_repository() -> Arc<InMemoryRoomRepository> {
        let registry = Arc::new(Mutex::new(RoomRegistry::default()));
        Arc::new(InMemoryRoomRepository::new(registry))
    }

    fn create_test_message_pusher() -> Arc<WebSocketMessagePusher> {
        Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))))
    }

    #[tokio::test]
    async fn test_last_output_disconnect_drops_room_but_keeps_subscription() {
        // テスト項目: 最後の output が切断されるとルームは削除され、購読だけが残る
        // given (前提条件):
        let repository = create_test_repository();
        let message_pusher = create_test_message_pusher();
        let usecase = DisconnectClientUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            Arc::new(FixedClock::new(5_000.0)),
        );
        let room = RoomName::new("lobby");
        let output = ConnectionId::generate();
        let subscriber = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        message_pusher.register_client(output, tx).await;
        repository
            .join_room(output, room.clone(), ClientRole::Output, None, 0.0)
            .await;
        repository.subscribe(subscriber, room.clone(), 0.0).await;

        // when (操作):
        let departures = usecase.execute(&output).await;

        // then (期待する結果):
        assert_eq!(departures.len(), 1);
        assert!(departures[0].session_ended);
        assert!(departures[0].update.is_none());
        assert!(repository.get_room_snapshot(&room, 5_000.0).await.is_none());

        // 再作成されたルームの購読者数に残っている
        let rejoin = repository
            .join_room(ConnectionId::generate(), room, ClientRole::Output, None, 6_000.0)
            .await;
        assert_eq!(rejoin.update.snapshot.subscriptions_count, 1);
        assert!(rejoin.update.recipients.contains(&subscriber));

        // 送信チャンネルも外れている
        assert!(message_pusher.push_to(&output, "{}").await.is_err());
    }

    #[tokio::test]
    async fn test_disconnect_without_rooms() {
        // テスト項目: どのルームにも属していない接続の切断は何も返さない
        // given (前提条件):
        let usecase = DisconnectClientUseCase::new(
            create_test_repository(),
            create_test_message_pusher(),
            Arc::new(FixedClock::new(0.0)),
        );

        // when (操作):
        let departures = usecase.execute(&ConnectionId::generate()).await;

        // then (期待する結果):
        assert!(departures.is_empty());
    }
}
