//! UseCase: メッセージ送信
//!
//! 返信（SYNC_REPLY, JOIN_ROOM_REPLY, SUBSCRIBE_TO_ROOM_REPLY, ERROR）と
//! ROOM_STATE_UPDATE の一斉送信を担当します。送信内容の JSON は UI 層で生成されます。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher};

/// メッセージ送信のユースケース
pub struct PushMessageUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl PushMessageUseCase {
    /// 新しい PushMessageUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// リクエスト元の接続にだけ返信する
    pub async fn reply(
        &self,
        connection: &ConnectionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(connection, message).await
    }

    /// 複数の接続に同じメッセージを送る（書き込めない接続はスキップ）
    pub async fn broadcast(
        &self,
        recipients: Vec<ConnectionId>,
        message: &str,
    ) -> Result<(), MessagePushError> {
        if recipients.is_empty() {
            return Ok(());
        }
        self.message_pusher.broadcast(recipients, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message_pusher::MockMessagePusher;

    #[tokio::test]
    async fn test_reply_pushes_to_requester() {
        // テスト項目: 返信はリクエスト元の接続にだけ送られる
        // given (前提条件):
        let connection = ConnectionId::generate();
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(move |target, content| {
                target == &connection && content == r#"{"type":"ERROR","message":"boom"}"#
            })
            .times(1)
            .returning(|_, _| Ok(()));
        pusher.expect_broadcast().never();
        let usecase = PushMessageUseCase::new(Arc::new(pusher));

        // when (操作):
        let result = usecase
            .reply(&connection, r#"{"type":"ERROR","message":"boom"}"#)
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_without_recipients_is_noop() {
        // テスト項目: 送信先が空ならブロードキャストしない
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = PushMessageUseCase::new(Arc::new(pusher));

        // when (操作):
        let result = usecase.broadcast(Vec::new(), "{}").await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_recipient() {
        // テスト項目: 全ての送信先を 1 回の broadcast で渡す
        // given (前提条件):
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .withf(move |targets, content| {
                targets == &vec![alice, bob] && content == "{\"type\":\"ROOM_STATE_UPDATE\"}"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = PushMessageUseCase::new(Arc::new(pusher));

        // when (操作):
        let result = usecase
            .broadcast(vec![alice, bob], "{\"type\":\"ROOM_STATE_UPDATE\"}")
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
