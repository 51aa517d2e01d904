//! UseCase: 接続処理
//!
//! WebSocket 接続が確立した時点ではまだどのルームにも属していません。
//! ここでは送信チャンネルを MessagePusher に登録するだけで、
//! ルームへの参加は JOIN_ROOM_REQUEST / SUBSCRIBE_TO_ROOM_REQUEST で行います。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel};

/// 接続のユースケース
pub struct ConnectClientUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 新しい接続を登録し、その ConnectionId を返す
    pub async fn execute(&self, sender: PusherChannel) -> ConnectionId {
        let connection = ConnectionId::generate();
        self.message_pusher.register_client(connection, sender).await;
        connection
    }
}
