//! UseCase: 時刻同期（SYNC → SYNC_REPLY）
//!
//! クライアントは `t1`（送信時刻）を送り、サーバは受信時刻 `t2` と
//! 返信直前の時刻 `t3` を付けて返します。`t2` はフレームを受け取った瞬間に
//! UI 層で記録されたものを受け取ります。

use std::sync::Arc;

use hyoshi_shared::time::Clock;

use crate::domain::SyncReply;

/// 時刻同期のユースケース
pub struct SyncClockUseCase {
    /// Clock（現在時刻の抽象化）
    clock: Arc<dyn Clock>,
}

impl SyncClockUseCase {
    /// 新しい SyncClockUseCase を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// `t3` を付けて返信内容を確定する
    ///
    /// # Arguments
    ///
    /// * `t1` - クライアントの送信時刻（そのまま返す）
    /// * `received_at` - フレームを受信した時刻（`t2`）
    pub fn execute(&self, t1: f64, received_at: f64) -> SyncReply {
        SyncReply {
            t1,
            t2: received_at,
            t3: self.clock.now_millis(),
        }
    }
}
