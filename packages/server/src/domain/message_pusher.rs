//! MessagePusher trait definition
//!
//! Outbound delivery to connected clients. The use cases push through this
//! port; the infrastructure layer decides how bytes reach a socket.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// Outbound channel of one connection (serialized JSON messages)
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound channel of a new connection
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    /// Forget a closed connection
    async fn unregister_client(&self, connection: &ConnectionId);

    /// Push a message to one connection
    async fn push_to(&self, connection: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// Push a message to many connections.
    ///
    /// Best effort: connections that cannot be written to are skipped.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
