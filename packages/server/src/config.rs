//! Coordinator configuration.

use std::{collections::HashMap, sync::Arc};

use hyoshi_shared::time::SystemClock;
use tokio::sync::Mutex;

use crate::{
    domain::{Bpm, RoomRegistry},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::AppState,
};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tempo of a room whose first output client does not ask for one
    pub default_bpm: Bpm,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            default_bpm: Bpm::DEFAULT,
        }
    }
}

impl ServerConfig {
    /// Wire the in-memory repository, the WebSocket pusher and the system clock
    ///
    /// Dependencies are created in order:
    /// 1. Repository
    /// 2. MessagePusher
    /// 3. UseCases (inside `AppState`)
    pub fn build_state(&self) -> AppState {
        // 1. Create Repository (in-memory registry)
        let registry = Arc::new(Mutex::new(RoomRegistry::new(self.default_bpm)));
        let repository = Arc::new(InMemoryRoomRepository::new(registry));

        // 2. Create MessagePusher (WebSocket implementation)
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));

        // 3. Create UseCases
        AppState::new(repository, message_pusher, Arc::new(SystemClock))
    }
}
