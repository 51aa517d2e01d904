//! Value objects of the coordinator domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

/// Room name.
///
/// Free-form and case-sensitive. Rooms are created lazily on first use, so
/// any string (including the empty one) names a valid room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RoomName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RoomName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Numeric identity handed to input and output clients on join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(u64);

impl UserId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of one WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random connection ID (UUID v4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tempo in beats per minute.
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Bpm(f64);

impl Bpm {
    /// Tempo a room starts with when the first output client does not ask for one
    pub const DEFAULT: Bpm = Bpm(120.0);

    pub fn new(value: f64) -> Result<Self, DomainError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidBpm(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Duration of one beat in milliseconds
    pub fn beat_interval_ms(&self) -> f64 {
        60_000.0 / self.0
    }
}

impl Default for Bpm {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Bpm {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Bpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role a client joins a room with.
///
/// Subscribers are not a role: they attach through a separate subscription
/// and never receive a [`UserId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientRole {
    /// Streams a motion signal
    Input,
    /// Owns the room's beat and renders output driven by it
    Output,
}

impl fmt::Display for ClientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientRole::Input => f.write_str("input"),
            ClientRole::Output => f.write_str("output"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpm_accepts_positive_values() {
        // テスト項目: 正の有限値は Bpm として受け入れられる
        // given (前提条件):
        let value = 140.5;

        // when (操作):
        let bpm = Bpm::new(value);

        // then (期待する結果):
        assert_eq!(bpm.map(|b| b.value()), Ok(140.5));
    }

    #[test]
    fn test_bpm_rejects_zero_negative_and_non_finite() {
        // テスト項目: 0 以下や有限でない値は InvalidBpm エラーになる
        // given (前提条件):
        let values = [0.0, -1.0, f64::INFINITY];

        // when (操作) / then (期待する結果):
        for value in values {
            assert_eq!(Bpm::new(value), Err(DomainError::InvalidBpm(value)));
        }
        assert!(Bpm::new(f64::NAN).is_err());
    }

    #[test]
    fn test_bpm_beat_interval() {
        // テスト項目: 120 BPM の拍間隔は 500ms
        // given (前提条件):
        let bpm = Bpm::DEFAULT;

        // when (操作):
        let interval = bpm.beat_interval_ms();

        // then (期待する結果):
        assert_eq!(interval, 500.0);
    }

    #[test]
    fn test_room_name_is_case_sensitive() {
        // テスト項目: ルーム名は大文字小文字を区別する
        // given (前提条件):
        let lower = RoomName::from("room-a");
        let upper = RoomName::from("Room-A");

        // when (操作) / then (期待する結果):
        assert_ne!(lower, upper);
        assert_eq!(lower.as_str(), "room-a");
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 生成される ConnectionId は毎回異なる
        // given (前提条件) / when (操作):
        let first = ConnectionId::generate();
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }
}
