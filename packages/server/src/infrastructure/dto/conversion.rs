//! Conversion logic between DTOs and domain entities.

use crate::domain::{BeatSnapshot, Bpm, ClientRole, DomainError, RoomSnapshot, TempoChange};
use crate::infrastructure::dto::{http, websocket as dto};
use hyoshi_shared::time::millis_to_rfc3339;

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::ClientTypeDto> for ClientRole {
    fn from(dto: dto::ClientTypeDto) -> Self {
        match dto {
            dto::ClientTypeDto::Input => ClientRole::Input,
            dto::ClientTypeDto::Output => ClientRole::Output,
        }
    }
}

impl TryFrom<&dto::SetTempoPayload> for TempoChange {
    type Error = DomainError;

    fn try_from(dto: &dto::SetTempoPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            bpm: Bpm::new(dto.bpm)?,
            action_timestamp: dto.action_timestamp,
            next_beat_number: dto.next_beat_number,
            next_beat_timestamp: dto.next_beat_timestamp,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<BeatSnapshot> for dto::BeatDto {
    fn from(model: BeatSnapshot) -> Self {
        Self {
            bpm: model.bpm.value(),
            start_timestamp: model.start_timestamp,
            last_beat_number: model.last_beat_number,
            next_beat_timestamp: model.next_beat_timestamp,
        }
    }
}

impl From<&RoomSnapshot> for dto::RoomStateDto {
    fn from(model: &RoomSnapshot) -> Self {
        Self {
            input_clients: model.input_clients.iter().map(|id| id.value()).collect(),
            output_clients: model.output_clients.iter().map(|id| id.value()).collect(),
            subscriptions_count: model.subscriptions_count,
            beat: model.beat.map(dto::BeatDto::from),
        }
    }
}

impl From<&RoomSnapshot> for dto::ServerMessage {
    fn from(model: &RoomSnapshot) -> Self {
        dto::ServerMessage::RoomStateUpdate {
            room_name: model.room_name.as_str().to_string(),
            room_state: model.into(),
        }
    }
}

impl From<TempoChange> for http::TempoChangeDto {
    fn from(model: TempoChange) -> Self {
        Self {
            bpm: model.bpm.value(),
            action_timestamp: model.action_timestamp,
            next_beat_number: model.next_beat_number,
            next_beat_timestamp: model.next_beat_timestamp,
        }
    }
}

impl From<BeatSnapshot> for http::BeatDetailDto {
    fn from(model: BeatSnapshot) -> Self {
        Self {
            bpm: model.bpm.value(),
            start_timestamp: model.start_timestamp,
            started_at: millis_to_rfc3339(model.start_timestamp),
            last_beat_number: model.last_beat_number,
            next_beat_timestamp: model.next_beat_timestamp,
            next_beat_at: millis_to_rfc3339(model.next_beat_timestamp),
        }
    }
}

impl From<RoomSnapshot> for http::RoomSummaryDto {
    fn from(model: RoomSnapshot) -> Self {
        Self {
            room_name: model.room_name.into_string(),
            input_clients: model.input_clients.iter().map(|id| id.value()).collect(),
            output_clients: model.output_clients.iter().map(|id| id.value()).collect(),
            subscriptions_count: model.subscriptions_count,
            bpm: model.beat.map(|beat| beat.bpm.value()),
        }
    }
}

impl From<RoomSnapshot> for http::RoomDetailDto {
    fn from(model: RoomSnapshot) -> Self {
        Self {
            room_name: model.room_name.into_string(),
            input_clients: model.input_clients.iter().map(|id| id.value()).collect(),
            output_clients: model.output_clients.iter().map(|id| id.value()).collect(),
            subscriptions_count: model.subscriptions_count,
            beat: model.beat.map(http::BeatDetailDto::from),
            last_tempo_change: model.last_tempo_change.map(http::TempoChangeDto::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomName, UserId};

    fn snapshot_with_beat() -> RoomSnapshot {
        RoomSnapshot {
            room_name: RoomName::new("lobby"),
            input_clients: vec![UserId::new(1), UserId::new(4)],
            output_clients: vec![UserId::new(2)],
            subscriptions_count: 3,
            beat: Some(BeatSnapshot {
                bpm: Bpm::new(90.0).unwrap(),
                start_timestamp: 1_000.0,
                last_beat_number: 5,
                next_beat_timestamp: 4_999.5,
            }),
            last_tempo_change: None,
        }
    }

    #[test]
    fn test_set_tempo_payload_to_domain() {
        // テスト項目: SET_TEMPO の DTO がドメインのテンポ変更に変換される
        // given (前提条件):
        let payload = dto::SetTempoPayload {
            room_name: "lobby".to_string(),
            bpm: 140.0,
            action_timestamp: 900.0,
            next_beat_number: 8,
            next_beat_timestamp: 1_000.0,
        };

        // when (操作):
        let change = TempoChange::try_from(&payload).unwrap();

        // then (期待する結果):
        assert_eq!(change.bpm.value(), 140.0);
        assert_eq!(change.next_beat_number, 8);
        assert_eq!(change.next_beat_timestamp, 1_000.0);
    }

    #[test]
    fn test_set_tempo_payload_with_invalid_bpm() {
        // テスト項目: bpm が 0 以下の SET_TEMPO は変換できない
        // given (前提条件):
        let payload = dto::SetTempoPayload {
            room_name: "lobby".to_string(),
            bpm: 0.0,
            action_timestamp: 900.0,
            next_beat_number: 8,
            next_beat_timestamp: 1_000.0,
        };

        // when (操作):
        let result = TempoChange::try_from(&payload);

        // then (期待する結果):
        assert_eq!(result, Err(DomainError::InvalidBpm(0.0)));
    }

    #[test]
    fn test_snapshot_to_room_state() {
        // テスト項目: スナップショットが roomState に変換される
        // given (前提条件):
        let snapshot = snapshot_with_beat();

        // when (操作):
        let state: dto::RoomStateDto = (&snapshot).into();

        // then (期待する結果):
        assert_eq!(state.input_clients, vec![1, 4]);
        assert_eq!(state.output_clients, vec![2]);
        assert_eq!(state.subscriptions_count, 3);
        let beat = state.beat.unwrap();
        assert_eq!(beat.bpm, 90.0);
        assert_eq!(beat.last_beat_number, 5);
        assert_eq!(beat.next_beat_timestamp, 4_999.5);
    }

    #[test]
    fn test_snapshot_to_room_detail() {
        // テスト項目: スナップショットが HTTP の詳細 DTO に変換される
        // given (前提条件):
        let mut snapshot = snapshot_with_beat();
        snapshot.last_tempo_change = Some(TempoChange {
            bpm: Bpm::new(90.0).unwrap(),
            action_timestamp: 800.0,
            next_beat_number: 4,
            next_beat_timestamp: 900.0,
        });

        // when (操作):
        let detail: http::RoomDetailDto = snapshot.into();

        // then (期待する結果):
        assert_eq!(detail.room_name, "lobby");
        let beat = detail.beat.unwrap();
        assert_eq!(beat.started_at.as_deref(), Some("1970-01-01T00:00:01.000Z"));
        assert_eq!(detail.last_tempo_change.unwrap().next_beat_number, 4);
    }

    #[test]
    fn test_snapshot_without_beat_to_summary() {
        // テスト項目: beat の無いルームの一覧項目は bpm が None
        // given (前提条件):
        let mut snapshot = snapshot_with_beat();
        snapshot.beat = None;

        // when (操作):
        let summary: http::RoomSummaryDto = snapshot.into();

        // then (期待する結果):
        assert_eq!(summary.bpm, None);
        assert_eq!(summary.subscriptions_count, 3);
    }
}
