//! Server state shared by every handler.

use std::sync::Arc;

use hyoshi_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    domain::{MessagePusher, RoomRepository},
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, PushMessageUseCase, RelayMotionUseCase,
        ScheduleBeatUseCase, SetTempoUseCase, SubscribeRoomUseCase, SyncBeatUseCase,
        SyncClockUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// Clock（受信時刻の記録に使う）
    pub clock: Arc<dyn Clock>,
    /// ルームイベントの順序保証
    ///
    /// ルーム状態の変更と、それに伴う送信キューへの投入はこのロックを保持したまま行う。
    pub room_events: Mutex<()>,
    pub connect_client_usecase: ConnectClientUseCase,
    pub disconnect_client_usecase: DisconnectClientUseCase,
    pub push_message_usecase: PushMessageUseCase,
    pub sync_clock_usecase: SyncClockUseCase,
    pub join_room_usecase: JoinRoomUseCase,
    pub subscribe_room_usecase: SubscribeRoomUseCase,
    pub leave_room_usecase: LeaveRoomUseCase,
    pub set_tempo_usecase: SetTempoUseCase,
    pub sync_beat_usecase: SyncBeatUseCase,
    pub relay_motion_usecase: RelayMotionUseCase,
    pub schedule_beat_usecase: ScheduleBeatUseCase,
    pub get_rooms_usecase: GetRoomsUseCase,
    pub get_room_detail_usecase: GetRoomDetailUseCase,
}

impl AppState {
    /// Build every use case on top of one repository, pusher and clock
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connect_client_usecase: ConnectClientUseCase::new(message_pusher.clone()),
            disconnect_client_usecase: DisconnectClientUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            ),
            push_message_usecase: PushMessageUseCase::new(message_pusher.clone()),
            sync_clock_usecase: SyncClockUseCase::new(clock.clone()),
            join_room_usecase: JoinRoomUseCase::new(repository.clone(), clock.clone()),
            subscribe_room_usecase: SubscribeRoomUseCase::new(repository.clone(), clock.clone()),
            leave_room_usecase: LeaveRoomUseCase::new(repository.clone(), clock.clone()),
            set_tempo_usecase: SetTempoUseCase::new(repository.clone(), message_pusher.clone()),
            sync_beat_usecase: SyncBeatUseCase::new(repository.clone(), message_pusher.clone()),
            relay_motion_usecase: RelayMotionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            ),
            schedule_beat_usecase: ScheduleBeatUseCase::new(repository.clone(), message_pusher),
            get_rooms_usecase: GetRoomsUseCase::new(repository.clone(), clock.clone()),
            get_room_detail_usecase: GetRoomDetailUseCase::new(repository, clock.clone()),
            clock,
            room_events: Mutex::new(()),
        }
    }
}
