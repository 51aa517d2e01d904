//! UseCase layer: one application operation per module.
//!
//! Use cases depend only on the domain ports (`RoomRepository`,
//! `MessagePusher`, `Clock`). Serializing to the wire format is left to the
//! UI layer, which hands over ready-made JSON for every push.

pub mod connect_client;
pub mod disconnect_client;
pub mod error;
pub mod get_rooms;
pub mod join_room;
pub mod leave_room;
pub mod push_message;
pub mod relay_motion;
pub mod schedule_beat;
pub mod set_tempo;
pub mod subscribe_room;
pub mod sync_beat;
pub mod sync_clock;

pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{GetRoomDetailError, RoomActionError};
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use push_message::PushMessageUseCase;
pub use relay_motion::RelayMotionUseCase;
pub use schedule_beat::ScheduleBeatUseCase;
pub use set_tempo::SetTempoUseCase;
pub use subscribe_room::SubscribeRoomUseCase;
pub use sync_beat::SyncBeatUseCase;
pub use sync_clock::SyncClockUseCase;
