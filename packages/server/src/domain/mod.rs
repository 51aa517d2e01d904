//! Domain layer: rooms, beats and the ports the use cases depend on.

pub mod beat;
pub mod broadcast;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use beat::{BeatTimes, extrapolate};
pub use broadcast::{BroadcastKind, fan_out};
pub use entity::{
    BeatSnapshot, BeatState, BeatSyncOutcome, Departure, JoinOutcome, Room, RoomSnapshot,
    RoomUpdate, SyncReply, TempoChange,
};
pub use error::{DomainError, MessagePushError, RepositoryError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use registry::{RoomRegistry, UserIdAllocator};
pub use repository::RoomRepository;
pub use value_object::{Bpm, ClientRole, ConnectionId, RoomName, UserId};
