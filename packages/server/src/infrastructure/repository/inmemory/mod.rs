//! In-memory repository implementations.

mod room;

pub use room::InMemoryRoomRepository;
