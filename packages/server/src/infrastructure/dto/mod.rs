//! Data Transfer Objects (DTOs) for the beat coordinator.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message envelopes (JSON with a `type` discriminant)
//! - `http`: HTTP diagnostics response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
