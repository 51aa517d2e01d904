//! Room coordinator for Hyoshi.
//!
//! Clients connect over WebSocket, estimate their clock offset against the
//! coordinator, then join rooms as input or output clients (or subscribe to
//! them). Each room owns one beat that the coordinator extrapolates on
//! demand and updates from tempo and beat assertions.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
