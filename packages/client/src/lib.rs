//! Hyoshi client: clock-offset estimation, local beat scheduling and
//! reconnection against a Hyoshi coordinator.

pub mod beat_scheduler;
pub mod config;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod sync_estimator;
pub mod ui;

pub use runner::run_client;
