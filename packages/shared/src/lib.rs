//! Utilities shared by the Hyoshi server and client.

pub mod logger;
pub mod time;
