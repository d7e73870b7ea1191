//! CLI command handlers.

pub mod config;
pub mod events;
pub mod map;
pub mod weather;
