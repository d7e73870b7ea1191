//! Core SmartCity library (session rules, event store, map model, sinks, weather, config).

pub mod config;
pub mod event;
pub mod map;
pub mod persistence;
pub mod session;
pub mod store;
pub mod submission;
pub mod weather;
