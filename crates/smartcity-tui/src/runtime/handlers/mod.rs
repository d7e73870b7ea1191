//! Async work behind `UiEffect`s.
//!
//! Each handler owns its inputs, does the I/O, and returns the `UiEvent` that
//! reports the result. The runtime spawns it and forwards that event to the
//! inbox; handlers never touch `AppState`.

pub mod persist;
pub mod weather;

pub use persist::*;
pub use weather::*;
