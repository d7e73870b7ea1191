//! Status line feature slice.
//!
//! Bottom of the main screen: the control bar (which actions the current role
//! may use) and a status row with role, mode, event count and transient
//! notices such as persistence failures.
//!
//! ## Module Structure
//!
//! - `state.rs`: StatusState (notice with expiry) and control visibility
//! - `render.rs`: Control bar and status row rendering

mod render;
mod state;

pub use render::{STATUS_HEIGHT, render_status};
pub use state::{ControlHint, Notice, NoticeLevel, StatusState, control_hints};
