//! Map feature slice.
//!
//! The map canvas: event circles and markers for the current mode, a cursor
//! that stands in for the pointer, and tap resolution (marker press opens the
//! detail view, surface press opens the event form for eligible roles).
//!
//! ## Module Structure
//!
//! - `state.rs`: MapState (viewport, cursor, marker focus)
//! - `update.rs`: Key and mouse handling, tap resolution
//! - `render.rs`: Canvas rendering

mod render;
mod state;
mod update;

pub use render::render_map;
pub use state::MapState;
pub use update::{handle_key, handle_mouse};
