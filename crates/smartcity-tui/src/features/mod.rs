//! Feature slices for the TUI (state/update/render per slice).

pub mod map;
pub mod statusline;
pub mod weather;
