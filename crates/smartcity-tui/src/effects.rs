//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! ## Cancellation Effects
//!
//! Cancellation is initiated from the reducer via `UiEffect::CancelTask`.
//! The runtime executes these by calling `token.cancel()` on the provided token.

use smartcity_core::event::Event;
use smartcity_core::store::Mode;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Fetch the temperature for the weather badge.
    FetchWeather { task: TaskId },

    /// Write a submitted event to the configured sink. The store append
    /// happens when the outcome comes back.
    PersistEvent { event: Event },

    /// Remember the selected mode in the config file.
    PersistMode { mode: Mode },

    /// Open a URL in the system browser.
    OpenBrowser { url: String },

    /// Cancel an in-progress task.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
