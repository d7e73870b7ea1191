//! UI event types.
//!
//! All external inputs (terminal, async results) are converted to `UiEvent`
//! before being processed by the reducer.
//!
//! ## Task Lifecycle Events
//!
//! Cancelable work uses a uniform lifecycle:
//! - The runtime emits `UiEvent::TaskStarted` once a task is actually spawned
//! - The runtime emits `UiEvent::TaskCompleted` with the result event when done
//! - The reducer is the only place that mutates `TaskState`, and drops a
//!   completion whose task is no longer active (e.g. after logout)

use crossterm::event::Event as CrosstermEvent;
use smartcity_core::event::Event;
use smartcity_core::store::PersistOutcome;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick (expires notices, triggers render).
    Tick,
    Terminal(CrosstermEvent),

    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    /// Weather fetch finished. `Err` carries the user-facing message.
    WeatherLoaded { result: Result<i64, String> },

    /// Sink write for a submitted event finished.
    EventPersisted {
        event: Event,
        outcome: PersistOutcome,
    },

    /// A side effect failed in a way the user should see.
    EffectFailed { message: String },
}
