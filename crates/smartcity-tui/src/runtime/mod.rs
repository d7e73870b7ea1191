//! Map screen runtime.
//!
//! Owns the terminal and `AppState`. Each pass of the loop gathers input and
//! finished async work, feeds it through `update`, runs the returned effects,
//! and redraws on ticks. Weather fetches and sink writes run on tokio tasks
//! and report back through the inbox channel (`inbox.rs`); their bodies live
//! in `handlers/`.

mod handlers;
mod inbox;

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use smartcity_core::config::Config;
use smartcity_core::persistence::EventSink;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::terminal::MapTerminal;
use crate::{render, terminal, update};

/// Tick rate while a fetch is in flight or the user is interacting.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Tick rate when the map is sitting idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

pub struct TuiRuntime {
    terminal: MapTerminal,
    pub state: AppState,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    /// Keeps the fast tick rate for a moment after a key press or click.
    last_input: Instant,
}

impl TuiRuntime {
    /// Enters the alternate screen and starts on the login overlay.
    pub fn new(config: Config, sink: EventSink) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(config, sink),
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_input: now,
        })
    }

    /// Runs until the user quits. Mouse capture is on only while this runs.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;
        let result = self.event_loop();
        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut needs_draw = true;

        while !self.state.tui.should_quit {
            for event in self.collect_events()? {
                match &event {
                    UiEvent::Terminal(_) => self.last_input = Instant::now(),
                    // Redraws are paced by ticks.
                    UiEvent::Tick => needs_draw = true,
                    _ => {}
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if needs_draw && !self.state.tui.should_quit {
                self.terminal
                    .draw(|frame| render::render(&self.state, frame))?;
                needs_draw = false;
            }
        }

        Ok(())
    }

    fn tick_interval(&self) -> Duration {
        let busy = self.state.tui.tasks.is_any_running()
            || self.last_input.elapsed() < IDLE_POLL_DURATION;
        if busy {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        }
    }

    /// Inbox results first, then terminal input, then a tick when one is due.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let tick_interval = self.tick_interval();
        let mut events = Vec::new();

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Don't block on the terminal when async results are already waiting.
        let wait = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };
        if event::poll(wait)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Feeds a runtime-side failure back through the reducer.
    fn report_failure(&mut self, message: String) {
        let effects = update::update(&mut self.state, UiEvent::EffectFailed { message });
        self.execute_effects(effects);
    }

    /// Runs `f` on a tokio task and delivers its event to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    /// Like `spawn_effect`, wrapped in `TaskStarted`/`TaskCompleted` so the
    /// reducer can cancel the task and drop its result once it is stale.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, f: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = CancellationToken::new();
        let started = TaskStarted {
            id,
            cancel: Some(cancel.clone()),
        };
        // Queued before the task exists, so it always precedes the completion.
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let result = Box::new(f(cancel).await);
            let _ = tx.send(UiEvent::TaskCompleted {
                kind,
                completed: TaskCompleted { id, result },
            });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::FetchWeather { task } => {
                let client = self.state.tui.weather_client.clone();
                self.spawn_task(TaskKind::Weather, task, move |cancel| {
                    handlers::fetch_weather(client, cancel)
                });
            }
            UiEffect::PersistEvent { event } => {
                let sink = self.state.tui.sink.clone();
                let collection = self.state.tui.config.persistence.collection.clone();
                self.spawn_effect(move || handlers::persist_event(sink, collection, event));
            }
            UiEffect::PersistMode { mode } => {
                // State already has the mode; only the next launch is affected.
                if let Err(err) = Config::save_mode(&mode) {
                    warn!(%mode, error = %err, "Failed to save mode");
                    self.report_failure("Could not save mode to config".to_string());
                }
            }
            UiEffect::OpenBrowser { url } => {
                if let Err(err) = open::that(&url) {
                    warn!(%url, error = %err, "Failed to open browser");
                    self.report_failure(format!("Could not open {url}"));
                }
            }
            UiEffect::CancelTask { kind, token } => {
                if let Some(token) = token {
                    debug!(?kind, "Cancelling task");
                    token.cancel();
                }
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
