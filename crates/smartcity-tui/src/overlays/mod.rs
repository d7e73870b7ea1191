//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//! Each overlay is self-contained: it owns its state, key handler, and render function.
//!
//! ## Module Structure
//!
//! - `login.rs`: Login screen (forced while logged out)
//! - `event_form.rs`: Event creation dialog
//! - `mode_picker.rs`: Map filter selection and the traffic map link
//! - `event_detail.rs`: Read-only event view
//! - `render_utils.rs`: Shared rendering utilities for overlays
//!
//! ## Extension Trait
//!
//! `OverlayExt` provides convenience methods for `Option<Overlay>` to encapsulate
//! the common patterns used in the reducer.

pub mod event_detail;
pub mod event_form;
pub mod login;
pub mod mode_picker;
pub mod render_utils;

use crossterm::event::KeyEvent;
pub use event_detail::EventDetailState;
pub use event_form::EventFormState;
pub use login::LoginState;
pub use mode_picker::ModePickerState;
use ratatui::Frame;
use ratatui::layout::Rect;
use smartcity_core::event::EventId;

use crate::actions::Action;
use crate::effects::UiEffect;
use crate::state::TuiState;

// ============================================================================
// OverlayRequest / OverlayTransition / OverlayUpdate
// ============================================================================

/// Requests to open a new overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayRequest {
    EventForm,
    ModeSelect,
    EventDetail(EventId),
}

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
    Open(OverlayRequest),
}

/// Update returned by overlay key handlers.
///
/// Actions are dispatched before the transition is applied, so an action
/// still sees the overlay that produced it.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub actions: Vec<Action>,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            actions: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    pub fn open(request: OverlayRequest) -> Self {
        Self::new(OverlayTransition::Open(request))
    }

    #[must_use]
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

// ============================================================================
// Overlay
// ============================================================================

#[derive(Debug)]
pub enum Overlay {
    Login(LoginState),
    EventForm(EventFormState),
    ModeSelect(ModePickerState),
    EventDetail(EventDetailState),
}

impl Overlay {
    /// Builds the overlay for a request. `None` when the request no longer
    /// makes sense (unknown event id).
    pub fn open(request: OverlayRequest, tui: &TuiState) -> Option<Self> {
        let overlay = match request {
            OverlayRequest::EventForm => Overlay::EventForm(EventFormState::open(
                tui.session.is_emergency_mode(),
                tui.held_position,
            )),
            OverlayRequest::ModeSelect => {
                Overlay::ModeSelect(ModePickerState::open(tui.session.mode(), &tui.store))
            }
            OverlayRequest::EventDetail(id) => {
                let event = tui.store.get(&id)?.clone();
                Overlay::EventDetail(EventDetailState::open(event))
            }
        };
        Some(overlay)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        match self {
            Overlay::Login(l) => l.render(frame, area),
            Overlay::EventForm(f) => f.render(frame, area),
            Overlay::ModeSelect(p) => p.render(frame, area, tui.session.mode()),
            Overlay::EventDetail(d) => d.render(frame, area),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Login(l) => l.handle_key(tui, key),
            Overlay::EventForm(f) => f.handle_key(key),
            Overlay::ModeSelect(p) => p.handle_key(key),
            Overlay::EventDetail(d) => d.handle_key(key),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match self {
            Overlay::Login(l) => l.handle_paste(text),
            Overlay::EventForm(f) => f.handle_paste(text),
            Overlay::ModeSelect(_) | Overlay::EventDetail(_) => {}
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, Overlay::Login(_))
    }

    pub fn is_event_form(&self) -> bool {
        matches!(self, Overlay::EventForm(_))
    }
}

/// Routes a key to the active overlay, if any.
pub fn handle_overlay_key(
    tui: &TuiState,
    overlay: &mut Option<Overlay>,
    key: KeyEvent,
) -> Option<OverlayUpdate> {
    overlay.as_mut().map(|overlay| overlay.handle_key(tui, key))
}

// ============================================================================
// OverlayExt - Extension trait for Option<Overlay>
// ============================================================================

/// Extension trait for `Option<Overlay>` providing convenience render helpers.
pub trait OverlayExt {
    /// Renders the overlay if one is active.
    fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        if let Some(overlay) = self {
            overlay.render(frame, area, tui);
        }
    }
}
