//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.
//!
//! Key handlers and overlays describe what should happen as `Action`s;
//! `dispatch` is the single place those actions touch session, store and
//! overlay state.

use std::time::Instant;

use chrono::Utc;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use smartcity_core::event::EventId;
use smartcity_core::store::PersistOutcome;
use smartcity_core::submission::{EventDraft, build_event};
use smartcity_core::weather::WeatherBadge;
use tracing::{debug, info};

use crate::actions::Action;
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::map;
use crate::overlays::{self, LoginState, Overlay, OverlayRequest, OverlayTransition};
use crate::state::{AppState, TuiState};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.status.expire(Instant::now());
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            // A fetch spawned for a mount that has since been torn down.
            if kind == TaskKind::Weather && app.tui.weather_task != Some(started.id) {
                debug!(task = started.id.0, "Cancelling stale weather task");
                return vec![UiEffect::CancelTask {
                    kind,
                    token: started.cancel,
                }];
            }
            app.tui.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let ok = {
                let state = app.tui.tasks.state_mut(kind);
                state.finish_if_active(completed.id)
            };
            if ok {
                update(app, *completed.result)
            } else {
                debug!(task = completed.id.0, ?kind, "Dropping inactive task result");
                vec![]
            }
        }
        UiEvent::WeatherLoaded { result } => {
            app.tui.weather.resolve(result);
            vec![]
        }
        UiEvent::EventPersisted { event, outcome } => {
            if let PersistOutcome::Failed { reason } =
                app.tui.store.commit(event, outcome)
            {
                app.tui
                    .status
                    .warn(format!("Saved locally only: {reason}"));
            }
            vec![]
        }
        UiEvent::EffectFailed { message } => {
            app.tui.status.warn(message);
            vec![]
        }
    }
}

// ============================================================================
// Action Dispatcher
// ============================================================================

/// Applies one action and returns the effects it produces.
pub fn dispatch(app: &mut AppState, action: Action) -> Vec<UiEffect> {
    match action {
        Action::Login { role } => {
            app.tui.session.login(role);
            app.overlay = None;
            app.tui.map.marker_focus = None;
            info!(%role, "Logged in");
            app.tui
                .status
                .info(format!("Logged in as {}", role.display_name()));
            mount_main_screen(&mut app.tui)
        }
        Action::Logout => {
            if !app.tui.session.is_logged_in() {
                return vec![];
            }
            let effects = unmount_main_screen(&mut app.tui);
            app.tui.session.logout();
            app.tui.status.clear();
            app.overlay = Some(Overlay::Login(LoginState::default()));
            info!("Logged out");
            effects
        }
        Action::OpenModal(request) => {
            if !app.tui.session.is_logged_in() {
                return vec![];
            }
            if request == OverlayRequest::EventForm && !app.tui.session.controls().add_event {
                return vec![];
            }
            open_overlay(app, request);
            vec![]
        }
        Action::CloseModal => {
            match app.overlay.as_ref() {
                Some(overlay) if overlay.is_login() => {}
                Some(overlay) => {
                    if overlay.is_event_form() {
                        app.tui.session.clear_emergency();
                    }
                    app.overlay = None;
                }
                None => {}
            }
            vec![]
        }
        Action::SubmitEvent(draft) => submit_event(app, &draft),
        Action::SetMode(mode) => {
            info!(%mode, "Mode changed");
            app.tui.session.set_mode(mode.clone());
            app.tui.map.marker_focus = None;
            app.overlay = None;
            if mode.is_persistable() {
                vec![UiEffect::PersistMode { mode }]
            } else {
                debug!(%mode, "Mode kept for this session only");
                vec![]
            }
        }
        Action::TriggerEmergency => {
            if app.tui.session.trigger_emergency() {
                app.tui
                    .status
                    .warn("Emergency mode: tap the map to report, Esc to cancel");
            }
            vec![]
        }
        Action::CancelEmergency => {
            if app.tui.session.is_emergency_mode() {
                app.tui.session.clear_emergency();
                app.tui.status.info("Emergency mode cancelled");
            }
            vec![]
        }
        Action::MapTap(point) => {
            if app.overlay.is_some() || !app.tui.session.tap_opens_form() {
                debug!(%point, "Map tap ignored");
                return vec![];
            }
            app.tui.held_position = point;
            open_overlay(app, OverlayRequest::EventForm);
            vec![]
        }
        Action::SelectMarker(id) => {
            if app.overlay.is_none() {
                open_overlay(app, OverlayRequest::EventDetail(id));
            }
            vec![]
        }
        Action::Quit => {
            let mut effects = unmount_main_screen(&mut app.tui);
            effects.push(UiEffect::Quit);
            effects
        }
    }
}

/// Starts the per-mount work of the main screen: a fresh weather badge.
fn mount_main_screen(tui: &mut TuiState) -> Vec<UiEffect> {
    let task = tui.task_seq.next_id();
    tui.weather = WeatherBadge::Loading;
    tui.weather_task = Some(task);
    vec![UiEffect::FetchWeather { task }]
}

/// Cancels everything the current mount started.
fn unmount_main_screen(tui: &mut TuiState) -> Vec<UiEffect> {
    tui.weather_task = None;
    let state = tui.tasks.state_mut(TaskKind::Weather);
    let token = state.cancel.clone();
    state.clear();
    vec![UiEffect::CancelTask {
        kind: TaskKind::Weather,
        token,
    }]
}

fn submit_event(app: &mut AppState, draft: &EventDraft) -> Vec<UiEffect> {
    let emergency = app.tui.session.is_emergency_mode();
    let event = build_event(
        draft,
        app.tui.held_position,
        emergency,
        EventId::from_timestamp(Utc::now()),
    );
    app.overlay = None;
    if emergency {
        app.tui.session.clear_emergency();
    }

    if app.tui.sink.is_remote() {
        vec![UiEffect::PersistEvent { event }]
    } else {
        app.tui.store.append(event);
        app.tui.status.info("Event added");
        vec![]
    }
}

fn open_overlay(app: &mut AppState, request: OverlayRequest) {
    if let Some(overlay) = Overlay::open(request, &app.tui) {
        app.overlay = Some(overlay);
    }
}

fn apply_overlay_update(app: &mut AppState, update: overlays::OverlayUpdate) -> Vec<UiEffect> {
    let mut effects = update.effects;
    for action in update.actions {
        effects.extend(dispatch(app, action));
    }
    match update.transition {
        OverlayTransition::Stay => {}
        OverlayTransition::Close => app.overlay = None,
        OverlayTransition::Open(request) => open_overlay(app, request),
    }
    effects
}

// ============================================================================
// Terminal Event Handlers
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Paste(text) => {
            if let Some(overlay) = app.overlay.as_mut() {
                overlay.handle_paste(&text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // Try to dispatch to the active overlay
    if let Some(update) = overlays::handle_overlay_key(&app.tui, &mut app.overlay, key) {
        return apply_overlay_update(app, update);
    }

    if !app.tui.session.is_logged_in() {
        return vec![];
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let controls = app.tui.session.controls();
    let action = match key.code {
        KeyCode::Char('c') if ctrl => Some(Action::Quit),
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('a') if controls.add_event => {
            app.tui.held_position = app.tui.map.cursor;
            Some(Action::OpenModal(OverlayRequest::EventForm))
        }
        KeyCode::Char('m') if controls.change_mode => {
            Some(Action::OpenModal(OverlayRequest::ModeSelect))
        }
        KeyCode::Char('e') if controls.emergency => Some(Action::TriggerEmergency),
        KeyCode::Char('o') => Some(Action::Logout),
        KeyCode::Esc => Some(Action::CancelEmergency),
        _ => {
            let scene = app.tui.scene();
            map::handle_key(&mut app.tui.map, &scene.markers, key)
        }
    };

    action.map_or_else(Vec::new, |action| dispatch(app, action))
}

fn handle_mouse(app: &mut AppState, mouse: MouseEvent) -> Vec<UiEffect> {
    if app.overlay.is_some() || !app.tui.session.is_logged_in() {
        return vec![];
    }
    let scene = app.tui.scene();
    let area = app.tui.map_area.get();
    match map::handle_mouse(&mut app.tui.map, &scene.markers, area, mouse) {
        Some(action) => dispatch(app, action),
        None => vec![],
    }
}
