//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── session: Session        (role, login, mode, emergency flag)
//! │   ├── store: EventStore       (ordered events, survives logout)
//! │   ├── sink: EventSink         (optional write-through persistence)
//! │   ├── map: MapState           (viewport, cursor, marker focus)
//! │   ├── weather: WeatherBadge   (per-mount badge state)
//! │   ├── held_position: GeoPoint (coordinate the event form will use)
//! │   ├── task_seq / tasks        (async task lifecycle)
//! │   ├── weather_task            (fetch owned by the current mount)
//! │   └── status: StatusState     (transient notices)
//! └── overlay: Option<Overlay>    (login screen and modal dialogs)
//! ```
//!
//! State is split between `TuiState` and `Option<Overlay>` so overlay
//! handlers can get `&mut self` and `&TuiState` simultaneously.

use std::cell::Cell;

use ratatui::layout::Rect;
use smartcity_core::config::Config;
use smartcity_core::event::GeoPoint;
use smartcity_core::map::MapScene;
use smartcity_core::persistence::EventSink;
use smartcity_core::session::Session;
use smartcity_core::store::EventStore;
use smartcity_core::weather::{WeatherBadge, WeatherClient};

use crate::common::{TaskId, TaskSeq, Tasks};
use crate::features::map::MapState;
use crate::features::statusline::StatusState;
use crate::overlays::{LoginState, Overlay};

// ============================================================================
// AppState (Combined State)
// ============================================================================

pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    /// Starts logged out, with the login screen open.
    pub fn new(config: Config, sink: EventSink) -> Self {
        Self {
            tui: TuiState::new(config, sink),
            overlay: Some(Overlay::Login(LoginState::default())),
        }
    }
}

// ============================================================================
// TuiState
// ============================================================================

pub struct TuiState {
    pub should_quit: bool,
    pub config: Config,
    pub session: Session,
    pub store: EventStore,
    pub sink: EventSink,
    pub weather_client: WeatherClient,
    pub weather: WeatherBadge,
    pub map: MapState,
    /// Coordinate the next event submission is placed at.
    pub held_position: GeoPoint,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    /// Weather task belonging to the current main-screen mount.
    pub weather_task: Option<TaskId>,
    pub status: StatusState,
    /// Map canvas rect (set during render, used for mouse click routing).
    pub map_area: Cell<Rect>,
}

impl TuiState {
    pub fn new(config: Config, sink: EventSink) -> Self {
        let center = config.map.center();
        let map = MapState::new(center, config.map.zoom);
        let session = Session::new(config.initial_mode());
        let weather_client = WeatherClient::from_config(&config);
        Self {
            should_quit: false,
            session,
            store: EventStore::new(),
            sink,
            weather_client,
            weather: WeatherBadge::default(),
            map,
            held_position: center,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            weather_task: None,
            status: StatusState::default(),
            map_area: Cell::new(Rect::default()),
            config,
        }
    }

    /// Circles and markers for the current mode.
    pub fn scene(&self) -> MapScene {
        MapScene::build(&self.store, self.session.mode())
    }
}
