//! Map view state.

use ratatui::layout::Rect;
use smartcity_core::event::GeoPoint;
use smartcity_core::map::{Bounds, MARKER_HIT_TOLERANCE_M, MarkerDescriptor, Viewport};

/// Cursor steps per visible span.
const CURSOR_STEPS_X: f64 = 40.0;
const CURSOR_STEPS_Y: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct MapState {
    pub viewport: Viewport,
    /// Position a tap resolves against.
    pub cursor: GeoPoint,
    /// Index into the current scene's markers, set by Tab cycling.
    pub marker_focus: Option<usize>,
}

impl MapState {
    pub fn new(center: GeoPoint, zoom: u8) -> Self {
        Self {
            viewport: Viewport::new(center, zoom),
            cursor: center,
            marker_focus: None,
        }
    }

    /// Moves the cursor by whole steps, panning when it leaves the view.
    pub fn move_cursor(&mut self, east_steps: i32, north_steps: i32) {
        let lon_step = self.viewport.lon_span() / CURSOR_STEPS_X;
        let lat_step = self.viewport.lat_span() / CURSOR_STEPS_Y;
        self.cursor = GeoPoint::new(
            (self.cursor.latitude + f64::from(north_steps) * lat_step).clamp(-85.0, 85.0),
            self.cursor.longitude + f64::from(east_steps) * lon_step,
        );
        self.marker_focus = None;
        self.keep_cursor_visible();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.keep_cursor_visible();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Moves focus to the next (or previous) marker and puts the cursor on it.
    pub fn cycle_marker(&mut self, markers: &[MarkerDescriptor], forward: bool) {
        if markers.is_empty() {
            self.marker_focus = None;
            return;
        }
        let len = markers.len();
        let next = match (self.marker_focus, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.marker_focus = Some(next);
        self.cursor = markers[next].position;
        self.keep_cursor_visible();
    }

    /// Focus index, if it still points inside the scene.
    pub fn focused(&self, marker_count: usize) -> Option<usize> {
        self.marker_focus.filter(|i| *i < marker_count)
    }

    /// Hit radius for a tap. Grows when zoomed out so a marker cell stays
    /// pressable.
    pub fn tap_tolerance_m(&self) -> f64 {
        MARKER_HIT_TOLERANCE_M.max(self.viewport.width_m() / 60.0)
    }

    pub fn bounds(&self) -> Bounds {
        self.viewport.bounds()
    }

    /// Geographic point under a terminal cell of the canvas area.
    pub fn point_at(&self, area: Rect, column: u16, row: u16) -> Option<GeoPoint> {
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return None;
        }
        let b = self.bounds();
        let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        Some(GeoPoint::new(
            b.north - fy * (b.north - b.south),
            b.west + fx * (b.east - b.west),
        ))
    }

    fn keep_cursor_visible(&mut self) {
        let b = self.bounds();
        let outside = self.cursor.longitude < b.west
            || self.cursor.longitude > b.east
            || self.cursor.latitude < b.south
            || self.cursor.latitude > b.north;
        if outside {
            self.viewport.center = self.cursor;
        }
    }
}
