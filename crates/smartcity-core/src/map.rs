//! Map presentation model.
//!
//! Turns the filtered store into widget-agnostic circle and marker
//! descriptors, and resolves taps against them. The TUI canvas draws these;
//! nothing here knows about terminals.

use crate::event::{Event, EventId, GeoPoint};
use crate::store::{EventStore, Mode};

/// Meters per degree of latitude (mean).
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Default tolerance for a tap to count as a marker press, in meters.
pub const MARKER_HIT_TOLERANCE_M: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStyle {
    Normal,
    Emergency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleDescriptor {
    pub id: EventId,
    pub center: GeoPoint,
    pub radius_m: u32,
    pub style: EventStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub id: EventId,
    pub position: GeoPoint,
}

/// Everything the map widget needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapScene {
    pub circles: Vec<CircleDescriptor>,
    pub markers: Vec<MarkerDescriptor>,
}

impl MapScene {
    /// One circle and one marker per event visible under `mode`.
    pub fn build(store: &EventStore, mode: &Mode) -> Self {
        let visible = store.filter(mode);
        Self {
            circles: visible.clone().map(circle_for).collect(),
            markers: visible.map(marker_for).collect(),
        }
    }
}

fn circle_for(event: &Event) -> CircleDescriptor {
    CircleDescriptor {
        id: event.id.clone(),
        center: event.position,
        radius_m: event.radius,
        style: if event.emergency {
            EventStyle::Emergency
        } else {
            EventStyle::Normal
        },
    }
}

fn marker_for(event: &Event) -> MarkerDescriptor {
    MarkerDescriptor {
        id: event.id.clone(),
        position: event.position,
    }
}

/// Outcome of a tap on the map surface.
#[derive(Debug, Clone, PartialEq)]
pub enum MapTap {
    /// Landed on a marker: show that event.
    Marker(EventId),
    /// Landed on empty surface at this position.
    Surface(GeoPoint),
}

/// Resolves a tap to the nearest marker within `tolerance_m`, else surface.
pub fn hit_test(markers: &[MarkerDescriptor], point: GeoPoint, tolerance_m: f64) -> MapTap {
    markers
        .iter()
        .map(|marker| (marker, marker.position.distance_m(&point)))
        .filter(|(_, distance)| *distance <= tolerance_m)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(MapTap::Surface(point), |(marker, _)| {
            MapTap::Marker(marker.id.clone())
        })
}

/// Visible region of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: u8,
}

/// Geographic bounds, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Viewport {
    pub const MIN_ZOOM: u8 = 1;
    pub const MAX_ZOOM: u8 = 18;

    pub fn new(center: GeoPoint, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM),
        }
    }

    /// Longitude span in degrees (web-map convention: 360 / 2^zoom).
    pub fn lon_span(&self) -> f64 {
        360.0 / f64::from(1u32 << self.zoom)
    }

    /// Latitude span, shrunk so one degree-step is roughly square in meters.
    pub fn lat_span(&self) -> f64 {
        self.lon_span() * self.center.latitude.to_radians().cos().abs().max(0.01)
    }

    pub fn bounds(&self) -> Bounds {
        let half_lon = self.lon_span() / 2.0;
        let half_lat = self.lat_span() / 2.0;
        Bounds {
            west: self.center.longitude - half_lon,
            east: self.center.longitude + half_lon,
            south: self.center.latitude - half_lat,
            north: self.center.latitude + half_lat,
        }
    }

    /// Moves the center by a fraction of the visible span per step.
    pub fn pan(&mut self, east_steps: i32, north_steps: i32) {
        const STEP_FRACTION: f64 = 0.05;
        let lon = self.center.longitude + f64::from(east_steps) * self.lon_span() * STEP_FRACTION;
        let lat = self.center.latitude + f64::from(north_steps) * self.lat_span() * STEP_FRACTION;
        self.center = GeoPoint::new(lat.clamp(-85.0, 85.0), wrap_longitude(lon));
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(Self::MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(Self::MIN_ZOOM);
    }

    /// Meters covered by the horizontal extent.
    pub fn width_m(&self) -> f64 {
        self.lon_span() * METERS_PER_DEG_LAT * self.center.latitude.to_radians().cos().abs()
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Converts a radius in meters to degrees of latitude.
pub fn meters_to_lat_deg(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Category, EMERGENCY_RADIUS_M, NORMAL_RADIUS_M};

    fn event(id: &str, category: Category, position: GeoPoint) -> Event {
        let emergency = category == Category::Emergency;
        Event {
            id: EventId::from(id),
            category,
            description: String::new(),
            position,
            radius: if emergency {
                EMERGENCY_RADIUS_M
            } else {
                NORMAL_RADIUS_M
            },
            emergency,
        }
    }

    #[test]
    fn test_scene_follows_mode() {
        let mut store = EventStore::new();
        store.append(event("a", Category::Flood, GeoPoint::new(41.0, 29.0)));
        store.append(event("b", Category::Emergency, GeoPoint::new(41.01, 28.97)));

        let scene = MapScene::build(&store, &Mode::All);
        assert_eq!(scene.circles.len(), 2);
        assert_eq!(scene.markers.len(), 2);
        assert_eq!(scene.circles[0].style, EventStyle::Normal);
        assert_eq!(scene.circles[0].radius_m, 100);
        assert_eq!(scene.circles[1].style, EventStyle::Emergency);
        assert_eq!(scene.circles[1].radius_m, 500);

        let floods = MapScene::build(&store, &Mode::Only(Category::Flood));
        assert_eq!(floods.markers.len(), 1);
        assert_eq!(floods.markers[0].id.as_str(), "a");
    }

    #[test]
    fn test_hit_test_picks_nearest_marker() {
        let markers = vec![
            MarkerDescriptor {
                id: EventId::from("far"),
                position: GeoPoint::new(41.0004, 29.0),
            },
            MarkerDescriptor {
                id: EventId::from("near"),
                position: GeoPoint::new(41.0001, 29.0),
            },
        ];
        let tap = hit_test(&markers, GeoPoint::new(41.0, 29.0), 60.0);
        assert_eq!(tap, MapTap::Marker(EventId::from("near")));
    }

    #[test]
    fn test_hit_test_falls_back_to_surface() {
        let markers = vec![MarkerDescriptor {
            id: EventId::from("x"),
            position: GeoPoint::new(41.1, 29.0),
        }];
        let point = GeoPoint::new(41.01, 28.97);
        assert_eq!(hit_test(&markers, point, 60.0), MapTap::Surface(point));
    }

    #[test]
    fn test_viewport_zoom_is_clamped() {
        let mut viewport = Viewport::new(GeoPoint::ISTANBUL, 30);
        assert_eq!(viewport.zoom, Viewport::MAX_ZOOM);
        viewport.zoom_in();
        assert_eq!(viewport.zoom, Viewport::MAX_ZOOM);

        let mut viewport = Viewport::new(GeoPoint::ISTANBUL, 1);
        viewport.zoom_out();
        assert_eq!(viewport.zoom, Viewport::MIN_ZOOM);
    }

    #[test]
    fn test_viewport_bounds_contain_center() {
        let viewport = Viewport::new(GeoPoint::ISTANBUL, 12);
        let b = viewport.bounds();
        assert!(b.west < GeoPoint::ISTANBUL.longitude && GeoPoint::ISTANBUL.longitude < b.east);
        assert!(b.south < GeoPoint::ISTANBUL.latitude && GeoPoint::ISTANBUL.latitude < b.north);
    }

    #[test]
    fn test_pan_moves_center() {
        let mut viewport = Viewport::new(GeoPoint::ISTANBUL, 12);
        viewport.pan(1, -1);
        assert!(viewport.center.longitude > GeoPoint::ISTANBUL.longitude);
        assert!(viewport.center.latitude < GeoPoint::ISTANBUL.latitude);
    }
}
