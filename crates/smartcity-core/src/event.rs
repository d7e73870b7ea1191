//! Event record types.
//!
//! An `Event` is an incident reported on the map. Events are immutable once
//! created: there is no edit or delete path anywhere in the crate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display radius for regular events, in meters.
pub const NORMAL_RADIUS_M: u32 = 100;

/// Display radius for emergency events, in meters.
pub const EMERGENCY_RADIUS_M: u32 = 500;

/// Opaque event identifier.
///
/// Locally created ids are derived from the submission timestamp; ids assigned
/// by a persistence sink replace them when the remote write succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    /// Builds a local id from a timestamp (milliseconds since the Unix epoch).
    ///
    /// Two submissions within the same millisecond produce the same id. The
    /// store does not deduplicate.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Geographic position in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Istanbul city center, the default map position.
    pub const ISTANBUL: GeoPoint = GeoPoint {
        latitude: 41.0082,
        longitude: 28.9784,
    };

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Approximate distance in meters (equirectangular projection).
    ///
    /// Accurate enough for hit-testing taps at city scale.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;
        let mean_lat = ((self.latitude + other.latitude) / 2.0).to_radians();
        let dx = (other.longitude - self.longitude).to_radians() * mean_lat.cos();
        let dy = (other.latitude - self.latitude).to_radians();
        (dx * dx + dy * dy).sqrt() * EARTH_RADIUS_M
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::ISTANBUL
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Event category.
///
/// The wire and filter representation is a plain string: fixed categories use
/// their kebab-case slug, custom categories use the text the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    TrafficAccident,
    Flood,
    Roadwork,
    Emergency,
    Custom(String),
}

impl Category {
    /// Categories offered by the creation form, in picker order.
    pub const SELECTABLE: [Category; 3] = [
        Category::TrafficAccident,
        Category::Flood,
        Category::Roadwork,
    ];

    /// Parses a category slug. Unknown text becomes a custom category.
    pub fn parse(value: &str) -> Self {
        match value {
            "traffic-accident" => Category::TrafficAccident,
            "flood" => Category::Flood,
            "roadwork" => Category::Roadwork,
            "emergency" => Category::Emergency,
            other => Category::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::TrafficAccident => "traffic-accident",
            Category::Flood => "flood",
            Category::Roadwork => "roadwork",
            Category::Emergency => "emergency",
            Category::Custom(text) => text,
        }
    }

    /// Human-readable label for pickers and detail views.
    pub fn label(&self) -> &str {
        match self {
            Category::TrafficAccident => "Traffic accident",
            Category::Flood => "Flood",
            Category::Roadwork => "Roadwork",
            Category::Emergency => "Emergency",
            Category::Custom(text) => text,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Category::Custom(_))
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    pub radius: u32,
    #[serde(rename = "isEmergency", default)]
    pub emergency: bool,
}

impl Event {
    /// Returns a copy carrying a different id (used when a sink assigns one).
    #[must_use]
    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = id;
        self
    }
}
