//! In-memory event store.
//!
//! Ordered, append-only. Filtering borrows the store and never mutates it.

use std::fmt;

use tracing::{debug, warn};

use crate::event::{Category, Event, EventId};

/// Map filter: every event, or only one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    All,
    Only(Category),
}

impl Mode {
    const ALL: &str = "all";

    /// Parses the persisted representation (`all` or a category string).
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == Self::ALL {
            Mode::All
        } else {
            Mode::Only(Category::parse(value))
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Mode::All => true,
            Mode::Only(category) => event.category == *category,
        }
    }

    /// Whether the `default_mode` string reads back as this same mode.
    ///
    /// Custom categories typed as `all` or blank collide with the `all` sentinel.
    pub fn is_persistable(&self) -> bool {
        Mode::parse(&self.to_string()) == *self
    }

    pub fn label(&self) -> &str {
        match self {
            Mode::All => "All events",
            Mode::Only(category) => category.label(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::All => f.write_str(Self::ALL),
            Mode::Only(category) => f.write_str(category.as_str()),
        }
    }
}

/// Result of writing an event to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Stored { id: EventId },
    Failed { reason: String },
}

/// Ordered collection of events.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Appends without any remote write.
    pub fn append(&mut self, event: Event) {
        // Ids are not deduplicated; two submissions in one millisecond share one.
        if self.get(&event.id).is_some() {
            warn!(id = %event.id, "Event id already present");
        }
        debug!(id = %event.id, category = %event.category, "Event appended");
        self.events.push(event);
    }

    /// Appends an event after its persistence attempt completed.
    ///
    /// On success the sink-assigned id replaces the local one. On failure the
    /// local copy is kept and the outcome is handed back unchanged so the
    /// caller can surface it.
    pub fn commit(&mut self, event: Event, outcome: PersistOutcome) -> PersistOutcome {
        match &outcome {
            PersistOutcome::Stored { id } => self.append(event.with_id(id.clone())),
            PersistOutcome::Failed { reason } => {
                warn!(id = %event.id, %reason, "Persisting event failed, keeping local copy");
                self.append(event);
            }
        }
        outcome
    }

    /// Events visible under `mode`, in insertion order.
    ///
    /// The iterator is `Clone`, so callers can walk the same view twice.
    pub fn filter<'a>(&'a self, mode: &'a Mode) -> impl Iterator<Item = &'a Event> + Clone + 'a {
        self.events.iter().filter(move |event| mode.matches(event))
    }

    pub fn filter_emergency(&self) -> impl Iterator<Item = &Event> + Clone + '_ {
        self.events.iter().filter(|event| event.emergency)
    }

    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == *id)
    }

    /// Custom categories present in the store, first-seen order, no repeats.
    pub fn custom_categories(&self) -> Vec<Category> {
        let mut seen: Vec<Category> = Vec::new();
        for event in &self.events {
            if event.category.is_custom() && !seen.contains(&event.category) {
                seen.push(event.category.clone());
            }
        }
        seen
    }
}
