//! Turning form input into an `Event`.

use crate::event::{Category, EMERGENCY_RADIUS_M, Event, EventId, GeoPoint, NORMAL_RADIUS_M};

/// Category choice in the creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChoice {
    Fixed(Category),
    /// "Other": the category is the free text entered alongside.
    Other,
}

impl Default for CategoryChoice {
    fn default() -> Self {
        CategoryChoice::Fixed(Category::TrafficAccident)
    }
}

impl CategoryChoice {
    /// Choices offered by the form. "Other" is hidden in emergency mode.
    pub fn options(emergency_mode: bool) -> Vec<CategoryChoice> {
        let mut options: Vec<CategoryChoice> = Category::SELECTABLE
            .iter()
            .cloned()
            .map(CategoryChoice::Fixed)
            .collect();
        if !emergency_mode {
            options.push(CategoryChoice::Other);
        }
        options
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryChoice::Fixed(category) => category.label(),
            CategoryChoice::Other => "Other",
        }
    }
}

/// Transient fields of the creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub choice: CategoryChoice,
    /// Free text; empty is accepted as-is.
    pub description: String,
    /// Only read when `choice` is `Other`.
    pub custom_text: String,
}

impl EventDraft {
    /// Resolved category for a non-emergency submission.
    pub fn selected_category(&self) -> Category {
        match &self.choice {
            CategoryChoice::Fixed(category) => category.clone(),
            CategoryChoice::Other => Category::parse(&self.custom_text),
        }
    }
}

/// Builds the event shape for a submission.
///
/// Emergency mode overrides the selected category and uses the large radius.
pub fn build_event(
    draft: &EventDraft,
    position: GeoPoint,
    emergency_mode: bool,
    id: EventId,
) -> Event {
    let (category, radius) = if emergency_mode {
        (Category::Emergency, EMERGENCY_RADIUS_M)
    } else {
        (draft.selected_category(), NORMAL_RADIUS_M)
    };

    Event {
        id,
        category,
        description: draft.description.clone(),
        position,
        radius,
        emergency: emergency_mode,
    }
}
