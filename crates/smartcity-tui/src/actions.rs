//! Named state transitions.
//!
//! Key handlers and overlays never touch session or store state directly;
//! they return `Action`s and `update::dispatch` applies them in order.

use smartcity_core::event::{EventId, GeoPoint};
use smartcity_core::session::Role;
use smartcity_core::store::Mode;
use smartcity_core::submission::EventDraft;

use crate::overlays::OverlayRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Credentials (if any) were already checked by the login surface.
    Login { role: Role },
    Logout,
    OpenModal(OverlayRequest),
    /// Dismiss the active dialog. Cancelling the event form also leaves
    /// emergency mode.
    CloseModal,
    SubmitEvent(EventDraft),
    SetMode(Mode),
    TriggerEmergency,
    CancelEmergency,
    /// Tap on empty map surface.
    MapTap(GeoPoint),
    /// Tap on an event marker.
    SelectMarker(EventId),
    Quit,
}
