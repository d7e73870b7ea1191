//! Map input handling.
//!
//! Keys move the cursor and zoom; Enter or a left click "taps" the map. A tap
//! that lands on a marker selects it, anything else is a surface tap. Whether
//! a surface tap opens the form is the reducer's call, not ours.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use smartcity_core::event::GeoPoint;
use smartcity_core::map::{MapTap, MarkerDescriptor, hit_test};

use super::MapState;
use crate::actions::Action;

pub fn handle_key(map: &mut MapState, markers: &[MarkerDescriptor], key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Left => map.move_cursor(-1, 0),
        KeyCode::Right => map.move_cursor(1, 0),
        KeyCode::Up => map.move_cursor(0, 1),
        KeyCode::Down => map.move_cursor(0, -1),
        KeyCode::Char('+' | '=') => map.zoom_in(),
        KeyCode::Char('-' | '_') => map.zoom_out(),
        KeyCode::Tab => map.cycle_marker(markers, true),
        KeyCode::BackTab => map.cycle_marker(markers, false),
        KeyCode::Enter | KeyCode::Char(' ') => return Some(tap(map, markers, map.cursor)),
        _ => {}
    }
    None
}

pub fn handle_mouse(
    map: &mut MapState,
    markers: &[MarkerDescriptor],
    area: Rect,
    mouse: MouseEvent,
) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let point = map.point_at(area, mouse.column, mouse.row)?;
            map.cursor = point;
            map.marker_focus = None;
            Some(tap(map, markers, point))
        }
        MouseEventKind::ScrollUp => {
            map.zoom_in();
            None
        }
        MouseEventKind::ScrollDown => {
            map.zoom_out();
            None
        }
        _ => None,
    }
}

fn tap(map: &MapState, markers: &[MarkerDescriptor], point: GeoPoint) -> Action {
    match hit_test(markers, point, map.tap_tolerance_m()) {
        MapTap::Marker(id) => Action::SelectMarker(id),
        MapTap::Surface(point) => Action::MapTap(point),
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use smartcity_core::event::EventId;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_enter_on_marker_selects_it() {
        let mut map = MapState::new(GeoPoint::ISTANBUL, 15);
        let markers = vec![MarkerDescriptor {
            id: EventId::from("evt"),
            position: GeoPoint::new(41.01, 28.97),
        }];
        handle_key(&mut map, &markers, key(KeyCode::Tab));
        let action = handle_key(&mut map, &markers, key(KeyCode::Enter));
        assert_eq!(action, Some(Action::SelectMarker(EventId::from("evt"))));
    }

    #[test]
    fn test_enter_on_empty_surface_is_map_tap() {
        let mut map = MapState::new(GeoPoint::ISTANBUL, 15);
        let action = handle_key(&mut map, &[], key(KeyCode::Enter));
        assert_eq!(action, Some(Action::MapTap(GeoPoint::ISTANBUL)));
    }

    #[test]
    fn test_arrows_do_not_emit_actions() {
        let mut map = MapState::new(GeoPoint::ISTANBUL, 15);
        assert!(handle_key(&mut map, &[], key(KeyCode::Left)).is_none());
        assert!(handle_key(&mut map, &[], key(KeyCode::Char('+'))).is_none());
        assert_eq!(map.viewport.zoom, 16);
    }

    #[test]
    fn test_click_outside_canvas_is_ignored() {
        let mut map = MapState::new(GeoPoint::ISTANBUL, 15);
        let area = Rect::new(1, 2, 30, 10);
        assert!(handle_mouse(&mut map, &[], area, click(0, 0)).is_none());
        assert!(matches!(
            handle_mouse(&mut map, &[], area, click(5, 5)),
            Some(Action::MapTap(_))
        ));
    }
}
