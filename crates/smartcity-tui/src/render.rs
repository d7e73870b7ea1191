//! Pure view/render functions for the TUI.
//!
//! This module contains all rendering logic. Functions here:
//! - Take `&AppState` by immutable reference
//! - Draw to a ratatui Frame
//! - Never mutate state or return effects (the map rect is recorded in a
//!   `Cell` for mouse routing)

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::map::render_map;
use crate::overlays::OverlayExt;
use crate::state::{AppState, TuiState};
use crate::statusline::{STATUS_HEIGHT, render_status};
use crate::weather::badge_span;

/// Height of the top bar (city, weather, emergency banner).
const TOP_BAR_HEIGHT: u16 = 1;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TOP_BAR_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    if state.session.is_logged_in() {
        render_top_bar(frame, state, chunks[0]);
        let scene = state.scene();
        render_map(frame, state, &scene, chunks[1]);
        render_status(frame, state, chunks[2]);
    } else {
        // Login backdrop: the map without events.
        render_map(frame, state, &Default::default(), chunks[1]);
    }

    app.overlay.render(frame, area, state);
}

fn render_top_bar(frame: &mut Frame, state: &TuiState, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", state.config.city),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        badge_span(&state.weather, state.weather_client.unit()),
    ];

    if state.session.is_emergency_mode() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            " EMERGENCY MODE ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use smartcity_core::config::Config;
    use smartcity_core::persistence::EventSink;
    use smartcity_core::session::Role;

    use super::*;
    use crate::actions::Action;
    use crate::update::dispatch;

    fn screen_text(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_login_screen_renders() {
        let app = AppState::new(Config::default(), EventSink::Local);
        let text = screen_text(&app);
        assert!(text.contains("Smart City Login"));
        assert!(text.contains("Continue as visitor"));
    }

    #[test]
    fn test_admin_sees_emergency_control_and_banner() {
        let mut app = AppState::new(Config::default(), EventSink::Local);
        dispatch(&mut app, Action::Login { role: Role::Admin });
        dispatch(&mut app, Action::TriggerEmergency);

        let text = screen_text(&app);
        assert!(text.contains("Istanbul"));
        assert!(text.contains("Loading..."));
        assert!(text.contains("emergency"));
        assert!(text.contains("EMERGENCY MODE"));
        assert!(text.contains("add event"));
    }

    #[test]
    fn test_visitor_controls_hide_add_event() {
        let mut app = AppState::new(Config::default(), EventSink::Local);
        dispatch(&mut app, Action::Login {
            role: Role::Visitor,
        });

        let text = screen_text(&app);
        assert!(!text.contains("add event"));
        assert!(text.contains("visitor"));
    }
}
