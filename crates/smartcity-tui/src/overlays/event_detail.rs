//! Read-only view of one event, opened by pressing its marker.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use smartcity_core::event::Event;

use crate::common::truncate_with_ellipsis;
use super::OverlayUpdate;
use super::render_utils::{InputHint, OverlayConfig, render_overlay};

#[derive(Debug, Clone)]
pub struct EventDetailState {
    pub event: Event,
}

impl EventDetailState {
    pub fn open(event: Event) -> Self {
        Self { event }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        render_event_detail(frame, &self.event, area);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }
}

fn field(label: &'static str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn render_event_detail(frame: &mut Frame, event: &Event, area: Rect) {
    let accent = if event.emergency {
        Color::Magenta
    } else {
        Color::Red
    };
    let hints = [InputHint::new("Esc", "close")];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Event",
            border_color: accent,
            width: 56,
            height: 11,
            hints: &hints,
        },
    );

    // Label column is 12 wide; keep the description on one line.
    let value_width = usize::from(layout.body.width).saturating_sub(12);
    let description = if event.description.is_empty() {
        "(no description)".to_string()
    } else {
        truncate_with_ellipsis(&event.description, value_width)
    };
    let mut lines = vec![
        field("Type", event.category.label().to_string(), Color::White),
        field("Description", description, Color::White),
        field("Position", event.position.to_string(), Color::Cyan),
        field("Radius", format!("{} m", event.radius), Color::Cyan),
        field("Id", event.id.to_string(), Color::DarkGray),
    ];
    if event.emergency {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "EMERGENCY",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        layout.body,
    );
}
