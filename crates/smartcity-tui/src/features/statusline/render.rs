//! Control bar and status row rendering.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::state::{NoticeLevel, control_hints};
use crate::state::TuiState;

/// Rows taken by the control bar plus the status row.
pub const STATUS_HEIGHT: u16 = 2;

pub fn render_status(frame: &mut Frame, tui: &TuiState, area: Rect) {
    if area.height == 0 {
        return;
    }

    let controls_area = Rect::new(area.x, area.y, area.width, 1);
    frame.render_widget(controls_line(tui), controls_area);

    if area.height > 1 {
        let status_area = Rect::new(area.x, area.y + 1, area.width, 1);
        frame.render_widget(status_line(tui), status_area);
    }
}

fn controls_line(tui: &TuiState) -> Paragraph<'static> {
    let mut spans = Vec::new();
    for (i, hint) in control_hints(tui.session.controls()).iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

fn status_line(tui: &TuiState) -> Paragraph<'static> {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", tui.session.role().display_name()),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            tui.session.mode().label().to_string(),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(" · {} events", tui.store.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if let Some(notice) = tui.status.current() {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Warning => Color::Yellow,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice.text.clone(), Style::default().fg(color)));
    }

    Paragraph::new(Line::from(spans))
}
