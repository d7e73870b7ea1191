//! Weather badge rendering.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use smartcity_core::weather::{TemperatureUnit, WeatherBadge};

pub fn badge_span(badge: &WeatherBadge, unit: TemperatureUnit) -> Span<'static> {
    let style = match badge {
        WeatherBadge::Loading => Style::default().fg(Color::DarkGray),
        WeatherBadge::Ready(_) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        WeatherBadge::Failed(_) => Style::default().fg(Color::Red),
    };
    Span::styled(format!(" {} ", badge.text(unit)), style)
}
