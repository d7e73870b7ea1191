//! Map canvas rendering.
//!
//! There are no map tiles: the canvas shows event circles (as rings sized in
//! meters), markers, the city label and the cursor over a plain background.

use std::f64::consts::TAU;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders};
use smartcity_core::event::GeoPoint;
use smartcity_core::map::{CircleDescriptor, EventStyle, MapScene, meters_to_lat_deg};

use crate::state::TuiState;

const RING_SEGMENTS: usize = 72;

fn style_color(style: EventStyle) -> Color {
    match style {
        EventStyle::Normal => Color::Red,
        EventStyle::Emergency => Color::Magenta,
    }
}

/// Points on the circle's outline. Longitude degrees shrink with latitude, so
/// the two radii differ.
fn ring(circle: &CircleDescriptor) -> Vec<(f64, f64)> {
    let r_lat = meters_to_lat_deg(f64::from(circle.radius_m));
    let r_lon = r_lat / circle.center.latitude.to_radians().cos().abs().max(0.01);
    (0..RING_SEGMENTS)
        .map(|i| {
            let theta = TAU * i as f64 / RING_SEGMENTS as f64;
            (
                circle.center.longitude + r_lon * theta.cos(),
                circle.center.latitude + r_lat * theta.sin(),
            )
        })
        .collect()
}

pub fn render_map(frame: &mut Frame, tui: &TuiState, scene: &MapScene, area: Rect) {
    let border_color = if tui.session.is_emergency_mode() {
        Color::Magenta
    } else {
        Color::DarkGray
    };
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", tui.config.city),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("· {} ", tui.session.mode().label()),
            Style::default().fg(Color::White),
        ),
    ]);
    let cursor_label = Line::from(Span::styled(
        format!(" {} · z{} ", tui.map.cursor, tui.map.viewport.zoom),
        Style::default().fg(Color::DarkGray),
    ));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_bottom(cursor_label.right_aligned());

    tui.map_area.set(block.inner(area));

    let bounds = tui.map.bounds();
    let city_center = tui.config.map.center();
    let focused = tui.map.focused(scene.markers.len());
    let cursor = tui.map.cursor;
    let city = tui.config.city.clone();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(move |ctx| {
            for circle in &scene.circles {
                let coords = ring(circle);
                ctx.draw(&Points {
                    coords: &coords,
                    color: style_color(circle.style),
                });
            }
            ctx.layer();

            print_at(ctx, city_center, Span::styled(
                format!("◇ {city}"),
                Style::default().fg(Color::DarkGray),
            ));

            for (i, marker) in scene.markers.iter().enumerate() {
                let emergency = scene
                    .circles
                    .get(i)
                    .is_some_and(|c| c.style == EventStyle::Emergency);
                let color = if focused == Some(i) {
                    Color::Yellow
                } else if emergency {
                    Color::Magenta
                } else {
                    Color::Red
                };
                print_at(ctx, marker.position, Span::styled(
                    "●",
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
            }

            print_at(ctx, cursor, Span::styled(
                "+",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ));
        });

    frame.render_widget(canvas, area);
}

fn print_at(ctx: &mut ratatui::widgets::canvas::Context<'_>, point: GeoPoint, span: Span<'static>) {
    ctx.print(point.longitude, point.latitude, span);
}
