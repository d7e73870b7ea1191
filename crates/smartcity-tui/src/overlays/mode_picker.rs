use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState};
use smartcity_core::event::Category;
use smartcity_core::store::{EventStore, Mode};

use super::OverlayUpdate;
use crate::actions::Action;
use crate::effects::UiEffect;

/// The city's live traffic map.
pub const TRAFFIC_MAP_URL: &str = "https://uym.ibb.gov.tr/yharita6/Harita_tr.aspx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeChoice {
    Mode(Mode),
    /// Opens the external traffic map instead of changing the filter.
    TrafficMap,
}

impl ModeChoice {
    fn label(&self) -> &str {
        match self {
            ModeChoice::Mode(mode) => mode.label(),
            ModeChoice::TrafficMap => "Traffic map ↗",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModePickerState {
    pub choices: Vec<ModeChoice>,
    pub selected: usize,
}

impl ModePickerState {
    /// `all`, every fixed category, the custom categories present in the
    /// store, then the traffic map link. The current mode starts selected.
    pub fn open(current: &Mode, store: &EventStore) -> Self {
        let mut choices = vec![ModeChoice::Mode(Mode::All)];
        choices.extend(
            Category::SELECTABLE
                .iter()
                .cloned()
                .chain(std::iter::once(Category::Emergency))
                .chain(store.custom_categories())
                .map(|category| ModeChoice::Mode(Mode::Only(category))),
        );
        choices.push(ModeChoice::TrafficMap);

        let selected = choices
            .iter()
            .position(|choice| matches!(choice, ModeChoice::Mode(mode) if mode == current))
            .unwrap_or(0);
        Self { choices, selected }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, current: &Mode) {
        render_mode_picker(frame, self, area, current);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                OverlayUpdate::stay()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.choices.len() {
                    self.selected += 1;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Enter => match self.choices.get(self.selected) {
                Some(ModeChoice::Mode(mode)) => {
                    OverlayUpdate::close().with_actions(vec![Action::SetMode(mode.clone())])
                }
                Some(ModeChoice::TrafficMap) => {
                    OverlayUpdate::close().with_ui_effects(vec![UiEffect::OpenBrowser {
                        url: TRAFFIC_MAP_URL.to_string(),
                    }])
                }
                None => OverlayUpdate::close(),
            },
            _ => OverlayUpdate::stay(),
        }
    }
}

fn render_mode_picker(frame: &mut Frame, picker: &ModePickerState, area: Rect, current: &Mode) {
    use super::render_utils::{InputHint, OverlayConfig, render_overlay};

    let hints = [
        InputHint::new("↑↓", "navigate"),
        InputHint::new("Enter", "select"),
        InputHint::new("Esc", "cancel"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Select Mode",
            border_color: Color::Blue,
            width: 44,
            height: picker.choices.len() as u16 + 4,
            hints: &hints,
        },
    );

    let items: Vec<ListItem> = picker
        .choices
        .iter()
        .map(|choice| {
            let active = matches!(choice, ModeChoice::Mode(mode) if mode == current);
            let marker = if active { "● " } else { "  " };
            let style = match choice {
                ModeChoice::TrafficMap => Style::default().fg(Color::Yellow),
                ModeChoice::Mode(_) => Style::default().fg(Color::White),
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::styled(choice.label().to_string(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(picker.selected));
    frame.render_stateful_widget(list, layout.body, &mut list_state);
}
