//! Event creation dialog.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use smartcity_core::event::GeoPoint;
use smartcity_core::submission::{CategoryChoice, EventDraft};

use super::OverlayUpdate;
use super::render_utils::{
    InputHint, InputLine, OverlayConfig, button_span, render_input_line, render_overlay,
    render_separator,
};
use crate::actions::Action;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormFocus {
    #[default]
    Category,
    Description,
    /// Only reachable while "Other" is selected.
    Custom,
    Submit,
}

#[derive(Debug, Clone)]
pub struct EventFormState {
    pub emergency: bool,
    pub position: GeoPoint,
    pub options: Vec<CategoryChoice>,
    pub selected: usize,
    pub description: String,
    pub custom_text: String,
    pub focus: FormFocus,
}

impl EventFormState {
    /// Fresh form. Fields never carry over from a previous dialog.
    pub fn open(emergency: bool, position: GeoPoint) -> Self {
        Self {
            emergency,
            position,
            options: CategoryChoice::options(emergency),
            selected: 0,
            description: String::new(),
            custom_text: String::new(),
            focus: FormFocus::default(),
        }
    }

    fn choice(&self) -> CategoryChoice {
        self.options.get(self.selected).cloned().unwrap_or_default()
    }

    fn other_selected(&self) -> bool {
        self.choice() == CategoryChoice::Other
    }

    fn focus_order(&self) -> Vec<FormFocus> {
        let mut order = vec![FormFocus::Category, FormFocus::Description];
        if self.other_selected() {
            order.push(FormFocus::Custom);
        }
        order.push(FormFocus::Submit);
        order
    }

    fn step_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let len = order.len();
        let index = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        self.focus = order[next];
    }

    pub fn draft(&self) -> EventDraft {
        EventDraft {
            choice: self.choice(),
            description: self.description.clone(),
            custom_text: self.custom_text.clone(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        render_event_form(frame, self, area);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => OverlayUpdate::close().with_actions(vec![Action::CloseModal]),
            KeyCode::Char('c') if ctrl => {
                OverlayUpdate::close().with_actions(vec![Action::CloseModal])
            }
            KeyCode::Tab => {
                self.step_focus(true);
                OverlayUpdate::stay()
            }
            KeyCode::BackTab => {
                self.step_focus(false);
                OverlayUpdate::stay()
            }
            KeyCode::Up if self.focus == FormFocus::Category => {
                self.selected = self.selected.saturating_sub(1);
                OverlayUpdate::stay()
            }
            KeyCode::Down if self.focus == FormFocus::Category => {
                if self.selected + 1 < self.options.len() {
                    self.selected += 1;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Enter if self.focus == FormFocus::Category => {
                self.focus = FormFocus::Description;
                OverlayUpdate::stay()
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                if let Some(field) = self.focused_field() {
                    field.pop();
                }
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl => {
                if let Some(field) = self.focused_field() {
                    field.push(c);
                }
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if let Some(field) = self.focused_field() {
            field.push_str(&text.replace(['\r', '\n'], " "));
        }
    }

    fn focused_field(&mut self) -> Option<&mut String> {
        match self.focus {
            FormFocus::Description => Some(&mut self.description),
            FormFocus::Custom => Some(&mut self.custom_text),
            FormFocus::Category | FormFocus::Submit => None,
        }
    }

    fn submit(&self) -> OverlayUpdate {
        OverlayUpdate::close().with_actions(vec![Action::SubmitEvent(self.draft())])
    }
}

fn render_event_form(frame: &mut Frame, form: &EventFormState, area: Rect) {
    let (title, accent) = if form.emergency {
        ("Report Emergency", Color::Magenta)
    } else {
        ("Add Event", Color::Cyan)
    };
    let hints = [
        InputHint::new("Tab", "next field"),
        InputHint::new("↑↓", "category"),
        InputHint::new("Enter", "submit"),
        InputHint::new("Esc", "cancel"),
    ];
    let list_height = form.options.len() as u16;
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title,
            border_color: accent,
            width: 56,
            height: list_height + 12,
            hints: &hints,
        },
    );
    let body = layout.body;
    let mut y = body.y;

    let position = Line::from(vec![
        Span::styled("At ", Style::default().fg(Color::DarkGray)),
        Span::styled(form.position.to_string(), Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(position), Rect::new(body.x, y, body.width, 1));
    y += 1;

    if form.emergency {
        let banner = Span::styled(
            "Emergency mode: category is fixed to Emergency",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        );
        frame.render_widget(Paragraph::new(banner), Rect::new(body.x, y, body.width, 1));
    }
    y += 1;
    render_separator(frame, body, y - body.y);
    y += 1;

    let items: Vec<ListItem> = form
        .options
        .iter()
        .map(|choice| ListItem::new(choice.label().to_string()))
        .collect();
    let highlight = if form.focus == FormFocus::Category {
        Style::default()
            .bg(accent)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(accent).add_modifier(Modifier::BOLD)
    };
    let list = List::new(items)
        .highlight_style(highlight)
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default();
    list_state.select(Some(form.selected));
    frame.render_stateful_widget(
        list,
        Rect::new(body.x, y, body.width, list_height),
        &mut list_state,
    );
    y += list_height + 1;

    render_input_line(
        frame,
        Rect::new(body.x, y, body.width, 1),
        &InputLine {
            value: &form.description,
            placeholder: Some("optional"),
            prompt: "Description: ",
            focused: form.focus == FormFocus::Description,
            masked: false,
            accent,
        },
    );
    y += 1;

    if form.other_selected() {
        render_input_line(
            frame,
            Rect::new(body.x, y, body.width, 1),
            &InputLine {
                value: &form.custom_text,
                placeholder: Some("e.g. Gas leak"),
                prompt: "Category: ",
                focused: form.focus == FormFocus::Custom,
                masked: false,
                accent,
            },
        );
    }
    y += 2;

    let submit = Line::from(button_span(
        "Submit",
        form.focus == FormFocus::Submit,
        accent,
    ));
    if y < body.y + body.height {
        frame.render_widget(Paragraph::new(submit), Rect::new(body.x, y, body.width, 1));
    }
}
