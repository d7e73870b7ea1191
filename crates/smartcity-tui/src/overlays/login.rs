//! Login screen.
//!
//! Shown while logged out and cannot be dismissed: the only ways out are a
//! successful login, continuing as a visitor, or quitting.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use smartcity_core::session::{Role, authenticate};

use super::OverlayUpdate;
use super::render_utils::{
    InputHint, InputLine, OverlayConfig, button_span, render_input_line, render_overlay,
};
use crate::actions::Action;
use crate::state::TuiState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginFocus {
    #[default]
    Username,
    Password,
    Login,
    Visitor,
}

impl LoginFocus {
    const ORDER: [LoginFocus; 4] = [
        LoginFocus::Username,
        LoginFocus::Password,
        LoginFocus::Login,
        LoginFocus::Visitor,
    ];

    fn step(self, forward: bool) -> Self {
        let len = Self::ORDER.len();
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        Self::ORDER[next]
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginFocus,
    pub error: Option<String>,
}

impl LoginState {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        render_login(frame, self, area);
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => OverlayUpdate::stay().with_actions(vec![Action::Quit]),
            KeyCode::Char('c') if ctrl => OverlayUpdate::stay().with_actions(vec![Action::Quit]),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.step(true);
                OverlayUpdate::stay()
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.step(false);
                OverlayUpdate::stay()
            }
            KeyCode::Enter => match self.focus {
                LoginFocus::Username => {
                    self.focus = LoginFocus::Password;
                    OverlayUpdate::stay()
                }
                LoginFocus::Password | LoginFocus::Login => self.submit(tui),
                LoginFocus::Visitor => OverlayUpdate::close().with_actions(vec![Action::Login {
                    role: Role::Visitor,
                }]),
            },
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
        let line = text.lines().next().unwrap_or("");
        if let Some(field) = self.focused_field() {
            field.push_str(line);
        }
    }

    fn focused_field(&mut self) -> Option<&mut String> {
        match self.focus {
            LoginFocus::Username => Some(&mut self.username),
            LoginFocus::Password => Some(&mut self.password),
            LoginFocus::Login | LoginFocus::Visitor => None,
        }
    }

    fn submit(&mut self, tui: &TuiState) -> OverlayUpdate {
        match authenticate(&tui.config.accounts, &self.username, &self.password) {
            Ok(role) => OverlayUpdate::close().with_actions(vec![Action::Login { role }]),
            Err(err) => {
                tracing::info!(username = %self.username, "Login rejected");
                self.error = Some(err.to_string());
                OverlayUpdate::stay()
            }
        }
    }
}

fn render_login(frame: &mut Frame, state: &LoginState, area: Rect) {
    let accent = Color::Cyan;
    let hints = [
        InputHint::new("Tab", "next field"),
        InputHint::new("Enter", "confirm"),
        InputHint::new("Esc", "quit"),
    ];
    let layout = render_overlay(
        frame,
        area,
        &OverlayConfig {
            title: "Smart City Login",
            border_color: accent,
            width: 52,
            height: 11,
            hints: &hints,
        },
    );
    let body = layout.body;
    let row = |offset: u16| Rect::new(body.x, body.y + offset, body.width, 1);

    render_input_line(
        frame,
        row(0),
        &InputLine {
            value: &state.username,
            placeholder: Some("username"),
            prompt: "Username: ",
            focused: state.focus == LoginFocus::Username,
            masked: false,
            accent,
        },
    );
    render_input_line(
        frame,
        row(2),
        &InputLine {
            value: &state.password,
            placeholder: Some("password"),
            prompt: "Password: ",
            focused: state.focus == LoginFocus::Password,
            masked: true,
            accent,
        },
    );

    let buttons = Line::from(vec![
        button_span("Login", state.focus == LoginFocus::Login, accent),
        Span::raw("  "),
        button_span(
            "Continue as visitor",
            state.focus == LoginFocus::Visitor,
            Color::Green,
        ),
    ]);
    frame.render_widget(Paragraph::new(buttons), row(4));

    if let Some(error) = &state.error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red))),
            row(6),
        );
    }
}

#[cfg(test)]
mod tests {
    use smartcity_core::config::Config;
    use smartcity_core::persistence::EventSink;
    use smartcity_core::session::INVALID_CREDENTIALS_MESSAGE;

    use super::*;
    use crate::overlays::OverlayTransition;

    fn tui() -> TuiState {
        TuiState::new(Config::default(), EventSink::Local)
    }

    fn press(state: &mut LoginState, tui: &TuiState, code: KeyCode) -> OverlayUpdate {
        state.handle_key(tui, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(state: &mut LoginState, tui: &TuiState, text: &str) {
        for c in text.chars() {
            press(state, tui, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_admin_credentials_log_in() {
        let tui = tui();
        let mut state = LoginState::default();
        type_text(&mut state, &tui, "denemeadmin");
        press(&mut state, &tui, KeyCode::Enter);
        type_text(&mut state, &tui, "denemeadmin");
        let update = press(&mut state, &tui, KeyCode::Enter);

        assert!(matches!(update.transition, OverlayTransition::Close));
        assert_eq!(update.actions, vec![Action::Login { role: Role::Admin }]);
    }

    #[test]
    fn test_wrong_password_shows_generic_error() {
        let tui = tui();
        let mut state = LoginState::default();
        type_text(&mut state, &tui, "deneme");
        press(&mut state, &tui, KeyCode::Tab);
        type_text(&mut state, &tui, "nope");
        let update = press(&mut state, &tui, KeyCode::Enter);

        assert!(matches!(update.transition, OverlayTransition::Stay));
        assert!(update.actions.is_empty());
        assert_eq!(state.error.as_deref(), Some(INVALID_CREDENTIALS_MESSAGE));
    }

    #[test]
    fn test_visitor_button() {
        let tui = tui();
        let mut state = LoginState {
            focus: LoginFocus::Visitor,
            ..LoginState::default()
        };
        let update = press(&mut state, &tui, KeyCode::Enter);
        assert_eq!(update.actions, vec![Action::Login {
            role: Role::Visitor
        }]);
    }

    #[test]
    fn test_escape_quits_instead_of_closing() {
        let tui = tui();
        let mut state = LoginState::default();
        let update = press(&mut state, &tui, KeyCode::Esc);
        assert!(matches!(update.transition, OverlayTransition::Stay));
        assert_eq!(update.actions, vec![Action::Quit]);
    }

    #[test]
    fn test_paste_goes_to_focused_field() {
        let mut state = LoginState {
            focus: LoginFocus::Password,
            ..LoginState::default()
        };
        state.handle_paste("secret\nignored");
        assert_eq!(state.password, "secret");
        assert!(state.username.is_empty());
    }
}
