//! Status line state types.

use std::time::{Duration, Instant};

use smartcity_core::session::Controls;

const INFO_TTL: Duration = Duration::from_secs(4);
const WARNING_TTL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
    expires_at: Instant,
}

/// Transient notice slot. A newer notice replaces the older one.
#[derive(Debug, Default)]
pub struct StatusState {
    notice: Option<Notice>,
}

impl StatusState {
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(text.into(), NoticeLevel::Info, INFO_TTL);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(text.into(), NoticeLevel::Warning, WARNING_TTL);
    }

    fn push(&mut self, text: String, level: NoticeLevel, ttl: Duration) {
        self.notice = Some(Notice {
            text,
            level,
            expires_at: Instant::now() + ttl,
        });
    }

    pub fn current(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Drops the notice once its time is up. Called on every tick.
    pub fn expire(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
    }

    pub fn clear(&mut self) {
        self.notice = None;
    }
}

/// One entry of the control bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl ControlHint {
    const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

/// Controls shown on the main screen for a role.
pub fn control_hints(controls: Controls) -> Vec<ControlHint> {
    let mut hints = Vec::with_capacity(7);
    if controls.add_event {
        hints.push(ControlHint::new("a", "add event"));
    }
    if controls.change_mode {
        hints.push(ControlHint::new("m", "mode"));
    }
    if controls.emergency {
        hints.push(ControlHint::new("e", "emergency"));
    }
    hints.push(ControlHint::new("Enter", "tap"));
    hints.push(ControlHint::new("Tab", "next event"));
    hints.push(ControlHint::new("o", "logout"));
    hints.push(ControlHint::new("q", "quit"));
    hints
}
