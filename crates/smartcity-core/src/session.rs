//! Session state: role, login status, selected mode, emergency flag.
//!
//! The session is mutated only by login/logout and the two UI actions it
//! owns (mode selection and emergency trigger). Everything else reads it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AccountsConfig;
use crate::store::Mode;

/// Message shown when a username/password pair is rejected.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Visitor,
    User,
    Admin,
}

impl Role {
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Visitor => "visitor",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Which main-screen controls a role may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub add_event: bool,
    pub change_mode: bool,
    pub emergency: bool,
}

impl Controls {
    pub fn for_role(role: Role) -> Self {
        Self {
            add_event: role != Role::Visitor,
            change_mode: true,
            emergency: role == Role::Admin,
        }
    }
}

/// Checks a username/password pair against the configured accounts.
///
/// # Errors
/// Returns `AuthError::InvalidCredentials` when the pair matches neither the
/// user nor the admin account.
pub fn authenticate(
    accounts: &AccountsConfig,
    username: &str,
    password: &str,
) -> Result<Role, AuthError> {
    if accounts.user.matches(username, password) {
        Ok(Role::User)
    } else if accounts.admin.matches(username, password) {
        Ok(Role::Admin)
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Current session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    role: Role,
    logged_in: bool,
    emergency_mode: bool,
    mode: Mode,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn is_emergency_mode(&self) -> bool {
        self.emergency_mode
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn controls(&self) -> Controls {
        Controls::for_role(self.role)
    }

    /// Enters the main screen with the given role.
    pub fn login(&mut self, role: Role) {
        self.role = role;
        self.logged_in = true;
        self.emergency_mode = false;
    }

    /// Resets to a logged-out visitor. The selected mode survives logout.
    pub fn logout(&mut self) {
        self.role = Role::Visitor;
        self.logged_in = false;
        self.emergency_mode = false;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Arms emergency mode. Only admins may do this; returns whether it armed.
    pub fn trigger_emergency(&mut self) -> bool {
        if self.controls().emergency {
            self.emergency_mode = true;
        }
        self.emergency_mode
    }

    pub fn clear_emergency(&mut self) {
        self.emergency_mode = false;
    }

    /// Whether a tap on the empty map surface opens the creation form.
    pub fn tap_opens_form(&self) -> bool {
        match (self.role, self.emergency_mode) {
            (Role::Visitor, _) => false,
            (_, false) => true,
            (Role::Admin, true) => true,
            (Role::User, true) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_per_role() {
        assert_eq!(
            Controls::for_role(Role::Visitor),
            Controls {
                add_event: false,
                change_mode: true,
                emergency: false
            }
        );
        let user = Controls::for_role(Role::User);
        assert!(user.add_event && !user.emergency);
        let admin = Controls::for_role(Role::Admin);
        assert!(admin.add_event && admin.emergency);
    }

    #[test]
    fn test_authenticate_fixed_pairs() {
        let accounts = AccountsConfig::default();
        assert_eq!(authenticate(&accounts, "deneme", "deneme"), Ok(Role::User));
        assert_eq!(
            authenticate(&accounts, "denemeadmin", "denemeadmin"),
            Ok(Role::Admin)
        );
        assert_eq!(
            authenticate(&accounts, "deneme", "wrong"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            authenticate(&accounts, "", ""),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            INVALID_CREDENTIALS_MESSAGE
        );
    }

    #[test]
    fn test_logout_clears_emergency() {
        let mut session = Session::default();
        session.login(Role::Admin);
        assert!(session.trigger_emergency());

        session.logout();

        assert_eq!(session.role(), Role::Visitor);
        assert!(!session.is_logged_in());
        assert!(!session.is_emergency_mode());
    }

    #[test]
    fn test_only_admin_can_trigger_emergency() {
        let mut session = Session::default();
        session.login(Role::User);
        assert!(!session.trigger_emergency());
        session.login(Role::Visitor);
        assert!(!session.trigger_emergency());
    }

    #[test]
    fn test_tap_gating() {
        let mut session = Session::default();
        session.login(Role::Visitor);
        assert!(!session.tap_opens_form());

        session.login(Role::User);
        assert!(session.tap_opens_form());

        session.login(Role::Admin);
        assert!(session.tap_opens_form());
        session.trigger_emergency();
        assert!(session.tap_opens_form());
    }
}
