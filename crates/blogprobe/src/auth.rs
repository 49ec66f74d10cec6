//! Authentication state as the UI shows it.
//!
//! ```text
//!   LoggedOut ──login(valid)──▶ LoggedIn(name)
//!   LoggedOut ──login(invalid)─▶ LoggedOut   (error banner)
//!   LoggedIn  ──logout─────────▶ LoggedOut
//! ```

use crate::locator::Locator;
use crate::page::Page;
use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};

/// Text shown above the login form
pub const LOGIN_HEADING: &str = "Log in to application";

/// Banner shown after a rejected login
pub const WRONG_CREDENTIALS: &str = "Wrong credentials";

const LOGGED_IN_SUFFIX: &str = " logged in";

/// Text shown while `name` is logged in
#[must_use]
pub fn logged_in_text(name: &str) -> String {
    format!("{name}{LOGGED_IN_SUFFIX}")
}

/// Authentication state of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    /// No user logged in (initial state)
    #[default]
    LoggedOut,
    /// User with display name `name` is logged in
    LoggedIn {
        /// Display name
        name: String,
    },
}

/// Event driving an [`AuthState`] transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Login accepted for the user with this display name
    LoginAccepted {
        /// Display name
        name: String,
    },
    /// Login rejected
    LoginRejected,
    /// Logout clicked
    Logout,
}

impl AuthState {
    /// Next state after `event`; events that do not apply leave the state unchanged
    #[must_use]
    pub fn transition(self, event: &AuthEvent) -> Self {
        match (self, event) {
            (Self::LoggedOut, AuthEvent::LoginAccepted { name }) => {
                Self::LoggedIn { name: name.clone() }
            }
            (Self::LoggedOut, AuthEvent::LoginRejected) => Self::LoggedOut,
            (Self::LoggedIn { .. }, AuthEvent::Logout) => Self::LoggedOut,
            (state, _) => state,
        }
    }

    /// Whether a user is logged in
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn { .. })
    }

    /// Display name of the logged-in user
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::LoggedIn { name } => Some(name),
            Self::LoggedOut => None,
        }
    }

    /// Parse `"<name> logged in"` out of rendered text.
    ///
    /// The banner element also holds the logout button, so anything after
    /// the marker is ignored.
    #[must_use]
    pub fn from_banner(text: &str) -> Option<Self> {
        let (name, _) = text.split_once(LOGGED_IN_SUFFIX)?;
        let name = name.trim();
        (!name.is_empty()).then(|| Self::LoggedIn {
            name: name.to_string(),
        })
    }

    /// Read the current state off the page, without waiting
    pub async fn observe(page: &mut Page) -> ProbeResult<Self> {
        for element in page.resolve(&Locator::text(LOGGED_IN_SUFFIX.trim())).await? {
            if !element.visible {
                continue;
            }
            if let Some(state) = Self::from_banner(&element.text_content) {
                return Ok(state);
            }
        }
        Ok(Self::LoggedOut)
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoggedOut => write!(f, "logged out"),
            Self::LoggedIn { name } => write!(f, "logged in as {name}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn accepted(name: &str) -> AuthEvent {
        AuthEvent::LoginAccepted {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_initial_state_is_logged_out() {
        assert_eq!(AuthState::default(), AuthState::LoggedOut);
    }

    #[test]
    fn test_valid_login_then_logout() {
        let state = AuthState::LoggedOut.transition(&accepted("test1"));
        assert_eq!(state.name(), Some("test1"));
        let state = state.transition(&AuthEvent::Logout);
        assert_eq!(state, AuthState::LoggedOut);
    }

    #[test]
    fn test_invalid_login_stays_logged_out() {
        let state = AuthState::LoggedOut.transition(&AuthEvent::LoginRejected);
        assert!(!state.is_logged_in());
    }

    #[test]
    fn test_irrelevant_events_keep_state() {
        let state = AuthState::LoggedIn {
            name: "test".to_string(),
        };
        let again = state.clone().transition(&accepted("other"));
        assert_eq!(again, state);
        assert_eq!(
            AuthState::LoggedOut.transition(&AuthEvent::Logout),
            AuthState::LoggedOut
        );
    }

    #[test]
    fn test_from_banner() {
        assert_eq!(
            AuthState::from_banner("  test1 logged in "),
            Some(AuthState::LoggedIn {
                name: "test1".to_string()
            })
        );
        assert_eq!(
            AuthState::from_banner("test logged in logout"),
            Some(AuthState::LoggedIn {
                name: "test".to_string()
            })
        );
        assert_eq!(AuthState::from_banner(" logged in"), None);
        assert_eq!(AuthState::from_banner("Wrong credentials"), None);
    }

    #[test]
    fn test_logged_in_text() {
        assert_eq!(logged_in_text("other"), "other logged in");
        assert_eq!(
            AuthState::LoggedIn {
                name: "other".into()
            }
            .to_string(),
            "logged in as other"
        );
    }
}
