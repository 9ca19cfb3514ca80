use super::broadcaster::AuthEvent;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub username: String,
}

/// Per-session auth flags. `is_admin` implies `is_logged_in`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    user: Option<UserProfile>,
    is_logged_in: bool,
    is_admin: bool,
}

impl SessionState {
    #[must_use]
    pub fn logged_out() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn logged_in(is_admin: bool, user: Option<UserProfile>) -> Self {
        Self {
            user,
            is_logged_in: true,
            is_admin,
        }
    }

    /// Overrides the flags with a transition published elsewhere.
    #[must_use]
    pub fn apply(&self, event: AuthEvent) -> Self {
        if event.is_logged_in {
            Self::logged_in(event.is_admin, self.user.clone())
        } else {
            Self::logged_out()
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[must_use]
    pub const fn event(&self) -> AuthEvent {
        AuthEvent {
            is_logged_in: self.is_logged_in,
            is_admin: self.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_out_clears_everything() {
        let state = SessionState::logged_out();
        assert!(!state.is_logged_in());
        assert!(!state.is_admin());
        assert!(state.user().is_none());
    }

    #[test]
    fn apply_never_yields_admin_without_login() {
        let state = SessionState::logged_in(false, None);
        let next = state.apply(AuthEvent {
            is_logged_in: false,
            is_admin: true,
        });
        assert!(!next.is_logged_in());
        assert!(!next.is_admin());
    }

    #[test]
    fn apply_keeps_known_user_while_logged_in() {
        let alice = UserProfile {
            username: "alice".to_string(),
        };
        let state = SessionState::logged_in(false, Some(alice.clone()));
        let next = state.apply(AuthEvent {
            is_logged_in: true,
            is_admin: true,
        });
        assert!(next.is_admin());
        assert_eq!(next.user(), Some(&alice));
    }

    #[test]
    fn serializes_like_the_event_payload() -> Result<(), serde_json::Error> {
        let state = SessionState::logged_in(true, None);
        assert_eq!(
            serde_json::to_value(&state)?,
            serde_json::json!({ "user": null, "isLoggedIn": true, "isAdmin": true })
        );
        Ok(())
    }
}
