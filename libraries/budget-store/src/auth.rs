//! Auth session - current identity and transient auth status

use budget_core::types::{AuthStatus, User};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Current session
///
/// Holds a credential-free copy of the signed-in user, so later edits to
/// the users collection do not leak into the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    user: Option<User>,
    loading: bool,
    error: Option<String>,
}

/// The persisted part of the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAuth {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl AuthSession {
    /// Rebuild a session from its persisted form
    ///
    /// A blob claiming authentication without a user (or the reverse) is
    /// normalised so that `is_authenticated` holds iff a user is present.
    pub fn restore(persisted: PersistedAuth) -> Self {
        let user = if persisted.is_authenticated {
            persisted.user.map(|user| user.without_credentials())
        } else {
            None
        };
        Self {
            user,
            loading: false,
            error: None,
        }
    }

    pub fn to_persisted(&self) -> PersistedAuth {
        PersistedAuth {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> AuthStatus {
        if self.loading {
            AuthStatus::Authenticating
        } else if self.user.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Anonymous
        }
    }

    /// Enter `Authenticating`; any previous identity and error are dropped
    pub fn begin(&mut self) {
        self.user = None;
        self.loading = true;
        self.error = None;
    }

    /// `Authenticating -> Authenticated`
    pub fn succeed(&mut self, user: &User) {
        info!(user_id = %user.id, "session authenticated");
        self.user = Some(user.without_credentials());
        self.loading = false;
        self.error = None;
    }

    /// `Authenticating -> Anonymous`, recording why
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(error = %message, "authentication failed");
        self.user = None;
        self.loading = false;
        self.error = Some(message);
    }

    /// Back to `Anonymous`
    pub fn logout(&mut self) {
        if let Some(user) = &self.user {
            info!(user_id = %user.id, "session ended");
        }
        self.user = None;
        self.loading = false;
        self.error = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
