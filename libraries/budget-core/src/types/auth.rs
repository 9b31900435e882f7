/// Auth session value types
use crate::error::Result;
use crate::types::user::{validate_email, validate_password, NewUser};
use crate::types::Role;
use serde::{Deserialize, Serialize};

/// Position of the session in its state machine
///
/// `Anonymous -> Authenticating -> Authenticated`, and
/// `Authenticating -> Anonymous` when the attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
}

impl AuthStatus {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
        }
    }
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Signup form fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub budget_limit: Option<f64>,
}

impl SignUp {
    /// Validate the form; the password is mandatory here
    pub fn validate(&self) -> Result<()> {
        validate_password(&self.password)?;
        self.to_new_user().validate()
    }

    /// The user record to create, without the plaintext password
    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: Role::User,
            password: None,
            budget_limit: self.budget_limit,
        }
    }
}

/// Login form fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Cheap shape check before any lookup
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)
    }
}

/// Mocked password reset confirmation; nothing is actually sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetConfirmation {
    pub success: bool,
    pub message: String,
}

impl ResetConfirmation {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: "Password reset link sent to your email".to_string(),
        }
    }
}
