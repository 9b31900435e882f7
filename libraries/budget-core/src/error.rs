/// Core error types for the budget tracker
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `BudgetError`
pub type Result<T> = std::result::Result<T, BudgetError>;

/// Core error type for the budget tracker
#[derive(Error, Debug)]
pub enum BudgetError {
    /// A user with this email is already in the users collection
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    /// Expense amount is not a finite, non-negative number
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Signup attempted with an email that is already registered
    #[error("An account with email {0} already exists. Please log in instead.")]
    EmailExists(String),

    /// Unknown email or digest mismatch
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password reset requested for an unknown email
    #[error("No account found for {0}. Please sign up first.")]
    AccountNotFound(String),

    /// A persisted slice could not be decoded
    #[error("Malformed persisted state for slice '{slice}': {reason}")]
    MalformedPersistedState { slice: String, reason: String },

    /// Invalid input (empty names, bad dates, bad email/phone format)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Credential hashing backend failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Machine-readable error category
///
/// Serializes to the same snake_case string as [`ErrorKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateEmail,
    InvalidAmount,
    EmailExists,
    InvalidCredentials,
    AccountNotFound,
    MalformedPersistedState,
    InvalidInput,
    Credential,
    Storage,
    Io,
    Serialization,
}

impl ErrorKind {
    /// Stable string form used in CLI output and logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateEmail => "duplicate_email",
            Self::InvalidAmount => "invalid_amount",
            Self::EmailExists => "email_exists",
            Self::InvalidCredentials => "invalid_credentials",
            Self::AccountNotFound => "account_not_found",
            Self::MalformedPersistedState => "malformed_persisted_state",
            Self::InvalidInput => "invalid_input",
            Self::Credential => "credential",
            Self::Storage => "storage",
            Self::Io => "io",
            Self::Serialization => "serialization",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured command failure handed to collaborators for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl BudgetError {
    /// Create an invalid amount error
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a malformed slice error
    pub fn malformed(slice: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPersistedState {
            slice: slice.into(),
            reason: reason.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateEmail(_) => ErrorKind::DuplicateEmail,
            Self::InvalidAmount(_) => ErrorKind::InvalidAmount,
            Self::EmailExists(_) => ErrorKind::EmailExists,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Self::MalformedPersistedState { .. } => ErrorKind::MalformedPersistedState,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Credential(_) => ErrorKind::Credential,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Convert into the kind + message pair surfaced to the UI
    pub fn to_failure(&self) -> CommandFailure {
        CommandFailure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_kind_and_message() {
        let failure = BudgetError::DuplicateEmail("a@b.com".to_string()).to_failure();
        assert_eq!(failure.kind, ErrorKind::DuplicateEmail);
        assert!(failure.message.contains("a@b.com"));
    }

    #[test]
    fn kind_serializes_like_its_display_form() {
        let json = serde_json::to_string(&ErrorKind::InvalidCredentials).unwrap();
        assert_eq!(json, "\"invalid_credentials\"");

        for kind in [
            ErrorKind::DuplicateEmail,
            ErrorKind::InvalidAmount,
            ErrorKind::EmailExists,
            ErrorKind::InvalidCredentials,
            ErrorKind::AccountNotFound,
            ErrorKind::MalformedPersistedState,
            ErrorKind::InvalidInput,
            ErrorKind::Credential,
            ErrorKind::Storage,
            ErrorKind::Io,
            ErrorKind::Serialization,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }

    #[test]
    fn io_errors_convert() {
        let err: BudgetError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
