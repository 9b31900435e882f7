/// User domain types
use crate::error::{BudgetError, Result};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Access role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    #[default]
    User,
}

impl Role {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::User => "User",
        }
    }

    /// Parse from string (case-insensitive)
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    pub first_name: String,

    pub last_name: String,

    /// Unique across the users collection
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub role: Role,

    /// Credential digest; never present on the session copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Monthly budget limit, if the user set one at signup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<f64>,

    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name ("First Last")
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Copy of this user with the credential digest stripped
    #[must_use]
    pub fn without_credentials(&self) -> Self {
        Self {
            password_hash: None,
            ..self.clone()
        }
    }

    /// Whether this user can log in
    pub fn has_credentials(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Fields for creating a user via the user-management surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    /// Plaintext password; digested before storage
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub budget_limit: Option<f64>,
}

impl NewUser {
    /// Validate field formats
    pub fn validate(&self) -> Result<()> {
        validate_name("First name", &self.first_name)?;
        validate_name("Last name", &self.last_name)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        if let Some(limit) = self.budget_limit {
            validate_budget_limit(limit)?;
        }
        Ok(())
    }
}

/// Partial update for a user; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<f64>,
}

impl UserUpdate {
    /// Validate the fields that are present
    pub fn validate(&self) -> Result<()> {
        if let Some(first_name) = &self.first_name {
            validate_name("First name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate_name("Last name", last_name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        if let Some(limit) = self.budget_limit {
            validate_budget_limit(limit)?;
        }
        Ok(())
    }

    /// Merge present fields into `user`
    pub fn apply(&self, user: &mut User) {
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(email) = &self.email {
            user.email = email.trim().to_string();
        }
        if let Some(phone) = &self.phone {
            user.phone = phone.trim().to_string();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(limit) = self.budget_limit {
            user.budget_limit = Some(limit);
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn validate_name(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BudgetError::invalid_input(format!("{} is required", label)));
    }
    Ok(())
}

fn validate_budget_limit(limit: f64) -> Result<()> {
    if !limit.is_finite() || limit < 0.0 {
        return Err(BudgetError::invalid_input(format!(
            "Budget limit must be a non-negative number, got {}",
            limit
        )));
    }
    Ok(())
}

/// Check an email has the shape `local@domain.tld` with no whitespace
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let invalid = || BudgetError::invalid_input(format!("Invalid email address: '{}'", email));

    if email.is_empty() {
        return Err(BudgetError::invalid_input("Email is required"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Check an optional phone number: `+?[1-9][0-9]{0,15}` after stripping
/// spaces, dashes and parentheses. Empty is accepted.
pub fn validate_phone(phone: &str) -> Result<()> {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if digits.is_empty() {
        return Ok(());
    }

    let body = digits.strip_prefix('+').unwrap_or(&digits);
    let mut chars = body.chars();
    let valid = matches!(chars.next(), Some('1'..='9'))
        && body.len() <= 16
        && chars.all(|c| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(BudgetError::invalid_input(format!(
            "Invalid phone number: '{}'",
            phone
        )))
    }
}

/// Check password length
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BudgetError::invalid_input(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new("user-1"),
            first_name: "Guy".to_string(),
            last_name: "Hawkins".to_string(),
            email: "guy.hawkins@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            role: Role::Admin,
            password_hash: Some("digest".to_string()),
            budget_limit: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn without_credentials_strips_digest() {
        let user = sample_user();
        let copy = user.without_credentials();
        assert!(copy.password_hash.is_none());
        assert_eq!(copy.email, user.email);
    }

    #[test]
    fn serializes_with_camel_case_and_no_empty_hash() {
        let json = serde_json::to_value(sample_user().without_credentials()).unwrap();
        assert_eq!(json["firstName"], "Guy");
        assert_eq!(json["role"], "Admin");
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn deserializes_record_without_created_at() {
        let json = r#"{"id":"user-2","firstName":"Wade","lastName":"Warren","email":"wade.warren@example.com","phone":"+1 (555) 234-5678","role":"User"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.password_hash.is_none());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("a b@c.com").is_err());
        assert!(validate_email("@b.com").is_err());
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone("").is_ok());
        assert!(validate_phone("+1 (555) 123-4567").is_ok());
        assert!(validate_phone("03001234567").is_err());
        assert!(validate_phone("12ab").is_err());
        assert!(validate_phone("+12345678901234567").is_err());
    }

    #[test]
    fn password_must_have_six_characters() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("secret1").is_ok());
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut user = sample_user();
        let update = UserUpdate {
            last_name: Some("Fox".to_string()),
            role: Some(Role::Manager),
            ..Default::default()
        };
        update.apply(&mut user);

        assert_eq!(user.first_name, "Guy");
        assert_eq!(user.last_name, "Fox");
        assert_eq!(user.role, Role::Manager);
        assert!(!update.is_empty());
        assert!(UserUpdate::default().is_empty());
    }

    #[test]
    fn role_parsing() {
        assert_eq!(Role::from_str("manager"), Some(Role::Manager));
        assert_eq!(Role::from_str("Admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("owner"), None);
    }
}
