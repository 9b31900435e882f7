//! Demo accounts for a fresh install
//!
//! They carry no password digest, so nobody can sign in as them.

use budget_core::types::{Role, User, UserId};
use chrono::{DateTime, Utc};

const DEMO_USERS: [(&str, &str, &str, &str, &str, Role); 4] = [
    ("user-1", "Guy", "Hawkins", "guy.hawkins@example.com", "+1 (555) 123-4567", Role::Admin),
    ("user-2", "Wade", "Warren", "wade.warren@example.com", "+1 (555) 234-5678", Role::User),
    ("user-3", "Jenny", "Wilson", "jenny.wilson@example.com", "+1 (555) 345-6789", Role::User),
    ("user-4", "Robert", "Fox", "robert.fox@example.com", "+1 (555) 456-7890", Role::Manager),
];

/// The four demo users, created at `now`
pub fn demo_users(now: DateTime<Utc>) -> Vec<User> {
    DEMO_USERS
        .iter()
        .map(|&(id, first_name, last_name, email, phone, role)| User {
            id: UserId::new(id),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            role,
            password_hash: None,
            budget_limit: None,
            created_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn demo_users_have_unique_emails_and_no_credentials() {
        let users = demo_users(Utc::now());
        assert_eq!(users.len(), 4);

        let emails: HashSet<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails.len(), 4);
        assert!(users.iter().all(|u| !u.has_credentials()));
        assert_eq!(users[0].role, Role::Admin);
        assert_eq!(users[3].full_name(), "Robert Fox");
    }
}
