//! Entity store - normalized users and expenses
//!
//! Both collections keep insertion order. Every mutation bumps the
//! collection's version so memoized selectors know when to recompute.

use budget_core::error::{BudgetError, Result};
use budget_core::types::{
    Expense, ExpenseId, ExpenseUpdate, NewExpense, NewUser, User, UserId, UserUpdate,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Owner of the users and expenses collections
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    users: Vec<User>,
    expenses: Vec<Expense>,
    users_version: u64,
    expenses_version: u64,
}

impl EntityStore {
    /// Build a store from restored collections
    pub fn from_parts(users: Vec<User>, expenses: Vec<Expense>) -> Self {
        Self {
            users,
            expenses,
            users_version: 0,
            expenses_version: 0,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Monotonic counter bumped on every users mutation
    pub fn users_version(&self) -> u64 {
        self.users_version
    }

    /// Monotonic counter bumped on every expenses mutation
    pub fn expenses_version(&self) -> u64 {
        self.expenses_version
    }

    pub fn user_by_id(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim();
        self.users.iter().find(|user| user.email == email)
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.user_by_email(email).is_some()
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Insert a user with a fresh id and creation time
    ///
    /// `password_hash` is the already-derived digest, if any. The
    /// plaintext `password` field of `data` is ignored here.
    pub fn add_user(
        &mut self,
        data: NewUser,
        password_hash: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let email = data.email.trim().to_string();
        if self.contains_email(&email) {
            return Err(BudgetError::DuplicateEmail(email));
        }

        let user = User {
            id: UserId::generate(),
            first_name: data.first_name.trim().to_string(),
            last_name: data.last_name.trim().to_string(),
            email,
            phone: data.phone.trim().to_string(),
            role: data.role,
            password_hash,
            budget_limit: data.budget_limit,
            created_at: now,
        };

        self.users.push(user.clone());
        self.users_version += 1;
        debug!(user_id = %user.id, "user added");
        Ok(user)
    }

    /// Merge `update` into the user with `id`; `None` if there is no such user
    pub fn update_user(&mut self, id: &UserId, update: &UserUpdate) -> Option<User> {
        let user = self.users.iter_mut().find(|user| &user.id == id)?;
        update.apply(user);
        let updated = user.clone();
        self.users_version += 1;
        debug!(user_id = %id, "user updated");
        Some(updated)
    }

    /// Remove the user with `id`; expenses referencing it are kept
    pub fn delete_user(&mut self, id: &UserId) -> bool {
        let before = self.users.len();
        self.users.retain(|user| &user.id != id);
        let removed = self.users.len() != before;
        if removed {
            self.users_version += 1;
            debug!(user_id = %id, "user deleted");
        }
        removed
    }

    // ========================================================================
    // Expenses
    // ========================================================================

    /// Validate and insert an expense with a fresh id
    pub fn add_expense(&mut self, data: NewExpense) -> Result<Expense> {
        data.validate()?;

        let expense = Expense {
            id: ExpenseId::generate(),
            user_id: data.user_id,
            name: data.name.trim().to_string(),
            amount: data.amount,
            date_iso: data.date_iso.trim().to_string(),
        };

        self.expenses.push(expense.clone());
        self.expenses_version += 1;
        debug!(expense_id = %expense.id, user_id = %expense.user_id, "expense added");
        Ok(expense)
    }

    /// Merge `update` into the expense with `id`
    ///
    /// Returns `Ok(None)` when no expense has that id. Invalid fields are
    /// rejected before anything is changed.
    pub fn update_expense(
        &mut self,
        id: &ExpenseId,
        update: &ExpenseUpdate,
    ) -> Result<Option<Expense>> {
        update.validate()?;

        let Some(expense) = self.expenses.iter_mut().find(|expense| &expense.id == id) else {
            return Ok(None);
        };
        update.apply(expense);
        let updated = expense.clone();
        self.expenses_version += 1;
        debug!(expense_id = %id, "expense updated");
        Ok(Some(updated))
    }

    /// Remove the expense with `id`
    pub fn remove_expense(&mut self, id: &ExpenseId) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|expense| &expense.id != id);
        let removed = self.expenses.len() != before;
        if removed {
            self.expenses_version += 1;
            debug!(expense_id = %id, "expense removed");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_core::types::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Jenny".to_string(),
            last_name: "Wilson".to_string(),
            email: email.to_string(),
            phone: "+1 (555) 345-6789".to_string(),
            role: Role::User,
            password: None,
            budget_limit: None,
        }
    }

    fn new_expense(user_id: &UserId, name: &str, amount: f64) -> NewExpense {
        NewExpense {
            user_id: user_id.clone(),
            name: name.to_string(),
            amount,
            date_iso: "2024-01-15T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn add_user_assigns_id_and_timestamp() {
        let mut store = EntityStore::default();
        let now = Utc::now();
        let user = store.add_user(new_user("jenny@example.com"), None, now).unwrap();

        assert_eq!(user.created_at, now);
        assert_eq!(store.users().len(), 1);
        assert_eq!(store.user_by_id(&user.id), Some(&user));
        assert_eq!(store.users_version(), 1);
    }

    #[test]
    fn duplicate_email_leaves_collection_unchanged() {
        let mut store = EntityStore::default();
        store
            .add_user(new_user("jenny@example.com"), None, Utc::now())
            .unwrap();

        let result = store.add_user(new_user("jenny@example.com"), None, Utc::now());
        assert!(matches!(result, Err(BudgetError::DuplicateEmail(_))));
        assert_eq!(store.users().len(), 1);
        assert_eq!(store.users_version(), 1);
    }

    #[test]
    fn update_and_delete_missing_user_are_no_ops() {
        let mut store = EntityStore::default();
        let missing = UserId::new("nobody");
        assert!(store.update_user(&missing, &UserUpdate::default()).is_none());
        assert!(!store.delete_user(&missing));
        assert_eq!(store.users_version(), 0);
    }

    #[test]
    fn deleting_user_keeps_their_expenses() {
        let mut store = EntityStore::default();
        let user = store
            .add_user(new_user("jenny@example.com"), None, Utc::now())
            .unwrap();
        store.add_expense(new_expense(&user.id, "Rent", 900.0)).unwrap();

        assert!(store.delete_user(&user.id));
        assert_eq!(store.expenses().len(), 1);
        assert_eq!(store.expenses()[0].user_id, user.id);
    }

    #[test]
    fn add_expense_trims_name_and_keeps_order() {
        let mut store = EntityStore::default();
        let user_id = UserId::new("user1");
        store.add_expense(new_expense(&user_id, " Coffee ", 3.5)).unwrap();
        store.add_expense(new_expense(&user_id, "Lunch", 12.0)).unwrap();

        let names: Vec<_> = store.expenses().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Coffee", "Lunch"]);
        assert_eq!(store.expenses_version(), 2);
    }

    #[test]
    fn add_expense_rejects_negative_amount() {
        let mut store = EntityStore::default();
        let result = store.add_expense(new_expense(&UserId::new("user1"), "Refund", -5.0));
        assert!(matches!(result, Err(BudgetError::InvalidAmount(_))));
        assert!(store.expenses().is_empty());
        assert_eq!(store.expenses_version(), 0);
    }

    #[test]
    fn update_expense_merges_and_validates() {
        let mut store = EntityStore::default();
        let expense = store
            .add_expense(new_expense(&UserId::new("user1"), "Old Name", 100.0))
            .unwrap();

        let bad = ExpenseUpdate {
            amount: Some(-1.0),
            ..Default::default()
        };
        assert!(store.update_expense(&expense.id, &bad).is_err());
        assert_eq!(store.expenses()[0].amount, 100.0);

        let good = ExpenseUpdate {
            name: Some("New Name".to_string()),
            ..Default::default()
        };
        let updated = store.update_expense(&expense.id, &good).unwrap().unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.amount, 100.0);

        let missing = store
            .update_expense(&ExpenseId::new("missing"), &good)
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn remove_expense_by_id() {
        let mut store = EntityStore::default();
        let expense = store
            .add_expense(new_expense(&UserId::new("user1"), "Test Expense", 100.0))
            .unwrap();

        assert!(store.remove_expense(&expense.id));
        assert!(!store.remove_expense(&expense.id));
        assert!(store.expenses().is_empty());
    }
}
