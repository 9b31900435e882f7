//! End-to-end scenarios over the store facade


use budget_core::types::{AuthStatus, Credentials, ExpenseUpdate, ReportRange, UserUpdate};
use budget_core::{BudgetError, ErrorKind};
use budget_store::StoreOptions;
use test_helpers::*;

#[test]
fn signup_then_expense_then_month_filter() {
    let (store, _storage) = fresh_store();

    let user = store.sign_up(sign_up_form("A", "B", "a@b.com")).unwrap();
    assert!(store.is_authenticated());
    assert_eq!(store.auth_status(), AuthStatus::Authenticated);
    assert_eq!(store.current_user().unwrap().email, "a@b.com");

    store
        .add_expense(new_expense(&user.id, "Coffee", 3.5, "2024-03-05T00:00:00Z"))
        .unwrap();

    let mine = store.user_expenses(&user.id);
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].amount, 3.5);

    let march = store.expenses_by_month(&user.id, 2024, 3);
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].name, "Coffee");
    assert!(store.expenses_by_month(&user.id, 2024, 4).is_empty());
}

#[test]
fn session_never_exposes_digest() {
    let (store, _storage) = fresh_store();
    let user = store.sign_up(sign_up_form("A", "B", "a@b.com")).unwrap();

    assert!(user.password_hash.is_none());
    assert!(store.current_user().unwrap().password_hash.is_none());
    assert!(store.user_by_id(&user.id).unwrap().password_hash.is_some());
}

#[test]
fn logout_then_login_restores_session() {
    let (store, _storage) = fresh_store();
    store.sign_up(sign_up_form("A", "B", "a@b.com")).unwrap();
    let users_before = store.all_users();

    store.logout();
    assert!(!store.is_authenticated());
    assert!(store.current_user().is_none());
    assert_eq!(store.all_users(), users_before);

    let user = store.login(Credentials::new("a@b.com", "secret1")).unwrap();
    assert!(store.is_authenticated());
    assert_eq!(user.email, "a@b.com");
    assert_eq!(store.current_user().unwrap().email, "a@b.com");
}

#[test]
fn signup_with_registered_email_fails() {
    let (store, _storage) = fresh_store();
    store.sign_up(sign_up_form("A", "B", "a@b.com")).unwrap();
    store.logout();

    let err = store
        .sign_up(sign_up_form("Other", "Person", "a@b.com"))
        .unwrap_err();
    assert!(matches!(err, BudgetError::EmailExists(_)));
    assert_eq!(err.kind(), ErrorKind::EmailExists);
    assert!(!store.is_authenticated());
    assert!(store.auth_error().is_some());
    assert_eq!(store.all_users().len(), 1);
}

#[test]
fn signup_rejects_short_password() {
    let (store, _storage) = fresh_store();
    let mut form = sign_up_form("A", "B", "a@b.com");
    form.password = "123".to_string();

    let err = store.sign_up(form).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(store.all_users().is_empty());
}

#[test]
fn login_unknown_email_fails() {
    let (store, _storage) = fresh_store();
    let err = store
        .login(Credentials::new("ghost@example.com", "secret1"))
        .unwrap_err();
    assert!(matches!(err, BudgetError::InvalidCredentials));
    assert_eq!(store.auth_status(), AuthStatus::Anonymous);
}

#[test]
fn forgot_password_is_mocked() {
    let (store, _storage) = fresh_store();
    store.sign_up(sign_up_form("A", "B", "a@b.com")).unwrap();

    let confirmation = store.forgot_password("a@b.com").unwrap();
    assert!(confirmation.success);
    assert_eq!(confirmation.message, "Password reset link sent to your email");

    let err = store.forgot_password("ghost@example.com").unwrap_err();
    assert!(matches!(err, BudgetError::AccountNotFound(_)));
    assert!(store.is_authenticated());
}

#[test]
fn add_user_with_duplicate_email_leaves_collection_unchanged() {
    let (store, _storage) = fresh_store();
    store.add_user(new_user("jenny@example.com")).unwrap();

    let err = store.add_user(new_user("jenny@example.com")).unwrap_err();
    assert!(matches!(err, BudgetError::DuplicateEmail(_)));
    assert_eq!(store.all_users().len(), 1);
}

#[test]
fn update_user_merges_fields_but_not_session() {
    let (store, _storage) = fresh_store();
    let user = store.sign_up(sign_up_form("A", "B", "a@b.com")).unwrap();

    let updated = store
        .update_user(
            &user.id,
            UserUpdate {
                first_name: Some("Alice".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.first_name, "Alice");
    assert_eq!(updated.last_name, "B");
    assert_eq!(store.current_user().unwrap().first_name, "A");
}

#[test]
fn deleting_user_keeps_expenses_resolvable() {
    let (store, _storage) = fresh_store();
    let user = store.add_user(new_user("jenny@example.com")).unwrap();
    let expense = store
        .add_expense(new_expense(&user.id, "Rent", 900.0, "2024-01-01T09:00:00Z"))
        .unwrap();

    assert!(store.delete_user(&user.id));
    assert!(store.user_by_id(&user.id).is_none());

    let found = store.expense_by_id(&expense.id).unwrap();
    assert_eq!(found.user_id, user.id);
    assert_eq!(store.user_expenses(&user.id).len(), 1);
}

#[test]
fn expense_update_and_removal() {
    let (store, _storage) = fresh_store();
    let user = store.add_user(new_user("jenny@example.com")).unwrap();
    let expense = store
        .add_expense(new_expense(&user.id, "Groceries", 80.0, "2024-01-10"))
        .unwrap();

    let err = store
        .update_expense(
            &expense.id,
            ExpenseUpdate {
                amount: Some(-3.0),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);

    let updated = store
        .update_expense(
            &expense.id,
            ExpenseUpdate {
                amount: Some(95.5),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.amount, 95.5);
    assert_eq!(store.monthly_total(&user.id, 2024, 1), 95.5);

    assert!(store.remove_expense(&expense.id));
    assert!(store.expense_by_id(&expense.id).is_none());
    assert_eq!(store.monthly_total(&user.id, 2024, 1), 0.0);
}

#[test]
fn month_window_covers_first_and_last_instant() {
    let (store, _storage) = fresh_store();
    let user = store.add_user(new_user("jenny@example.com")).unwrap();
    for date in [
        "2023-12-31T23:59:59Z",
        "2024-01-01T00:00:00Z",
        "2024-01-31T23:59:59Z",
        "2024-01-31T23:59:59.9995Z",
        "2024-02-01T00:00:00Z",
    ] {
        store
            .add_expense(new_expense(&user.id, "Edge", 1.0, date))
            .unwrap();
    }

    assert_eq!(store.expenses_by_month(&user.id, 2024, 1).len(), 3);
    assert_eq!(store.monthly_total(&user.id, 2024, 1), 3.0);
    assert_eq!(store.expenses_by_month(&user.id, 2024, 2).len(), 1);

    let series = store.monthly_series(&user.id, 2024, 2, ReportRange::OneMonth);
    assert_eq!(series[0].total, 1.0);
}

#[test]
fn demo_users_seed_only_into_empty_storage() {
    let storage = budget_store::MemoryStorage::new();
    let options = StoreOptions {
        seed_demo_users: true,
        ..Default::default()
    };

    let store = open_store(&storage, options.clone());
    assert_eq!(store.all_users().len(), 4);
    let guy = store.user_by_email("guy.hawkins@example.com").unwrap();
    assert!(store.delete_user(&guy.id));
    store.flush();
    drop(store);

    let reopened = open_store(&storage, options);
    assert_eq!(reopened.all_users().len(), 3);
}

#[test]
fn series_reports_each_month_of_range() {
    let (store, _storage) = fresh_store();
    let user = store.add_user(new_user("jenny@example.com")).unwrap();
    store
        .add_expense(new_expense(&user.id, "Rent", 900.0, "2024-01-01T09:00:00Z"))
        .unwrap();
    store
        .add_expense(new_expense(&user.id, "Rent", 950.0, "2024-03-01T09:00:00Z"))
        .unwrap();

    let series = store.monthly_series(
        &user.id,
        2024,
        3,
        budget_core::types::ReportRange::OneMonth,
    );
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].total, 950.0);

    let half_year = store.monthly_series(&user.id, 2024, 3, store.report_range());
    let totals: Vec<f64> = half_year.iter().map(|p| p.total).collect();
    assert_eq!(totals, [0.0, 0.0, 0.0, 900.0, 0.0, 950.0]);
}
