//! Command handlers
//!
//! Each handler maps one subcommand onto store commands and queries and
//! returns the result in both output formats.

use crate::cli::{
    Command, ExpenseCommand, ListArgs, ReportCommand, SignupArgs, UserAddArgs, UserCommand,
    UserUpdateArgs,
};
use crate::output::{expense_line, lines, to_json, user_line, Rendered};
use budget_core::error::{BudgetError, Result};
use budget_core::types::{
    Credentials, ExpenseId, ExpenseUpdate, NewExpense, NewUser, ReportRange, SignUp, UserId,
    UserUpdate,
};
use budget_store::{paginate, search_expenses, sort_expenses, BudgetStore};
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde_json::json;

/// Run `command` against `store`; `now` stands in for the wall clock
pub fn execute(store: &BudgetStore, command: Command, now: DateTime<Utc>) -> Result<Rendered> {
    match command {
        Command::Signup(args) => signup(store, args),
        Command::Login { email, password } => login(store, email, password),
        Command::Logout => Ok(logout(store)),
        Command::Whoami => Ok(whoami(store)),
        Command::ForgotPassword { email } => {
            let confirmation = store.forgot_password(&email)?;
            Ok(Rendered::new(
                confirmation.message.clone(),
                to_json(&confirmation),
            ))
        }
        Command::Expense(command) => expense(store, command, now),
        Command::User(command) => user(store, command),
        Command::Report(command) => report(store, command, now),
    }
}

/// Explicit `--user`, else the signed-in user
fn resolve_user(store: &BudgetStore, user: Option<String>) -> Result<UserId> {
    match user {
        Some(id) => Ok(UserId::new(id)),
        None => store.current_user().map(|user| user.id).ok_or_else(|| {
            BudgetError::invalid_input("Not signed in; run `budget login` or pass --user")
        }),
    }
}

fn not_found(what: &str, id: &str) -> BudgetError {
    BudgetError::invalid_input(format!("No {} with id '{}'", what, id))
}

// ============================================================================
// Session
// ============================================================================

fn signup(store: &BudgetStore, args: SignupArgs) -> Result<Rendered> {
    let user = store.sign_up(SignUp {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone: args.phone,
        password: args.password,
        budget_limit: args.budget_limit,
    })?;
    Ok(Rendered::new(
        format!("Signed up as {} <{}>", user.full_name(), user.email),
        to_json(&user),
    ))
}

fn login(store: &BudgetStore, email: String, password: String) -> Result<Rendered> {
    let user = store.login(Credentials::new(email, password))?;
    Ok(Rendered::new(
        format!("Signed in as {} <{}>", user.full_name(), user.email),
        to_json(&user),
    ))
}

fn logout(store: &BudgetStore) -> Rendered {
    let was_signed_in = store.is_authenticated();
    store.logout();
    if was_signed_in {
        Rendered::message("Signed out")
    } else {
        Rendered::message("Not signed in")
    }
}

fn whoami(store: &BudgetStore) -> Rendered {
    let user = store.current_user();
    let text = match &user {
        Some(user) => user_line(user),
        None => "Not signed in".to_string(),
    };
    Rendered::new(
        text,
        json!({ "user": user, "isAuthenticated": store.is_authenticated() }),
    )
}

// ============================================================================
// Expenses
// ============================================================================

fn expense(store: &BudgetStore, command: ExpenseCommand, now: DateTime<Utc>) -> Result<Rendered> {
    match command {
        ExpenseCommand::Add {
            name,
            amount,
            date,
            user,
        } => {
            let user_id = resolve_user(store, user)?;
            let date_iso =
                date.unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));
            let expense = store.add_expense(NewExpense {
                user_id,
                name,
                amount,
                date_iso,
            })?;
            Ok(Rendered::new(
                format!("Added expense {}", expense.id),
                to_json(&expense),
            ))
        }
        ExpenseCommand::Update {
            id,
            name,
            amount,
            date,
        } => {
            let update = ExpenseUpdate {
                name,
                amount,
                date_iso: date,
            };
            let expense = store
                .update_expense(&ExpenseId::new(id.as_str()), update)?
                .ok_or_else(|| not_found("expense", &id))?;
            Ok(Rendered::new(expense_line(&expense), to_json(&expense)))
        }
        ExpenseCommand::Remove { id } => {
            if store.remove_expense(&ExpenseId::new(id.as_str())) {
                Ok(Rendered::message(format!("Removed expense {}", id)))
            } else {
                Err(not_found("expense", &id))
            }
        }
        ExpenseCommand::List(args) => list_expenses(store, args),
        ExpenseCommand::Show { id } => {
            let expense = store
                .expense_by_id(&ExpenseId::new(id.as_str()))
                .ok_or_else(|| not_found("expense", &id))?;
            Ok(Rendered::new(expense_line(&expense), to_json(&expense)))
        }
    }
}

fn list_expenses(store: &BudgetStore, args: ListArgs) -> Result<Rendered> {
    let user_id = resolve_user(store, args.user)?;
    let base = match args.month {
        Some((year, month)) => store.expenses_by_month(&user_id, year, month),
        None => store.user_expenses(&user_id),
    };

    let mut shown = search_expenses(&base, args.search.as_deref().unwrap_or_default());
    sort_expenses(&mut shown, args.sort);
    let page = paginate(&shown, args.page, args.per_page);

    let mut text = lines(&page.items, expense_line, "No expenses");
    if page.total_items > 0 {
        text.push_str(&format!(
            "\nPage {} of {} ({} expenses)",
            page.page, page.total_pages, page.total_items
        ));
    }
    Ok(Rendered::new(text, to_json(&page)))
}

// ============================================================================
// Users
// ============================================================================

fn user(store: &BudgetStore, command: UserCommand) -> Result<Rendered> {
    match command {
        UserCommand::Add(args) => add_user(store, args),
        UserCommand::Update(args) => update_user(store, args),
        UserCommand::Delete { id } => {
            if store.delete_user(&UserId::new(id.as_str())) {
                Ok(Rendered::message(format!("Deleted user {}", id)))
            } else {
                Err(not_found("user", &id))
            }
        }
        UserCommand::List => {
            let users: Vec<_> = store
                .all_users()
                .iter()
                .map(|user| user.without_credentials())
                .collect();
            Ok(Rendered::new(
                lines(&users, user_line, "No users"),
                to_json(&users),
            ))
        }
    }
}

fn add_user(store: &BudgetStore, args: UserAddArgs) -> Result<Rendered> {
    let user = store
        .add_user(NewUser {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            role: args.role,
            password: args.password,
            budget_limit: args.budget_limit,
        })?
        .without_credentials();
    Ok(Rendered::new(
        format!("Added user {}", user.id),
        to_json(&user),
    ))
}

fn update_user(store: &BudgetStore, args: UserUpdateArgs) -> Result<Rendered> {
    let update = UserUpdate {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone: args.phone,
        role: args.role,
        budget_limit: args.budget_limit,
    };
    if update.is_empty() {
        return Err(BudgetError::invalid_input("Nothing to update"));
    }

    let user = store
        .update_user(&UserId::new(args.id.as_str()), update)?
        .ok_or_else(|| not_found("user", &args.id))?
        .without_credentials();
    Ok(Rendered::new(user_line(&user), to_json(&user)))
}

// ============================================================================
// Reports
// ============================================================================

fn report(store: &BudgetStore, command: ReportCommand, now: DateTime<Utc>) -> Result<Rendered> {
    let current = (now.year(), now.month());
    match command {
        ReportCommand::Month { user, month } => {
            let user_id = resolve_user(store, user)?;
            let (year, month) = month.unwrap_or(current);
            Ok(month_report(store, &user_id, year, month))
        }
        ReportCommand::Series { user, end, range } => {
            let user_id = resolve_user(store, user)?;
            let (end_year, end_month) = end.unwrap_or(current);
            Ok(series_report(store, &user_id, end_year, end_month, range))
        }
    }
}

fn month_report(store: &BudgetStore, user_id: &UserId, year: i32, month: u32) -> Rendered {
    let total = store.monthly_total(user_id, year, month);
    let limit = store.budget_limit(user_id);
    let over_budget = store.is_over_budget(user_id, year, month);
    let progress = store.budget_progress(user_id, year, month);

    let status = if over_budget { "over budget" } else { "within budget" };
    let text = format!(
        "{:04}-{:02}\nSpent:    {:.2}\nLimit:    {:.2}\nProgress: {:.0}% ({})",
        year, month, total, limit, progress, status
    );
    Rendered::new(
        text,
        json!({
            "userId": user_id,
            "year": year,
            "month": month,
            "total": total,
            "budgetLimit": limit,
            "isOverBudget": over_budget,
            "budgetProgress": progress,
        }),
    )
}

fn series_report(
    store: &BudgetStore,
    user_id: &UserId,
    end_year: i32,
    end_month: u32,
    range: ReportRange,
) -> Rendered {
    let points = store.monthly_series(user_id, end_year, end_month, range);
    let text = lines(
        &points,
        |point| format!("{} {:04}  {:>10.2}", point.label, point.year, point.total),
        "No data",
    );
    Rendered::new(text, to_json(&points))
}
