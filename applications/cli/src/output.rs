//! Text and JSON rendering of command results
use budget_core::{BudgetError, Expense, User};
use serde::Serialize;
use serde_json::{json, Value};

/// A command result in both output formats
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub json: Value,
}

impl Rendered {
    pub fn new(text: impl Into<String>, json: Value) -> Self {
        Self {
            text: text.into(),
            json,
        }
    }

    /// Plain message; JSON form is `{"message": ...}`
    pub fn message(text: impl Into<String>) -> Self {
        let text = text.into();
        let json = json!({ "message": text });
        Self { text, json }
    }

    pub fn render(&self, as_json: bool) -> String {
        if as_json {
            serde_json::to_string_pretty(&self.json).unwrap_or_else(|_| self.json.to_string())
        } else {
            self.text.clone()
        }
    }
}

/// `kind: message`, or the serialized failure in JSON mode
pub fn render_failure(err: &BudgetError, as_json: bool) -> String {
    let failure = err.to_failure();
    if as_json {
        to_json(&failure).to_string()
    } else {
        format!("{}: {}", failure.kind, failure.message)
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

pub fn user_line(user: &User) -> String {
    format!(
        "{}  {:<24} {:<32} {}",
        user.id,
        user.full_name(),
        user.email,
        user.role
    )
}

pub fn expense_line(expense: &Expense) -> String {
    format!(
        "{}  {:<25} {:<24} {:>10.2}",
        expense.id, expense.date_iso, expense.name, expense.amount
    )
}

/// One line per item, or `empty` when there are none
pub fn lines<T>(items: &[T], line: impl Fn(&T) -> String, empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}
