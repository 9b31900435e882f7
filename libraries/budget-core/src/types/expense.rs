/// Expense domain types
use crate::error::{BudgetError, Result};
use crate::types::{ExpenseId, UserId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded expense
///
/// `user_id` is a weak reference: the user may have been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,

    pub user_id: UserId,

    pub name: String,

    pub amount: f64,

    /// ISO-8601 timestamp
    #[serde(rename = "dateISO")]
    pub date_iso: String,
}

impl Expense {
    /// Parsed timestamp, `None` if `date_iso` is not a recognised format
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date_iso)
    }
}

/// Fields for recording a new expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub user_id: UserId,
    pub name: String,
    pub amount: f64,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
}

impl NewExpense {
    /// Validate name, amount and date
    pub fn validate(&self) -> Result<()> {
        validate_expense_name(&self.name)?;
        validate_amount(self.amount)?;
        validate_date_iso(&self.date_iso)?;
        Ok(())
    }
}

/// Partial update for an expense; `id` and `user_id` are never overwritten
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "dateISO", skip_serializing_if = "Option::is_none")]
    pub date_iso: Option<String>,
}

impl ExpenseUpdate {
    /// Validate the fields that are present
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_expense_name(name)?;
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(date_iso) = &self.date_iso {
            validate_date_iso(date_iso)?;
        }
        Ok(())
    }

    /// Merge present fields into `expense`
    pub fn apply(&self, expense: &mut Expense) {
        if let Some(name) = &self.name {
            expense.name = name.trim().to_string();
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(date_iso) = &self.date_iso {
            expense.date_iso = date_iso.trim().to_string();
        }
    }
}

/// Parse a user-entered amount ("3.50", " 12 ")
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| BudgetError::invalid_amount(format!("'{}' is not a number", trimmed)))?;
    validate_amount(amount)?;
    Ok(amount)
}

/// Amounts must be finite and non-negative
pub fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(BudgetError::invalid_amount(format!(
            "{} is not a finite number",
            amount
        )));
    }
    if amount < 0.0 {
        return Err(BudgetError::invalid_amount(format!(
            "{} is negative",
            amount
        )));
    }
    Ok(())
}

fn validate_expense_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BudgetError::invalid_input("Expense name is required"));
    }
    Ok(())
}

fn validate_date_iso(date_iso: &str) -> Result<()> {
    parse_timestamp(date_iso).map(|_| ()).ok_or_else(|| {
        BudgetError::invalid_input(format!("'{}' is not an ISO-8601 date", date_iso))
    })
}

/// Parse an ISO-8601 timestamp
///
/// Accepts RFC 3339 (`2024-03-05T00:00:00Z`, `...+05:00`), a naive
/// date-time (`2024-03-05T10:30:00`, read as UTC) and a bare date
/// (`2024-03-05`, midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
