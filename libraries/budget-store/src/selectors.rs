//! Derived view selectors
//!
//! Pure projections over the expenses collection. None of them reorder:
//! results keep store insertion order. `SelectorCache` memoizes the
//! filtering selectors per collection version.

use crate::dates::{month_bounds, month_label, shift_month};
use budget_core::types::{Expense, ExpenseId, ReportRange, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Expenses of `user_id` dated inside the calendar month
///
/// Every instant from the first of the month through the end of its last
/// day matches. Expenses whose `date_iso` cannot be parsed never match.
pub fn expenses_by_month(
    expenses: &[Expense],
    user_id: &UserId,
    year: i32,
    month: u32,
) -> Vec<Expense> {
    let Some((start, next_start)) = month_bounds(year, month) else {
        return Vec::new();
    };

    expenses
        .iter()
        .filter(|expense| &expense.user_id == user_id)
        .filter(|expense| {
            expense
                .timestamp()
                .is_some_and(|at| start <= at && at < next_start)
        })
        .cloned()
        .collect()
}

/// Sum of amounts; `0.0` for no expenses
pub fn monthly_total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.amount).sum()
}

/// Strictly greater than the limit
pub fn is_over_budget(monthly_total: f64, budget_limit: f64) -> bool {
    monthly_total > budget_limit
}

/// Spent share of the budget as a percentage clamped to `0..=100`
///
/// A non-positive limit yields `0.0`.
pub fn budget_progress(monthly_total: f64, budget_limit: f64) -> f64 {
    if budget_limit <= 0.0 || !budget_limit.is_finite() {
        return 0.0;
    }
    (monthly_total / budget_limit * 100.0).clamp(0.0, 100.0)
}

/// All expenses of `user_id`, any date
pub fn user_expenses(expenses: &[Expense], user_id: &UserId) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| &expense.user_id == user_id)
        .cloned()
        .collect()
}

/// First expense with `id`
pub fn expense_by_id<'a>(expenses: &'a [Expense], id: &ExpenseId) -> Option<&'a Expense> {
    expenses.iter().find(|expense| &expense.id == id)
}

/// One point of the analytics chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total: f64,
}

/// Monthly totals for the `range` months ending at `(end_year, end_month)`
///
/// Oldest month first. Months without expenses report `0.0`; months whose
/// year falls outside `i32` are left out.
pub fn monthly_series(
    expenses: &[Expense],
    user_id: &UserId,
    end_year: i32,
    end_month: u32,
    range: ReportRange,
) -> Vec<MonthlyPoint> {
    let months = range.months() as i32;
    (0..months)
        .rev()
        .filter_map(|back| shift_month(end_year, end_month, -back))
        .map(|(year, month)| {
            let total = monthly_total(&expenses_by_month(expenses, user_id, year, month));
            MonthlyPoint {
                year,
                month,
                label: month_label(month).to_string(),
                total,
            }
        })
        .collect()
}

/// Hit/miss counters for the selector cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

type MonthKey = (UserId, i32, u32);

/// Memo table for the filtering selectors
///
/// Entries are valid for one expenses-collection version only; the first
/// lookup against a newer version drops everything.
#[derive(Debug, Default)]
pub struct SelectorCache {
    version: Option<u64>,
    by_month: HashMap<MonthKey, Arc<Vec<Expense>>>,
    by_user: HashMap<UserId, Arc<Vec<Expense>>>,
    stats: CacheStats,
}

impl SelectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn sync(&mut self, version: u64) {
        if self.version != Some(version) {
            self.by_month.clear();
            self.by_user.clear();
            self.version = Some(version);
        }
    }

    /// Memoized [`expenses_by_month`]
    pub fn expenses_by_month(
        &mut self,
        version: u64,
        expenses: &[Expense],
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Arc<Vec<Expense>> {
        self.sync(version);
        let key = (user_id.clone(), year, month);
        if let Some(hit) = self.by_month.get(&key) {
            self.stats.hits += 1;
            return Arc::clone(hit);
        }
        self.stats.misses += 1;
        let computed = Arc::new(expenses_by_month(expenses, user_id, year, month));
        self.by_month.insert(key, Arc::clone(&computed));
        computed
    }

    /// Memoized [`user_expenses`]
    pub fn user_expenses(
        &mut self,
        version: u64,
        expenses: &[Expense],
        user_id: &UserId,
    ) -> Arc<Vec<Expense>> {
        self.sync(version);
        if let Some(hit) = self.by_user.get(user_id) {
            self.stats.hits += 1;
            return Arc::clone(hit);
        }
        self.stats.misses += 1;
        let computed = Arc::new(user_expenses(expenses, user_id));
        self.by_user.insert(user_id.clone(), Arc::clone(&computed));
        computed
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
