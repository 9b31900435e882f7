//! Caller-side list shaping: search, sort, paginate

use budget_core::types::Expense;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default page size of the expenses table
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Sort order for an expense listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseSort {
    /// Insertion order
    #[default]
    None,
    /// Name, A to Z
    Name,
    /// Amount, largest first
    Amount,
    /// Date, newest first
    Date,
}

impl ExpenseSort {
    /// Parse from string ("all" is an alias of `None`)
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" | "all" => Some(Self::None),
            "name" => Some(Self::Name),
            "amount" => Some(Self::Amount),
            "date" => Some(Self::Date),
            _ => None,
        }
    }
}

/// Case-insensitive substring match on the name; empty term keeps all
pub fn search_expenses(expenses: &[Expense], term: &str) -> Vec<Expense> {
    let needle = term.trim().to_lowercase();
    expenses
        .iter()
        .filter(|expense| needle.is_empty() || expense.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Stable sort by `order`
pub fn sort_expenses(expenses: &mut [Expense], order: ExpenseSort) {
    match order {
        ExpenseSort::None => {}
        ExpenseSort::Name => {
            expenses.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        ExpenseSort::Amount => {
            expenses.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));
        }
        ExpenseSort::Date => {
            // Unparseable dates sort last
            expenses.sort_by(|a, b| match (a.timestamp(), b.timestamp()) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out 1-based `page` of `per_page` items
///
/// Page numbers are clamped into `1..=total_pages`; a zero `per_page`
/// falls back to [`DEFAULT_PAGE_SIZE`].
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        per_page
    };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);

    Page {
        items: items.get(start..end).unwrap_or_default().to_vec(),
        page,
        total_pages,
        total_items,
    }
}
