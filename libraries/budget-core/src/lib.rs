//! Budget Tracker Core
//!
//! Platform-agnostic domain types, traits, and error handling for the budget
//! tracker.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Expense`, `Toast`, signup/login forms
//! - **Core Traits**: `CredentialVerifier`, `SliceStorage`
//! - **Error Handling**: Unified `BudgetError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use budget_core::types::{parse_amount, NewExpense, UserId};
//!
//! let expense = NewExpense {
//!     user_id: UserId::new("user-1"),
//!     name: "Coffee".to_string(),
//!     amount: parse_amount("3.5").unwrap(),
//!     date_iso: "2024-03-05T00:00:00Z".to_string(),
//! };
//! assert!(expense.validate().is_ok());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{BudgetError, CommandFailure, ErrorKind, Result};
pub use traits::{CredentialVerifier, SliceStorage};

pub use types::{
    // Auth
    AuthStatus, Credentials, ResetConfirmation, SignUp,
    // Entities
    Expense, ExpenseId, ExpenseUpdate, NewExpense, NewUser, Role, User, UserId, UserUpdate,
    // UI
    NewToast, ReportRange, Toast, ToastId, ToastKind,
};
