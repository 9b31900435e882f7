//! Budget Tracker - State Store
//!
//! Normalized client-side state for the budget tracker.
//!
//! This crate provides:
//! - Entity store (users and expenses, insertion ordered)
//! - Auth session (signup, login, logout, mocked password reset)
//! - UI ephemeral state (selected date, report range, toast queue)
//! - Derived view selectors (monthly filters, totals, budget checks)
//! - Persistence gateway (per-slice blobs, background writer)
//!
//! # Architecture
//!
//! [`BudgetStore`] owns every slice. Commands are applied one at a time and
//! each hands the slices it touched to the [`PersistenceGateway`]; the
//! write happens on a background thread. Storage and credential hashing
//! are plugged in through the `SliceStorage` and `CredentialVerifier`
//! traits from `budget-core`.
//!
//! # Example
//!
//! ```rust
//! use budget_core::types::Credentials;
//! use budget_store::{BudgetStore, StoreOptions};
//!
//! let store = BudgetStore::in_memory(StoreOptions::default()).unwrap();
//! let result = store.login(Credentials::new("nobody@example.com", "secret1"));
//! assert!(result.is_err());
//! assert!(!store.is_authenticated());
//! ```

#![forbid(unsafe_code)]

pub mod auth;
pub mod credentials;
pub mod dates;
pub mod entities;
pub mod listing;
pub mod persistence;
pub mod seed;
pub mod selectors;
pub mod storage;
pub mod store;
pub mod ui;

pub use auth::{AuthSession, PersistedAuth};
pub use credentials::{BcryptVerifier, HasherKind, Sha256Verifier, DEFAULT_BCRYPT_COST};
pub use entities::EntityStore;
pub use listing::{paginate, search_expenses, sort_expenses, ExpenseSort, Page, DEFAULT_PAGE_SIZE};
pub use persistence::{PersistenceGateway, RestoredState, Slice, SliceLoad, PERSIST_VERSION};
pub use selectors::{CacheStats, MonthlyPoint, SelectorCache};
pub use storage::{FileStorage, MemoryStorage};
pub use store::{AppState, BudgetStore, StoreOptions};
pub use ui::UiState;
