//! Budget store
//!
//! The single state container behind the application. Commands are
//! serialized: each one runs to completion (including its persistence
//! hand-off) before the next begins. Queries read a consistent snapshot
//! and may run concurrently with each other.
//!
//! # Example
//!
//! ```rust
//! use budget_core::types::{NewExpense, SignUp};
//! use budget_store::{BudgetStore, StoreOptions};
//!
//! let store = BudgetStore::in_memory(StoreOptions::default()).unwrap();
//! let user = store
//!     .sign_up(SignUp {
//!         first_name: "Ada".into(),
//!         last_name: "Lovelace".into(),
//!         email: "ada@example.com".into(),
//!         password: "secret1".into(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! store
//!     .add_expense(NewExpense {
//!         user_id: user.id.clone(),
//!         name: "Coffee".into(),
//!         amount: 3.5,
//!         date_iso: "2024-03-05T00:00:00Z".into(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(store.monthly_total(&user.id, 2024, 3), 3.5);
//! ```

use crate::auth::AuthSession;
use crate::credentials::Sha256Verifier;
use crate::entities::EntityStore;
use crate::persistence::{self, PersistenceGateway, Slice, SliceLoad};
use crate::selectors::{self, CacheStats, MonthlyPoint, SelectorCache};
use crate::seed;
use crate::storage::MemoryStorage;
use crate::ui::UiState;
use budget_core::error::{BudgetError, Result};
use budget_core::traits::{CredentialVerifier, SliceStorage};
use budget_core::types::{
    AuthStatus, Credentials, Expense, ExpenseId, ExpenseUpdate, NewExpense, NewToast, NewUser,
    ReportRange, ResetConfirmation, SignUp, Toast, ToastId, User, UserId, UserUpdate,
    DEFAULT_TOAST_DURATION_MS,
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info, warn};

/// Behaviour knobs for a [`BudgetStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Monthly limit for users without their own
    pub default_budget_limit: f64,
    /// Lifetime of toasts that do not set one
    pub toast_duration_ms: u64,
    /// Seed the demo users when no users slice is stored
    pub seed_demo_users: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            default_budget_limit: 0.0,
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            seed_demo_users: false,
        }
    }
}

/// Every slice of application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub entities: EntityStore,
    pub auth: AuthSession,
    pub ui: UiState,
}

/// Application state container
pub struct BudgetStore {
    state: RwLock<AppState>,
    commands: Mutex<()>,
    cache: Mutex<SelectorCache>,
    verifier: Arc<dyn CredentialVerifier>,
    gateway: PersistenceGateway,
    options: StoreOptions,
}

impl BudgetStore {
    /// Rehydrate from `storage` and start the persistence writer
    ///
    /// Slices that are missing or unreadable start from their defaults.
    ///
    /// # Errors
    /// Returns an error if the persistence writer cannot be started
    pub fn open(
        storage: Arc<dyn SliceStorage>,
        verifier: Arc<dyn CredentialVerifier>,
        options: StoreOptions,
    ) -> Result<Self> {
        let restored = persistence::restore(storage.as_ref());
        let now = Utc::now();

        let mut seeded = false;
        let users = match restored.users {
            SliceLoad::Loaded(users) => users,
            SliceLoad::Missing if options.seed_demo_users => {
                seeded = true;
                seed::demo_users(now)
            }
            SliceLoad::Missing | SliceLoad::Discarded => Vec::new(),
        };
        let expenses = restored.expenses.loaded().unwrap_or_default();
        let auth = restored
            .auth
            .loaded()
            .map(AuthSession::restore)
            .unwrap_or_default();

        let state = AppState {
            entities: EntityStore::from_parts(users, expenses),
            auth,
            ui: UiState::new(now, options.toast_duration_ms),
        };
        info!(
            users = state.entities.users().len(),
            expenses = state.entities.expenses().len(),
            authenticated = state.auth.is_authenticated(),
            verifier = verifier.name(),
            "budget store opened"
        );

        let gateway = PersistenceGateway::start(storage)?;
        let store = Self {
            state: RwLock::new(state),
            commands: Mutex::new(()),
            cache: Mutex::new(SelectorCache::new()),
            verifier,
            gateway,
            options,
        };

        if seeded {
            info!("seeded demo users");
            store.persist(&store.read_state(), &[Slice::Users]);
        }
        Ok(store)
    }

    /// Store over fresh in-memory storage with SHA-256 digests
    ///
    /// # Errors
    /// Returns an error if the persistence writer cannot be started
    pub fn in_memory(options: StoreOptions) -> Result<Self> {
        Self::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(Sha256Verifier),
            options,
        )
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn command_guard(&self) -> MutexGuard<'_, ()> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache(&self) -> MutexGuard<'_, SelectorCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand the current contents of `slices` to the writer
    fn persist(&self, state: &AppState, slices: &[Slice]) {
        for &slice in slices {
            let encoded = match slice {
                Slice::Auth => persistence::encode_auth(&state.auth.to_persisted()),
                Slice::Expenses => persistence::encode_expenses(state.entities.expenses()),
                Slice::Users => persistence::encode_users(state.entities.users()),
            };
            match encoded {
                Ok(body) => {
                    self.gateway.write(slice, body);
                }
                Err(e) => error!(slice = %slice, error = %e, "failed to encode slice"),
            }
        }
    }

    /// Record an auth failure and hand `err` back
    fn fail_auth(&self, err: BudgetError) -> BudgetError {
        let mut state = self.write_state();
        state.auth.fail(err.to_string());
        self.persist(&state, &[Slice::Auth]);
        err
    }

    // ========================================================================
    // Auth commands
    // ========================================================================

    /// Register a new account and sign it in
    ///
    /// # Errors
    /// `EmailExists` if the email is taken, `InvalidInput` for bad fields
    pub fn sign_up(&self, form: SignUp) -> Result<User> {
        let _command = self.command_guard();

        let precheck = {
            let mut state = self.write_state();
            state.auth.begin();
            form.validate().and_then(|()| {
                if state.entities.contains_email(&form.email) {
                    Err(BudgetError::EmailExists(form.email.trim().to_string()))
                } else {
                    Ok(())
                }
            })
        };
        if let Err(e) = precheck {
            return Err(self.fail_auth(e));
        }

        let digest = match self.verifier.digest(&form.password) {
            Ok(digest) => digest,
            Err(e) => return Err(self.fail_auth(e)),
        };

        let mut state = self.write_state();
        match state
            .entities
            .add_user(form.to_new_user(), Some(digest), Utc::now())
        {
            Ok(user) => {
                state.auth.succeed(&user);
                self.persist(&state, &[Slice::Users, Slice::Auth]);
                Ok(user.without_credentials())
            }
            Err(e) => {
                let e = match e {
                    BudgetError::DuplicateEmail(email) => BudgetError::EmailExists(email),
                    other => other,
                };
                state.auth.fail(e.to_string());
                self.persist(&state, &[Slice::Auth]);
                Err(e)
            }
        }
    }

    /// Sign in with email and password
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email, an account without a
    /// password, or a digest mismatch
    pub fn login(&self, credentials: Credentials) -> Result<User> {
        let _command = self.command_guard();

        let candidate = {
            let mut state = self.write_state();
            state.auth.begin();
            state.entities.user_by_email(&credentials.email).cloned()
        };

        let Some(user) = candidate else {
            return Err(self.fail_auth(BudgetError::InvalidCredentials));
        };
        let Some(digest) = user.password_hash.as_deref() else {
            return Err(self.fail_auth(BudgetError::InvalidCredentials));
        };

        let matches = self
            .verifier
            .verify(&credentials.password, digest)
            .unwrap_or_else(|e| {
                warn!(user_id = %user.id, error = %e, "stored digest could not be checked");
                false
            });
        if !matches {
            return Err(self.fail_auth(BudgetError::InvalidCredentials));
        }

        let mut state = self.write_state();
        state.auth.succeed(&user);
        self.persist(&state, &[Slice::Auth]);
        Ok(user.without_credentials())
    }

    /// End the session; stored slices are kept
    pub fn logout(&self) {
        let _command = self.command_guard();
        let mut state = self.write_state();
        state.auth.logout();
        self.persist(&state, &[Slice::Auth]);
    }

    /// Mock password reset; nothing is mutated
    ///
    /// # Errors
    /// `AccountNotFound` if no user has `email`
    pub fn forgot_password(&self, email: &str) -> Result<ResetConfirmation> {
        let state = self.read_state();
        if state.entities.contains_email(email) {
            info!("password reset requested");
            Ok(ResetConfirmation::sent())
        } else {
            Err(BudgetError::AccountNotFound(email.trim().to_string()))
        }
    }

    /// Dismiss the last auth error
    pub fn clear_auth_error(&self) {
        let _command = self.command_guard();
        self.write_state().auth.clear_error();
    }

    // ========================================================================
    // User commands
    // ========================================================================

    /// Create a user from the management surface
    ///
    /// # Errors
    /// `DuplicateEmail` if the email is taken, `InvalidInput` for bad fields
    pub fn add_user(&self, data: NewUser) -> Result<User> {
        let _command = self.command_guard();
        data.validate()?;

        if self.read_state().entities.contains_email(&data.email) {
            return Err(BudgetError::DuplicateEmail(data.email.trim().to_string()));
        }
        let password_hash = data
            .password
            .as_deref()
            .map(|password| self.verifier.digest(password))
            .transpose()?;

        let mut state = self.write_state();
        let user = state.entities.add_user(data, password_hash, Utc::now())?;
        self.persist(&state, &[Slice::Users]);
        Ok(user)
    }

    /// Merge `update` into a user; `Ok(None)` if there is no such user
    ///
    /// The session copy of a signed-in user is not touched.
    pub fn update_user(&self, id: &UserId, update: UserUpdate) -> Result<Option<User>> {
        let _command = self.command_guard();
        update.validate()?;

        let mut state = self.write_state();
        let updated = state.entities.update_user(id, &update);
        if updated.is_some() {
            self.persist(&state, &[Slice::Users]);
        }
        Ok(updated)
    }

    /// Remove a user; their expenses stay
    pub fn delete_user(&self, id: &UserId) -> bool {
        let _command = self.command_guard();
        let mut state = self.write_state();
        let removed = state.entities.delete_user(id);
        if removed {
            self.persist(&state, &[Slice::Users]);
        }
        removed
    }

    // ========================================================================
    // Expense commands
    // ========================================================================

    /// Record an expense
    ///
    /// # Errors
    /// `InvalidAmount` for a negative or non-finite amount, `InvalidInput`
    /// for an empty name or unparseable date
    pub fn add_expense(&self, data: NewExpense) -> Result<Expense> {
        let _command = self.command_guard();
        let mut state = self.write_state();
        let expense = state.entities.add_expense(data)?;
        self.persist(&state, &[Slice::Expenses]);
        Ok(expense)
    }

    /// Merge `update` into an expense; `Ok(None)` if there is no such expense
    pub fn update_expense(&self, id: &ExpenseId, update: ExpenseUpdate) -> Result<Option<Expense>> {
        let _command = self.command_guard();
        let mut state = self.write_state();
        let updated = state.entities.update_expense(id, &update)?;
        if updated.is_some() {
            self.persist(&state, &[Slice::Expenses]);
        }
        Ok(updated)
    }

    pub fn remove_expense(&self, id: &ExpenseId) -> bool {
        let _command = self.command_guard();
        let mut state = self.write_state();
        let removed = state.entities.remove_expense(id);
        if removed {
            self.persist(&state, &[Slice::Expenses]);
        }
        removed
    }

    // ========================================================================
    // UI commands (never persisted)
    // ========================================================================

    pub fn set_selected_date(&self, date_iso: impl Into<String>) {
        let _command = self.command_guard();
        self.write_state().ui.set_selected_date(date_iso);
    }

    pub fn set_report_range(&self, range: ReportRange) {
        let _command = self.command_guard();
        self.write_state().ui.set_report_range(range);
    }

    pub fn add_toast(&self, toast: NewToast) -> ToastId {
        let _command = self.command_guard();
        self.write_state().ui.add_toast(toast, Utc::now())
    }

    pub fn remove_toast(&self, id: &ToastId) -> bool {
        let _command = self.command_guard();
        self.write_state().ui.remove_toast(id)
    }

    pub fn clear_toasts(&self) {
        let _command = self.command_guard();
        self.write_state().ui.clear_toasts();
    }

    /// Drop toasts that have outlived their duration at `now`
    pub fn expire_toasts(&self, now: DateTime<Utc>) -> usize {
        let _command = self.command_guard();
        self.write_state().ui.expire_toasts(now)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn all_users(&self) -> Vec<User> {
        self.read_state().entities.users().to_vec()
    }

    pub fn all_expenses(&self) -> Vec<Expense> {
        self.read_state().entities.expenses().to_vec()
    }

    pub fn user_by_id(&self, id: &UserId) -> Option<User> {
        self.read_state().entities.user_by_id(id).cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.read_state().entities.user_by_email(email).cloned()
    }

    /// Signed-in user, without credentials
    pub fn current_user(&self) -> Option<User> {
        self.read_state().auth.user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().auth.is_authenticated()
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.read_state().auth.status()
    }

    pub fn auth_error(&self) -> Option<String> {
        self.read_state().auth.error().map(str::to_string)
    }

    pub fn is_auth_loading(&self) -> bool {
        self.read_state().auth.is_loading()
    }

    /// Expenses of `user_id` in the given month, memoized per collection version
    pub fn expenses_by_month(&self, user_id: &UserId, year: i32, month: u32) -> Arc<Vec<Expense>> {
        let state = self.read_state();
        self.cache().expenses_by_month(
            state.entities.expenses_version(),
            state.entities.expenses(),
            user_id,
            year,
            month,
        )
    }

    /// All expenses of `user_id`, memoized per collection version
    pub fn user_expenses(&self, user_id: &UserId) -> Arc<Vec<Expense>> {
        let state = self.read_state();
        self.cache().user_expenses(
            state.entities.expenses_version(),
            state.entities.expenses(),
            user_id,
        )
    }

    pub fn expense_by_id(&self, id: &ExpenseId) -> Option<Expense> {
        selectors::expense_by_id(self.read_state().entities.expenses(), id).cloned()
    }

    pub fn monthly_total(&self, user_id: &UserId, year: i32, month: u32) -> f64 {
        selectors::monthly_total(&self.expenses_by_month(user_id, year, month))
    }

    /// The user's own limit, else the configured default
    pub fn budget_limit(&self, user_id: &UserId) -> f64 {
        let state = self.read_state();
        state
            .entities
            .user_by_id(user_id)
            .or_else(|| state.auth.user().filter(|user| &user.id == user_id))
            .and_then(|user| user.budget_limit)
            .unwrap_or(self.options.default_budget_limit)
    }

    pub fn is_over_budget(&self, user_id: &UserId, year: i32, month: u32) -> bool {
        selectors::is_over_budget(
            self.monthly_total(user_id, year, month),
            self.budget_limit(user_id),
        )
    }

    /// Percentage of the monthly budget spent, `0..=100`
    pub fn budget_progress(&self, user_id: &UserId, year: i32, month: u32) -> f64 {
        selectors::budget_progress(
            self.monthly_total(user_id, year, month),
            self.budget_limit(user_id),
        )
    }

    pub fn monthly_series(
        &self,
        user_id: &UserId,
        end_year: i32,
        end_month: u32,
        range: ReportRange,
    ) -> Vec<MonthlyPoint> {
        selectors::monthly_series(
            self.read_state().entities.expenses(),
            user_id,
            end_year,
            end_month,
            range,
        )
    }

    pub fn selected_date(&self) -> String {
        self.read_state().ui.selected_date_iso.clone()
    }

    pub fn report_range(&self) -> ReportRange {
        self.read_state().ui.report_range
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.read_state().ui.toasts.clone()
    }

    /// Copy of the whole state
    pub fn snapshot(&self) -> AppState {
        self.read_state().clone()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    // ========================================================================
    // Persistence control
    // ========================================================================

    /// Block until every queued write has reached storage
    pub fn flush(&self) {
        self.gateway.flush();
    }

    /// Remove every persisted slice; in-memory state is untouched
    pub fn purge_persisted(&self) {
        let _command = self.command_guard();
        info!("purging persisted state");
        self.gateway.purge();
    }
}
