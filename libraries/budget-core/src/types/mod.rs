mod auth;
mod expense;
mod ids;
mod ui;
mod user;

pub use auth::{AuthStatus, Credentials, ResetConfirmation, SignUp};
pub use expense::{
    parse_amount, parse_timestamp, validate_amount, Expense, ExpenseUpdate, NewExpense,
};
pub use ids::{ExpenseId, ToastId, UserId};
pub use ui::{NewToast, ReportRange, Toast, ToastKind, DEFAULT_TOAST_DURATION_MS};
pub use user::{
    validate_email, validate_password, validate_phone, NewUser, Role, User, UserUpdate,
    MIN_PASSWORD_LEN,
};
