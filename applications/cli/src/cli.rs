//! Command-line surface
use budget_core::types::{parse_amount, ReportRange, Role};
use budget_store::ExpenseSort;
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "budget")]
#[command(about = "Track expenses against a monthly budget", long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./budget.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory from the configuration
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Signup(SignupArgs),
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Request a password reset link
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Manage expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Spending reports
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(short, long)]
    pub password: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    /// Monthly budget limit
    #[arg(long, value_parser = parse_money)]
    pub budget_limit: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    /// Record an expense
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, value_parser = parse_money)]
        amount: f64,
        /// Date or timestamp (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Owner (defaults to the signed-in user)
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Change fields of an expense
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, value_parser = parse_money)]
        amount: Option<f64>,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete an expense
    Remove { id: String },
    /// List expenses
    List(ListArgs),
    /// Show one expense
    Show { id: String },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Owner (defaults to the signed-in user)
    #[arg(short, long)]
    pub user: Option<String>,
    /// Only this month (YYYY-MM)
    #[arg(short, long, value_parser = parse_month)]
    pub month: Option<(i32, u32)>,
    /// Case-insensitive name filter
    #[arg(short, long)]
    pub search: Option<String>,
    /// none, name, amount or date
    #[arg(long, default_value = "none", value_parser = parse_sort)]
    pub sort: ExpenseSort,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long, default_value_t = budget_store::DEFAULT_PAGE_SIZE)]
    pub per_page: usize,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Add(UserAddArgs),
    /// Change fields of a user
    Update(UserUpdateArgs),
    /// Delete a user (their expenses are kept)
    Delete { id: String },
    /// List users
    List,
}

#[derive(Debug, Args)]
pub struct UserAddArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "user", value_parser = parse_role)]
    pub role: Role,
    #[arg(short, long)]
    pub password: Option<String>,
    #[arg(long, value_parser = parse_money)]
    pub budget_limit: Option<f64>,
}

#[derive(Debug, Args)]
pub struct UserUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(short, long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, value_parser = parse_role)]
    pub role: Option<Role>,
    #[arg(long, value_parser = parse_money)]
    pub budget_limit: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Total, limit and budget status for one month
    Month {
        #[arg(short, long)]
        user: Option<String>,
        /// YYYY-MM (defaults to the current month)
        #[arg(short, long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
    },
    /// Monthly totals over a range
    Series {
        #[arg(short, long)]
        user: Option<String>,
        /// Last month of the series, YYYY-MM (defaults to the current month)
        #[arg(short, long, value_parser = parse_month)]
        end: Option<(i32, u32)>,
        /// 1m, 6m or 12m
        #[arg(short, long, default_value = "6m", value_parser = parse_range)]
        range: ReportRange,
    },
}

fn parse_money(s: &str) -> Result<f64, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::from_str(s).ok_or_else(|| format!("unknown role '{}'", s))
}

fn parse_sort(s: &str) -> Result<ExpenseSort, String> {
    ExpenseSort::from_str(&s.to_ascii_lowercase()).ok_or_else(|| format!("unknown sort '{}'", s))
}

fn parse_range(s: &str) -> Result<ReportRange, String> {
    ReportRange::from_str(s).ok_or_else(|| format!("unknown range '{}' (use 1m, 6m or 12m)", s))
}

/// Parse `YYYY-MM`; the year must be one chrono can represent
pub fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("expected YYYY-MM, got '{}'", s);
    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    let years = NaiveDate::MIN.year()..=NaiveDate::MAX.year();
    if !years.contains(&year) {
        return Err(format!(
            "year {} is outside {}..={}",
            year,
            years.start(),
            years.end()
        ));
    }
    Ok((year, month))
}
