/// CLI configuration
use anyhow::{bail, Context, Result};
use budget_core::types::DEFAULT_TOAST_DURATION_MS;
use budget_store::{HasherKind, StoreOptions, DEFAULT_BCRYPT_COST};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "budget.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_budget")]
    pub budget: BudgetSettings,

    #[serde(default = "default_ui")]
    pub ui: UiSettings,

    /// Seed the demo users into an empty users slice
    #[serde(default)]
    pub seed_demo_users: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherName {
    Sha256,
    Bcrypt,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default = "default_hasher")]
    pub hasher: HasherName,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BudgetSettings {
    /// Monthly limit for users without their own
    #[serde(default)]
    pub default_limit: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiSettings {
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default `budget.toml` is optional.
    /// `BUDGET_` variables override file values, with `__` between
    /// sections (`BUDGET_STORAGE__DATA_DIR`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = match path {
            Some(path) => settings.add_source(config::File::from(path).required(true)),
            None => settings
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false)),
        };

        settings = settings.add_source(
            config::Environment::with_prefix("BUDGET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.as_os_str().is_empty() {
            bail!("storage.data_dir must not be empty");
        }

        if self.auth.hasher == HasherName::Bcrypt && !(4..=31).contains(&self.auth.bcrypt_cost) {
            bail!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            );
        }

        if !self.budget.default_limit.is_finite() || self.budget.default_limit < 0.0 {
            bail!(
                "budget.default_limit must be a non-negative number, got {}",
                self.budget.default_limit
            );
        }

        if self.ui.toast_duration_ms == 0 {
            bail!("ui.toast_duration_ms must be greater than zero");
        }

        Ok(())
    }

    pub fn hasher_kind(&self) -> HasherKind {
        match self.auth.hasher {
            HasherName::Sha256 => HasherKind::Sha256,
            HasherName::Bcrypt => HasherKind::Bcrypt {
                cost: self.auth.bcrypt_cost,
            },
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            default_budget_limit: self.budget.default_limit,
            toast_duration_ms: self.ui.toast_duration_ms,
            seed_demo_users: self.seed_demo_users,
        }
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        data_dir: default_data_dir(),
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        hasher: default_hasher(),
        bcrypt_cost: default_bcrypt_cost(),
    }
}

fn default_hasher() -> HasherName {
    HasherName::Sha256
}

fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}

fn default_budget() -> BudgetSettings {
    BudgetSettings { default_limit: 0.0 }
}

fn default_ui() -> UiSettings {
    UiSettings {
        toast_duration_ms: default_toast_duration_ms(),
    }
}

fn default_toast_duration_ms() -> u64 {
    DEFAULT_TOAST_DURATION_MS
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            auth: default_auth(),
            budget: default_budget(),
            ui: default_ui(),
            seed_demo_users: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_valid() {
        let config = CliConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(config.hasher_kind(), HasherKind::Sha256);
        assert_eq!(config.store_options(), StoreOptions::default());
    }

    #[test]
    fn loads_partial_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("budget.toml");
        fs::write(
            &path,
            "seed_demo_users = true\n\n[auth]\nhasher = \"bcrypt\"\nbcrypt_cost = 6\n\n[budget]\ndefault_limit = 1200.0\n",
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert!(config.seed_demo_users);
        assert_eq!(config.hasher_kind(), HasherKind::Bcrypt { cost: 6 });
        assert_eq!(config.budget.default_limit, 1200.0);
        assert_eq!(config.ui.toast_duration_ms, DEFAULT_TOAST_DURATION_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = CliConfig::default();
        config.auth.hasher = HasherName::Bcrypt;
        config.auth.bcrypt_cost = 2;
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.budget.default_limit = -1.0;
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.ui.toast_duration_ms = 0;
        assert!(config.validate().is_err());
    }
}
