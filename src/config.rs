use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CONFIG_FILE: &str = "config.json";
pub const DB_FILE: &str = "monthbook.db";
pub const DEFAULT_LOG_FILTER: &str = "monthbook=info";

pub const ENV_DB: &str = "MONTHBOOK_DB";
pub const ENV_USER: &str = "MONTHBOOK_USER";

/// Settings for the command-line front end, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub db_path: PathBuf,
    /// Acting user for every ledger call made by this install.
    pub user_id: Uuid,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Config {
    /// A first-run config with a new user id and the database under `data_dir`.
    pub fn fresh(data_dir: &Path) -> Self {
        Self {
            db_path: data_dir.join(DB_FILE),
            user_id: Uuid::new_v4(),
            log_filter: default_log_filter(),
        }
    }

    /// Reads `path`, writing a fresh config there first if it does not exist.
    pub fn load_or_create(path: &Path, data_dir: &Path) -> Result<Self> {
        if path.exists() {
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            return serde_json::from_str(&data)
                .with_context(|| format!("Invalid config file: {}", path.display()));
        }
        let config = Self::fresh(data_dir);
        config.save(path)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write config: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace config: {}", path.display()))?;
        Ok(())
    }

    /// Applies `MONTHBOOK_DB` / `MONTHBOOK_USER` style overrides. A user value
    /// that is not a UUID is an error rather than silently ignored.
    pub fn with_overrides(mut self, db: Option<&str>, user: Option<&str>) -> Result<Self> {
        if let Some(db) = db.map(str::trim).filter(|d| !d.is_empty()) {
            self.db_path = PathBuf::from(db);
        }
        if let Some(user) = user.map(str::trim).filter(|u| !u.is_empty()) {
            self.user_id = Uuid::parse_str(user)
                .with_context(|| format!("{ENV_USER} is not a valid UUID: {user}"))?;
        }
        Ok(self)
    }

    /// Loads the per-user config from the platform config directory and
    /// applies environment overrides.
    pub fn resolve() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "monthbook", "Monthbook")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        let data_dir = proj_dirs.data_dir();
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let path = proj_dirs.config_dir().join(CONFIG_FILE);
        let db = std::env::var(ENV_DB).ok();
        let user = std::env::var(ENV_USER).ok();
        Self::load_or_create(&path, data_dir)?.with_overrides(db.as_deref(), user.as_deref())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
