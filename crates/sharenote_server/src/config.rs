//! Server configuration loaded from TOML.
//!
//! Every key is optional:
//!
//! ```toml
//! bind = "127.0.0.1:8080"
//! database_path = "sharenote.sqlite3"
//! log_level = "info"
//! log_dir = "/var/log/sharenote"
//!
//! [settings]
//! enable_notes = true
//!
//! [settings.user_permissions.features]
//! notes = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use sharenote_core::{default_log_level, AppSettings, LogTarget};
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_PATH: &str = "sharenote.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub database_path: PathBuf,
    pub log_level: Option<String>,
    /// Rolling log files go here; unset logs to stderr.
    pub log_dir: Option<PathBuf>,
    /// Initial runtime settings. Admins may replace them over HTTP.
    pub settings: AppSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_level: None,
            log_dir: None,
            settings: AppSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Loads `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("failed to parse TOML")
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn log_target(&self) -> LogTarget {
        match &self.log_dir {
            Some(dir) => LogTarget::Directory(dir.clone()),
            None => LogTarget::Stderr,
        }
    }
}
