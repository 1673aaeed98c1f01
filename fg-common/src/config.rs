//! Configuration loading for FiscalGuard services
//!
//! Resolution priority for the config file path:
//! 1. Command-line argument (highest priority)
//! 2. `FG_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/fiscalguard/config.toml`)
//! 4. Compiled defaults (no file)
//!
//! Secrets may additionally be overridden by environment variables so that
//! credentials never need to live in the TOML file.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Top-level configuration shared by both services
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub directory: DirectoryConfig,
    pub dashboard: DashboardConfig,
}

/// Directory service (fg-dir) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Bind address for the HTTP server
    pub bind: String,
    /// SQLite database path; defaults to the platform data directory
    pub database_path: Option<PathBuf>,
    /// Gemini API key; empty disables AI import and geocoding
    pub gemini_api_key: String,
    /// Accepted admin passwords
    pub admin_passwords: Vec<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5810".to_string(),
            database_path: None,
            gemini_api_key: String::new(),
            admin_passwords: Vec::new(),
        }
    }
}

/// Dashboard service (fg-dash) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Bind address for the HTTP server
    pub bind: String,
    /// ERP connection parameters
    pub erp: ErpConfig,
    /// Optional monthly sales targets workbook (.xlsx)
    pub goals_path: Option<PathBuf>,
    /// Time-to-live for memoized ERP reads, in seconds
    pub cache_ttl_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5811".to_string(),
            erp: ErpConfig::default(),
            goals_path: None,
            cache_ttl_secs: 300,
        }
    }
}

/// ERP (Odoo JSON-RPC) connection parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErpConfig {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
    pub company_id: i64,
}

impl Config {
    /// Load configuration with the standard resolution order
    pub fn load(cli_path: Option<&Path>) -> Result<Config> {
        let mut config = match resolve_config_path(cli_path) {
            Some(path) => {
                info!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Overlay environment variables onto the loaded configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("FG_DIR_BIND") {
            self.directory.bind = v;
        }
        if let Ok(v) = std::env::var("FG_DIR_DATABASE") {
            self.directory.database_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("FG_GEMINI_API_KEY") {
            self.directory.gemini_api_key = v;
        }
        if let Ok(v) = std::env::var("FG_ADMIN_PASSWORD") {
            if !self.directory.admin_passwords.contains(&v) {
                self.directory.admin_passwords.push(v);
            }
        }
        if let Ok(v) = std::env::var("FG_DASH_BIND") {
            self.dashboard.bind = v;
        }
        if let Ok(v) = std::env::var("FG_ERP_URL") {
            self.dashboard.erp.url = v;
        }
        if let Ok(v) = std::env::var("FG_ERP_DB") {
            self.dashboard.erp.db = v;
        }
        if let Ok(v) = std::env::var("FG_ERP_USER") {
            self.dashboard.erp.username = v;
        }
        if let Ok(v) = std::env::var("FG_ERP_PASSWORD") {
            self.dashboard.erp.password = v;
        }
        if let Ok(v) = std::env::var("FG_ERP_COMPANY_ID") {
            match v.parse::<i64>() {
                Ok(id) => self.dashboard.erp.company_id = id,
                Err(_) => warn!("Ignoring non-numeric FG_ERP_COMPANY_ID: {}", v),
            }
        }
        if let Ok(v) = std::env::var("FG_GOALS_PATH") {
            self.dashboard.goals_path = Some(PathBuf::from(v));
        }
    }

    /// Directory database path, falling back to the platform data directory
    pub fn directory_database_path(&self) -> PathBuf {
        self.directory
            .database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Resolve the config file path, returning None when no file exists
fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("FG_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let default = dirs::config_dir()?.join("fiscalguard").join("config.toml");
    if default.exists() {
        Some(default)
    } else {
        None
    }
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fiscalguard"))
        .unwrap_or_else(|| PathBuf::from("./fiscalguard_data"))
        .join("fiscalguard.db")
}
