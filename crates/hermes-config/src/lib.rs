//! Configuration loading for HERMES.
//! Reads hermes.toml from the current directory or the path in HERMES_CONFIG.

pub mod preferences;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub use preferences::{PreferenceStore, SelectionScope, StoredSelection};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Preferences file error: {0}")]
    Preferences(#[from] serde_json::Error),

    #[error("Preferences I/O error: {0}")]
    PreferencesIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub const CONFIG_ENV: &str = "HERMES_CONFIG";
pub const API_BASE_URL_ENV: &str = "HERMES_API_BASE_URL";
pub const BIND_ENV: &str = "HERMES_BIND";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout; unset leaves the HTTP client default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_secs: None }
    }
}

fn default_base_url() -> String { "http://localhost:8000".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), static_dir: default_static_dir() }
    }
}

fn default_bind()       -> String { "0.0.0.0:3000".to_string() }
fn default_static_dir() -> String { "static".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { page_size: default_page_size() }
    }
}

fn default_page_size() -> usize { 30 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_path")]
    pub path: PathBuf,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self { path: default_preferences_path() }
    }
}

fn default_preferences_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hermes")
        .join("preferences.json")
}

mod tests;

impl Config {
    /// Load configuration from hermes.toml.
    /// Checks HERMES_CONFIG first, then the current directory. A missing file
    /// yields defaults. `.env` is read before environment overrides apply.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "hermes.toml".to_string());
        let mut config = Self::load_from(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file not found: {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.grid.page_size = config.grid.page_size.max(1);
        Ok(config)
    }

    /// Apply `HERMES_API_BASE_URL` / `HERMES_BIND` from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.bind = bind.trim().to_string();
        }
    }
}
