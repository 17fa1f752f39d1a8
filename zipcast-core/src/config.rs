use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    forecast::{DEFAULT_FORECAST_LIMIT, ForecastMode},
    model::{LocationQuery, Units},
};

pub const ENV_API_KEY: &str = "ZIPCAST_API_KEY";
pub const ENV_DEFAULT_LOCATION: &str = "ZIPCAST_DEFAULT_LOCATION";
pub const ENV_BASE_URL: &str = "ZIPCAST_BASE_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_location = "10001"
/// country = "us"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key. Never compiled in; comes from the file or `ZIPCAST_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Postal code fetched when a session starts.
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Country qualifier appended to the forecast query (`<zip>,<country>`).
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default)]
    pub units: Units,

    /// Upstream base URL. Point it at a proxy to keep the key server-side.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_forecast_limit")]
    pub forecast_limit: usize,

    #[serde(default)]
    pub forecast_mode: ForecastMode,
}

fn default_location() -> String {
    "10001".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_forecast_limit() -> usize {
    DEFAULT_FORECAST_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_location: default_location(),
            country: default_country(),
            units: Units::default(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            forecast_limit: default_forecast_limit(),
            forecast_mode: ForecastMode::default(),
        }
    }
}

impl Config {
    /// Resolve configuration at process start: file first, then environment overrides.
    pub fn resolve() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(location) = get(ENV_DEFAULT_LOCATION) {
            self.default_location = location;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
    }

    /// Returns the API key or a hint on how to configure one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `zipcast configure` or set {ENV_API_KEY}."
            )
        })
    }

    pub fn default_location_query(&self) -> Result<LocationQuery> {
        LocationQuery::parse(&self.default_location)
            .ok_or_else(|| anyhow!("Configured default_location is empty"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "zipcast", "zipcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
