use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Longest forecast window the forecast API serves.
pub const MAX_FORECAST_DAYS: u8 = 16;

/// Geocoding lookup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub url: String,
    /// Maximum number of suggestions; provider default when unset.
    pub limit: Option<u32>,
    /// Language for place names, e.g. "es".
    pub language: Option<String>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self { url: DEFAULT_GEOCODING_URL.to_string(), limit: None, language: None }
    }
}

/// Forecast lookup settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub url: String,
    pub days: u8,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { url: DEFAULT_FORECAST_URL.to_string(), days: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) never reach the network.
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_query_len: 1 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [geocoding]
/// url = "https://geocoding-api.open-meteo.com/v1/search"
/// limit = 5
///
/// [http]
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub geocoding: GeocodingConfig,
    pub forecast: ForecastConfig,
    pub http: HttpConfig,
    pub search: SearchConfig,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Check bounds and URLs before the config is used.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.geocoding.url)
            .with_context(|| format!("Invalid geocoding url: {}", self.geocoding.url))?;
        Url::parse(&self.forecast.url)
            .with_context(|| format!("Invalid forecast url: {}", self.forecast.url))?;

        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be greater than zero");
        }

        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast.days) {
            bail!(
                "forecast.days must be between 1 and {MAX_FORECAST_DAYS}, got {}",
                self.forecast.days
            );
        }

        if self.geocoding.limit == Some(0) {
            bail!("geocoding.limit must be greater than zero when set");
        }

        Ok(())
    }

    /// Load config from the default location, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or return defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
