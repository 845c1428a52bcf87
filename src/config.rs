use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::core::SourceBackoff;

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub feed: FeedSettings,
    #[serde(default)]
    #[validate(nested)]
    pub geocoder: GeocoderSettings,
    #[serde(default)]
    #[validate(nested)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FeedSettings {
    #[serde(default = "default_feed_url")]
    #[validate(url)]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1))]
    pub page_timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: default_timeout_secs(),
            page_timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GeocoderSettings {
    #[serde(default = "default_geocoder_endpoint")]
    #[validate(url)]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    #[validate(length(min = 1))]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PollingSettings {
    #[serde(default = "default_interval_ms")]
    #[validate(range(min = 1))]
    pub interval_ms: u64,
    #[serde(default = "default_backoff_base_ms")]
    #[validate(range(min = 1))]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    #[validate(range(min = 1))]
    pub backoff_max_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn backoff(&self) -> SourceBackoff {
        SourceBackoff {
            base: Duration::from_millis(self.backoff_base_ms),
            max: Duration::from_millis(self.backoff_max_ms.max(self.backoff_base_ms)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_feed_url() -> String {
    "https://heb-ecom-covid-vaccine.hebdigital-prd.com/vaccine_locations.json".to_string()
}
fn default_geocoder_endpoint() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { "slot-scout".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_interval_ms() -> u64 { 1000 }
fn default_backoff_base_ms() -> u64 { 2000 }
fn default_backoff_max_ms() -> u64 { 60_000 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. An explicit file passed with `--config`
    /// 5. Environment variables (prefixed with SLOT_SCOUT__)
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        // e.g., SLOT_SCOUT__POLLING__INTERVAL_MS -> polling.interval_ms
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("SLOT_SCOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}
