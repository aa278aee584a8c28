use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Client configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with BILLS_ prefix (always wins)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub favorites: FavoritesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Root of the Oireachtas API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page size used when the caller does not pick one.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Whole-request timeout for bill fetches, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// How long a fetched page is reused, in seconds. 0 disables the cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of cached pages.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FavoritesConfig {
    /// Directory holding the persisted favorites file.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Storage key; the file is `<storage_dir>/<namespace>.json`.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Upper bound on a confirmation call before it counts as failed, in milliseconds.
    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,

    /// Latency of the simulated confirmation endpoint, in milliseconds.
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,

    /// Probability in `[0, 1]` that a simulated confirmation fails.
    #[serde(default)]
    pub simulated_failure_rate: f64,
}

impl FavoritesConfig {
    #[must_use]
    pub const fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    #[must_use]
    pub const fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "https://api.oireachtas.ie/v1".to_string()
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_limit() -> u32 {
    20
}

#[allow(clippy::missing_const_for_fn)]
fn default_request_timeout_secs() -> u64 {
    30
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_max_entries() -> usize {
    64
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".bills")
}

fn default_namespace() -> String {
    crate::favorites::DEFAULT_NAMESPACE.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_confirm_timeout_ms() -> u64 {
    5_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_simulated_latency_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_limit: default_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            namespace: default_namespace(),
            confirm_timeout_ms: default_confirm_timeout_ms(),
            simulated_latency_ms: default_simulated_latency_ms(),
            simulated_failure_rate: 0.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with BILLS_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("BILLS_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.api.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api.base_url '{base_url}' must start with http:// or https://"
            )));
        }

        if self.api.default_limit == 0 {
            return Err(ConfigError::Validation(
                "api.default_limit cannot be 0".into(),
            ));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.request_timeout_secs cannot be 0".into(),
            ));
        }

        if self.favorites.namespace.trim().is_empty() {
            return Err(ConfigError::Validation(
                "favorites.namespace is required. Set BILLS_FAVORITES__NAMESPACE or configure in config.yaml.".into(),
            ));
        }

        if self.favorites.confirm_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "favorites.confirm_timeout_ms cannot be 0".into(),
            ));
        }

        let rate = self.favorites.simulated_failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Validation(format!(
                "favorites.simulated_failure_rate must be between 0 and 1, got: {rate}"
            )));
        }

        Ok(())
    }
}
