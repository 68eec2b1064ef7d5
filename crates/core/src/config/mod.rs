//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SUBSCOPE_*)
//! 2. TOML config file (if SUBSCOPE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SUBSCOPE_*)
/// 2. TOML config file (if SUBSCOPE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Whether PsychonautWiki lookups are performed.
    ///
    /// Set via SUBSCOPE_ENABLE_PSYCHONAUT_WIKI environment variable.
    #[serde(default = "default_true")]
    pub enable_psychonaut_wiki: bool,

    /// Whether TripSit lookups are performed.
    ///
    /// Set via SUBSCOPE_ENABLE_TRIPSIT environment variable.
    #[serde(default = "default_true")]
    pub enable_tripsit: bool,

    /// Extra names added to the vocabulary.
    ///
    /// Set via SUBSCOPE_CUSTOM_SUBSTANCES environment variable.
    #[serde(default)]
    pub custom_substances: Vec<String>,

    /// PsychonautWiki GraphQL endpoint.
    #[serde(default = "default_psychonaut_url")]
    pub psychonaut_url: String,

    /// Base URL of the TripSit API (`getAllDrugNames`, `getAllDrugs`, `getDrug` live below it).
    #[serde(default = "default_tripsit_base_url")]
    pub tripsit_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SUBSCOPE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SUBSCOPE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Lifetime of cached substance records in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Failed requests before an endpoint fails fast.
    #[serde(default = "default_breaker_threshold")]
    pub breaker_threshold: u32,

    /// Seconds after the first failure of a streak until the streak is forgotten.
    #[serde(default = "default_breaker_reset_secs")]
    pub breaker_reset_secs: u64,

    /// Attempts per upstream request.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Delay before the first retry in milliseconds; doubles per retry.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_psychonaut_url() -> String {
    "https://api.psychonautwiki.org".into()
}

fn default_tripsit_base_url() -> String {
    "https://tripbot.tripsit.me/api/tripsit".into()
}

fn default_user_agent() -> String {
    "subscope/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_ttl_secs() -> u64 {
    60 * 60
}

fn default_breaker_threshold() -> u32 {
    5
}

fn default_breaker_reset_secs() -> u64 {
    5 * 60
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_psychonaut_wiki: true,
            enable_tripsit: true,
            custom_substances: Vec::new(),
            psychonaut_url: default_psychonaut_url(),
            tripsit_base_url: default_tripsit_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            breaker_threshold: default_breaker_threshold(),
            breaker_reset_secs: default_breaker_reset_secs(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn breaker_reset_interval(&self) -> Duration {
        Duration::from_secs(self.breaker_reset_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SUBSCOPE_`
    /// 2. TOML file from `SUBSCOPE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered provider stack used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SUBSCOPE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("SUBSCOPE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from `figment`.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// `getAllDrugNames` endpoint.
    pub fn tripsit_names_url(&self) -> String {
        format!("{}/getAllDrugNames", self.tripsit_base_url.trim_end_matches('/'))
    }

    /// `getAllDrugs` endpoint.
    pub fn tripsit_drugs_url(&self) -> String {
        format!("{}/getAllDrugs", self.tripsit_base_url.trim_end_matches('/'))
    }

    /// `getDrug` endpoint (takes a `name` query parameter).
    pub fn tripsit_drug_url(&self) -> String {
        format!("{}/getDrug", self.tripsit_base_url.trim_end_matches('/'))
    }
}
