//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;
use url::Url;

/// Longest accepted record lifetime (7 days).
pub const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Longest accepted failure-streak window (1 day).
pub const MAX_BREAKER_RESET_SECS: u64 = 24 * 60 * 60;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()))
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `cache_ttl_secs` is 0 or exceeds 7 days
    /// - `breaker_reset_secs` is 0 or exceeds 1 day
    /// - `breaker_threshold` is 0
    /// - `retry_max_attempts` is outside 1..=10
    /// - an endpoint URL does not parse as http(s) with a host
    ///
    /// Returns `ConfigError::Missing` if every source is disabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(invalid("cache_ttl_secs", "must not exceed 7 days (604800s)"));
        }

        if self.breaker_threshold == 0 {
            return Err(invalid("breaker_threshold", "must be at least 1"));
        }
        if self.breaker_reset_secs == 0 {
            return Err(invalid("breaker_reset_secs", "must be greater than 0"));
        }
        if self.breaker_reset_secs > MAX_BREAKER_RESET_SECS {
            return Err(invalid("breaker_reset_secs", "must not exceed 1 day (86400s)"));
        }

        if !(1..=10).contains(&self.retry_max_attempts) {
            return Err(invalid("retry_max_attempts", "must be between 1 and 10"));
        }
        if self.retry_base_delay_ms > 60_000 {
            return Err(invalid("retry_base_delay_ms", "must not exceed 60000ms"));
        }

        if !is_http_url(&self.psychonaut_url) {
            return Err(invalid("psychonaut_url", "must be an http(s) URL"));
        }
        if !is_http_url(&self.tripsit_base_url) {
            return Err(invalid("tripsit_base_url", "must be an http(s) URL"));
        }

        if !self.enable_psychonaut_wiki && !self.enable_tripsit {
            return Err(ConfigError::Missing {
                field: "enable_psychonaut_wiki / enable_tripsit".into(),
                hint: "enable at least one substance source".into(),
            });
        }

        if self.custom_substances.iter().any(|name| name.trim().is_empty()) {
            tracing::warn!(
                count = self.custom_substances.len(),
                "custom_substances contains blank entries; they will be ignored"
            );
        }

        Ok(())
    }
}
