use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::logging::LogFormat;

/// Longest accepted inactivity window (one week)
pub const MAX_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

/// Client core configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub cache: CacheConfig,
    pub filters: FilterConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inactivity window after which the session is dropped
    pub timeout_minutes: u64,
    /// Storage entry holding the serialized user record
    pub user_key: String,
    /// Storage entry holding the last-activity timestamp (epoch millis)
    pub last_activity_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: 30,
            user_key: "user".to_string(),
            last_activity_key: "lastActivity".to_string(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_minutes.saturating_mul(60))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_capacity: u64,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 500,
            ttl_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Buffered "filters changed" notifications per subscriber
    pub channel_capacity: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // SPENDLENS_SESSION_TIMEOUT_MINUTES etc. Field names contain
        // underscores, so sections are separated by a double underscore.
        builder = builder.add_source(
            Environment::with_prefix("SPENDLENS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Collect every configuration problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.session.timeout_minutes == 0 {
            errors.push("session.timeout_minutes must be greater than 0".to_string());
        }
        if self.session.timeout_minutes > MAX_TIMEOUT_MINUTES {
            errors.push(format!("session.timeout_minutes must be at most {MAX_TIMEOUT_MINUTES}"));
        }
        if self.session.user_key.is_empty() || self.session.last_activity_key.is_empty() {
            errors.push("session storage keys must not be empty".to_string());
        }
        if self.session.user_key == self.session.last_activity_key {
            errors.push("session.user_key and session.last_activity_key must differ".to_string());
        }
        if self.cache.max_capacity == 0 {
            errors.push("cache.max_capacity must be greater than 0".to_string());
        }
        if self.cache.ttl_seconds == 0 {
            errors.push("cache.ttl_seconds must be greater than 0".to_string());
        }
        if self.filters.channel_capacity == 0 {
            errors.push("filters.channel_capacity must be greater than 0".to_string());
        }
        if self.logging.format.parse::<LogFormat>().is_err() {
            errors.push(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{}\"",
                self.logging.format
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.session.timeout_minutes, 30);
        assert_eq!(config.session.timeout(), Duration::from_secs(1800));
        assert_eq!(config.session.user_key, "user");
        assert_eq!(config.session.last_activity_key, "lastActivity");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = Config::default();
        config.session.timeout_minutes = 0;
        config.cache.max_capacity = 0;
        config.logging.format = "xml".to_string();

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("timeout_minutes")));
        assert!(errors.iter().any(|e| e.contains("xml")));
    }

    #[test]
    fn test_huge_timeout_is_rejected_without_overflow() {
        let mut config = Config::default();
        config.session.timeout_minutes = u64::MAX;

        assert_eq!(config.session.timeout(), Duration::from_secs(u64::MAX));
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("at most"));

        config.session.timeout_minutes = MAX_TIMEOUT_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_colliding_keys() {
        let mut config = Config::default();
        config.session.last_activity_key = "user".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = Config::load(Some("/nonexistent/spendlens.toml")).unwrap();
        assert_eq!(config.cache.max_capacity, 500);
    }
}
