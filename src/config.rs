//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analytics::{DEFAULT_GOOD_MOOD_THRESHOLD, DEFAULT_TREND_DAYS, DEFAULT_WINDOW_DAYS};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Persistence configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Total bytes the store may occupy; unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<u64>,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("mindtrack").to_string_lossy().to_string())
        .unwrap_or_else(|| "./mindtrack_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            quota_bytes: None,
        }
    }
}

impl StorageConfig {
    /// `data_dir` with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }
}

/// Analytics windows
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    #[serde(default = "default_trend_days")]
    pub trend_days: i64,

    #[serde(default = "default_good_mood_threshold")]
    pub good_mood_threshold: u8,
}

fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

fn default_trend_days() -> i64 {
    DEFAULT_TREND_DAYS
}

fn default_good_mood_threshold() -> u8 {
    DEFAULT_GOOD_MOOD_THRESHOLD
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            trend_days: default_trend_days(),
            good_mood_threshold: default_good_mood_threshold(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate().map_err(|error| ConfigError::Invalid {
            path: path.to_path_buf(),
            error,
        })?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("mindtrack").join("config.toml")),
            Some(PathBuf::from("/etc/mindtrack/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any `MINDTRACK_*` lookup
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Storage overrides
        if let Some(data_dir) = lookup("MINDTRACK_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(quota) = lookup("MINDTRACK_QUOTA_BYTES") {
            match quota.trim().parse() {
                Ok(q) => self.storage.quota_bytes = Some(q),
                Err(_) => tracing::warn!(value = %quota, "Ignoring invalid MINDTRACK_QUOTA_BYTES"),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("MINDTRACK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("MINDTRACK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), String> {
        if self.analytics.window_days <= 0 || self.analytics.trend_days <= 0 {
            return Err("analytics windows must be at least one day".to_string());
        }
        if !(1..=5).contains(&self.analytics.good_mood_threshold) {
            return Err(format!(
                "good_mood_threshold must be between 1 and 5, got {}",
                self.analytics.good_mood_threshold
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(format!(
                "logging format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid config file {path:?}: {error}")]
    Invalid { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Mindtrack Configuration
#
# Environment variables override these settings:
# - MINDTRACK_DATA_DIR
# - MINDTRACK_QUOTA_BYTES
# - MINDTRACK_LOG_LEVEL
# - MINDTRACK_LOG_FORMAT

[storage]
# Directory holding one JSON file per collection
data_dir = "~/.local/share/mindtrack"

# Optional cap on the total size of stored collections (bytes)
# quota_bytes = 5242880

[analytics]
# Trailing window for the analytics summary (days)
window_days = 30

# Trailing window for the mood trend (days)
trend_days = 7

# Mood value (1-5) at or above which a day counts as good
good_mood_threshold = 4

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for terminals) or json (for log collectors)
format = "pretty"

# Optional log file path
# file = "~/.local/share/mindtrack/mindtrack.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_file_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();

        assert_eq!(config.storage.data_dir, "~/.local/share/mindtrack");
        assert_eq!(config.storage.quota_bytes, None);
        assert_eq!(config.analytics, AnalyticsConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analytics]\nwindow_days = 14\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.analytics.window_days, 14);
        assert_eq!(config.analytics.trend_days, 7);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[storage\n").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));

        let invalid = dir.path().join("invalid.toml");
        std::fs::write(&invalid, "[analytics]\ngood_mood_threshold = 9\n").unwrap();
        assert!(matches!(Config::load(&invalid), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MINDTRACK_DATA_DIR", "/tmp/mt"),
            ("MINDTRACK_QUOTA_BYTES", "1024"),
            ("MINDTRACK_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/tmp/mt");
        assert_eq!(config.storage.quota_bytes, Some(1024));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_quota_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "MINDTRACK_QUOTA_BYTES").then(|| "lots".to_string()));
        assert_eq!(config.storage.quota_bytes, None);
    }

    #[test]
    fn test_data_path_expands_home() {
        let storage = StorageConfig {
            data_dir: "/var/lib/mindtrack".to_string(),
            quota_bytes: None,
        };
        assert_eq!(storage.data_path(), PathBuf::from("/var/lib/mindtrack"));

        if let Some(home) = dirs::home_dir() {
            let storage = StorageConfig {
                data_dir: "~/mt".to_string(),
                quota_bytes: None,
            };
            assert_eq!(storage.data_path(), home.join("mt"));
        }
    }
}
