//! TOML-based application configuration.
//!
//! Stores:
//! - Feed paging mode and thresholds
//! - Redemption session length
//! - Default log filter
//!
//! Configuration is stored at `~/.config/reelfeed/config.toml`. Only settings
//! live here; feed counters and sessions are never written to disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{config_dir, data_dir};
use crate::error::{ConfigError, Result};
use crate::feed::{PagingMode, DEFAULT_SNAP_THRESHOLD, DEFAULT_VIEWABILITY_THRESHOLD_PCT};
use crate::redeem::DEFAULT_SESSION_LENGTH_SECS;

/// Feed paging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub mode: PagingMode,
    /// Share of a page to scroll past before snapping forward (snap mode).
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,
    /// Visible percentage that makes a row active (native mode).
    #[serde(default = "default_viewability_threshold_pct")]
    pub viewability_threshold_pct: u8,
    /// Initial viewport height in points.
    #[serde(default = "default_page_height")]
    pub page_height: f64,
}

/// Redemption timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionConfig {
    #[serde(default = "default_session_length_secs")]
    pub session_length_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` overrides it.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/reelfeed/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub redemption: RedemptionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_snap_threshold() -> f64 {
    DEFAULT_SNAP_THRESHOLD
}
fn default_viewability_threshold_pct() -> u8 {
    DEFAULT_VIEWABILITY_THRESHOLD_PCT
}
fn default_page_height() -> f64 {
    844.0
}
fn default_session_length_secs() -> u32 {
    DEFAULT_SESSION_LENGTH_SECS
}
fn default_log_filter() -> String {
    "info".into()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            mode: PagingMode::default(),
            snap_threshold: default_snap_threshold(),
            viewability_threshold_pct: default_viewability_threshold_pct(),
            page_height: default_page_height(),
        }
    }
}

impl Default for RedemptionConfig {
    fn default() -> Self {
        Self {
            session_length_secs: default_session_length_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or is
    /// invalid, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::peek_from(path);
        }
        let cfg = Self::default();
        cfg.save_to(path)?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed, or
    /// the resulting config is invalid. `self` is untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check value ranges the engines rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| {
            Err(ConfigError::InvalidValue {
                key: key.into(),
                message: message.into(),
            })
        };

        if !(self.feed.snap_threshold > 0.0 && self.feed.snap_threshold < 1.0) {
            return invalid("feed.snap_threshold", "must be between 0 and 1 exclusive");
        }
        if !(1..=100).contains(&self.feed.viewability_threshold_pct) {
            return invalid("feed.viewability_threshold_pct", "must be within 1..=100");
        }
        if !(self.feed.page_height.is_finite() && self.feed.page_height > 0.0) {
            return invalid("feed.page_height", "must be positive");
        }
        if self.redemption.session_length_secs == 0 {
            return invalid("redemption.session_length_secs", "must be at least 1");
        }
        Ok(())
    }

    /// Read the config without creating the data dir or writing defaults.
    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load_or_default() -> Self {
        Self::peek_from(&config_dir().join("config.toml")).unwrap_or_default()
    }

    /// Read-only counterpart of [`Config::load_from`]: a missing file yields
    /// defaults and nothing is written.
    pub fn peek_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.redemption.session_length_secs, 60);
        assert_eq!(parsed.feed.mode, PagingMode::Snap);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[feed]\nmode = \"native\"\n").unwrap();
        assert_eq!(parsed.feed.mode, PagingMode::Native);
        assert_eq!(parsed.feed.viewability_threshold_pct, 70);
        assert_eq!(parsed.redemption, RedemptionConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("feed.mode").as_deref(), Some("snap"));
        assert_eq!(cfg.get("redemption.session_length_secs").as_deref(), Some("60"));
        assert!(cfg.get("feed.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("redemption.session_length_secs", "10").unwrap();
        cfg.set("feed.mode", "native").unwrap();
        cfg.set("feed.snap_threshold", "0.4").unwrap();
        assert_eq!(cfg.redemption.session_length_secs, 10);
        assert_eq!(cfg.feed.mode, PagingMode::Native);
        assert_eq!(cfg.feed.snap_threshold, 0.4);
    }

    #[test]
    fn set_rejects_unknown_and_invalid() {
        let mut cfg = Config::default();
        assert!(cfg.set("feed.nope", "1").is_err());
        assert!(cfg.set("redemption.session_length_secs", "0").is_err());
        assert!(cfg.set("feed.mode", "sideways").is_err());
        assert!(cfg.set("feed.snap_threshold", "abc").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("redemption.session_length_secs", "10").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), changed);
    }

    #[test]
    fn peek_from_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        assert_eq!(Config::peek_from(&path).unwrap(), Config::default());
        assert!(!path.exists());
        assert!(!dir.path().join("nested").exists());

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nfilter = \"debug\"\n").unwrap();
        assert_eq!(Config::peek_from(&path).unwrap().logging.filter, "debug");
    }

    #[test]
    fn tick_period_is_not_a_setting() {
        let mut cfg = Config::default();
        assert!(cfg.get("redemption.tick_interval_ms").is_none());
        assert!(cfg.set("redemption.tick_interval_ms", "5").is_err());

        // Files written by older builds still load.
        let parsed: Config =
            toml::from_str("[redemption]\nsession_length_secs = 30\ntick_interval_ms = 1000\n").unwrap();
        assert_eq!(parsed.redemption.session_length_secs, 30);
        assert!(!toml::to_string(&parsed).unwrap().contains("tick_interval_ms"));
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[redemption]\nsession_length_secs = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
