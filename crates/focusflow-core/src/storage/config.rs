//! TOML-based application settings.
//!
//! Stores user preferences including:
//! - Phase durations and long-break cadence
//! - Notification preferences (sound, vibration)
//! - Theme
//!
//! Settings are stored at `~/.config/focusflow/config.toml`.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::TimerConfig;

/// Timer durations as the user edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_focus_minutes", deserialize_with = "lenient_u32")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break", deserialize_with = "lenient_u32")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break", deserialize_with = "lenient_u32")]
    pub long_break_minutes: u32,
    #[serde(default = "default_cycles_until_long_break", deserialize_with = "lenient_u32")]
    pub cycles_until_long_break: u32,
    /// Keep running into the next phase when a countdown ends.
    #[serde(default)]
    pub auto_continue: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: ThemeMode,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusflow/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

// Editable ranges, inclusive.
const FOCUS_RANGE: (u32, u32) = (1, 180);
const BREAK_RANGE: (u32, u32) = (1, 60);
const CYCLES_RANGE: (u32, u32) = (1, 12);

// Default functions
fn default_focus_minutes() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_cycles_until_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

/// Any integer is accepted; `normalize` brings it into range afterwards.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.clamp(0, i64::from(u32::MAX))).unwrap_or(0))
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            cycles_until_long_break: default_cycles_until_long_break(),
            auto_continue: false,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_enabled: true,
            vibration_enabled: true,
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
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let new_value = match obj.get(part).ok_or_else(unknown)? {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<i64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("not a leaf key".into()));
                }
                _ => serde_json::Value::String(value.to_lowercase()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Location of the settings file.
    pub fn default_path() -> Result<PathBuf> {
        Self::path()
    }

    /// Load from the data directory, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.normalize();
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load config, using defaults");
                Self::default()
            }
        }
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

    /// Set a value by dot-separated key. Durations are clamped to their
    /// editable range. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let mut updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.normalize();
        *self = updated;
        Ok(())
    }

    /// Clamp timer values to their editable ranges.
    pub fn normalize(&mut self) {
        let t = &mut self.timer;
        t.focus_minutes = t.focus_minutes.clamp(FOCUS_RANGE.0, FOCUS_RANGE.1);
        t.short_break_minutes = t.short_break_minutes.clamp(BREAK_RANGE.0, BREAK_RANGE.1);
        t.long_break_minutes = t.long_break_minutes.clamp(BREAK_RANGE.0, BREAK_RANGE.1);
        t.cycles_until_long_break = t
            .cycles_until_long_break
            .clamp(CYCLES_RANGE.0, CYCLES_RANGE.1);
    }

    /// The engine configuration these settings describe.
    pub fn timer_config(&self) -> TimerConfig {
        let t = &self.timer;
        TimerConfig::new(
            t.focus_minutes.into(),
            t.short_break_minutes.into(),
            t.long_break_minutes.into(),
            t.cycles_until_long_break.into(),
        )
        .with_auto_continue(t.auto_continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips_through_toml() {
        let cfg = Config::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("[timer]"));
        assert!(text.contains("theme = \"system\""));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg: Config = toml::from_str("[timer]\nfocus_minutes = 50\n").unwrap();
        assert_eq!(cfg.timer.focus_minutes, 50);
        assert_eq!(cfg.timer.short_break_minutes, 5);
        assert!(cfg.notifications.sound_enabled);
        assert_eq!(cfg.ui.theme, ThemeMode::System);
    }

    #[test]
    fn get_by_dotted_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("ui.theme").as_deref(), Some("system"));
        assert_eq!(cfg.get("notifications.vibration_enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.nope"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn set_parses_by_existing_type() {
        let mut cfg = Config::default();
        cfg.set("timer.focus_minutes", "45").unwrap();
        cfg.set("timer.auto_continue", "true").unwrap();
        cfg.set("ui.theme", "Dark").unwrap();
        assert_eq!(cfg.timer.focus_minutes, 45);
        assert!(cfg.timer.auto_continue);
        assert_eq!(cfg.ui.theme, ThemeMode::Dark);
    }

    #[test]
    fn set_clamps_to_editable_range() {
        let mut cfg = Config::default();
        cfg.set("timer.focus_minutes", "0").unwrap();
        cfg.set("timer.short_break_minutes", "500").unwrap();
        cfg.set("timer.cycles_until_long_break", "99").unwrap();
        cfg.set("timer.long_break_minutes", "-5").unwrap();
        assert_eq!(cfg.timer.focus_minutes, 1);
        assert_eq!(cfg.timer.long_break_minutes, 1);
        assert_eq!(cfg.timer.short_break_minutes, 60);
        assert_eq!(cfg.timer.cycles_until_long_break, 12);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.bogus", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("timer", "1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("timer.focus_minutes", "abc"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("ui.theme", "purple"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_keeps_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timer.long_break_minutes", "30").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.long_break_minutes, 30);
    }

    #[test]
    fn load_clamps_hand_edited_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[timer]\nfocus_minutes = -5\nshort_break_minutes = 0\nlong_break_minutes = 600\ncycles_until_long_break = -1\n",
        )
        .unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.focus_minutes, 1);
        assert_eq!(cfg.timer.short_break_minutes, 1);
        assert_eq!(cfg.timer.long_break_minutes, 60);
        assert_eq!(cfg.timer.cycles_until_long_break, 1);
        assert_eq!(cfg.timer_config().focus_minutes(), 1);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn timer_config_reflects_settings() {
        let mut cfg = Config::default();
        cfg.set("timer.focus_minutes", "50").unwrap();
        cfg.set("timer.cycles_until_long_break", "2").unwrap();
        let tc = cfg.timer_config();
        assert_eq!(tc.focus_minutes(), 50);
        assert_eq!(tc.cycles_until_long_break(), 2);
        assert!(!tc.auto_continue());
    }
}
