//! TOML-based application configuration.
//!
//! Stores layout policy including:
//! - Cluster threshold and minimum panel separation (pixels)
//! - Relaxation pass budget and damping
//! - Default zoom level
//! - Display time zone offset
//!
//! Configuration is stored at `~/.config/dosetrail/config.toml`.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::timeline::{LayoutSettings, RelaxationParams, ZoomLevel};

/// Declutter thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_cluster_threshold")]
    pub cluster_threshold: f64,
    #[serde(default = "default_min_separation")]
    pub min_separation: f64,
    #[serde(default = "default_connector_tolerance")]
    pub connector_tolerance: f64,
}

/// Relaxation loop tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationConfig {
    #[serde(default = "default_passes")]
    pub passes: usize,
    #[serde(default = "default_damping")]
    pub damping: f64,
    /// Early exit once a pass moves nothing further than this.
    #[serde(default)]
    pub settle_tolerance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(default = "default_zoom_level")]
    pub default_level: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Fixed UTC offset for calendar days; the system zone when unset.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dosetrail/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub relaxation: RelaxationConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_cluster_threshold() -> f64 {
    24.0
}
fn default_min_separation() -> f64 {
    28.0
}
fn default_connector_tolerance() -> f64 {
    0.5
}
fn default_passes() -> usize {
    RelaxationParams::DEFAULT_PASSES
}
fn default_damping() -> f64 {
    RelaxationParams::DEFAULT_DAMPING
}
fn default_zoom_level() -> f64 {
    1.0
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            cluster_threshold: default_cluster_threshold(),
            min_separation: default_min_separation(),
            connector_tolerance: default_connector_tolerance(),
        }
    }
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            passes: default_passes(),
            damping: default_damping(),
            settle_tolerance: None,
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            default_level: default_zoom_level(),
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

    fn parse_like(
        existing: &serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<serde_json::Value, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let number = |value: &str| -> Option<serde_json::Value> {
            if let Ok(n) = value.parse::<i64>() {
                Some(serde_json::Value::Number(n.into()))
            } else {
                value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
            }
        };

        match existing {
            serde_json::Value::Bool(_) => value
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .map_err(|e| invalid(e.to_string())),
            serde_json::Value::Number(_) => {
                number(value).ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))
            }
            // Unset optional: "none" clears it, otherwise take a number.
            serde_json::Value::Null => {
                if value.eq_ignore_ascii_case("none") {
                    Ok(serde_json::Value::Null)
                } else {
                    number(value)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))
                }
            }
            _ => Ok(serde_json::Value::String(value.into())),
        }
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;
                // An optional that is set may still be cleared.
                let new_value = if value.eq_ignore_ascii_case("none") && existing.is_number() {
                    serde_json::Value::Null
                } else {
                    Self::parse_like(existing, key, value)?
                };
                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// out-of-range values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some("none".to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is out of range. On error `self` is
    /// left unchanged.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };
        let t = &self.timeline;
        if !(t.cluster_threshold.is_finite() && t.cluster_threshold >= 0.0) {
            return invalid("timeline.cluster_threshold", "must be finite and not negative");
        }
        if !(t.min_separation.is_finite() && t.min_separation > 0.0) {
            return invalid("timeline.min_separation", "must be finite and greater than zero");
        }
        if !(t.connector_tolerance.is_finite() && t.connector_tolerance >= 0.0) {
            return invalid("timeline.connector_tolerance", "must be finite and not negative");
        }
        if !(0.0..=1.0).contains(&self.relaxation.damping) {
            return invalid("relaxation.damping", "must be between 0 and 1");
        }
        if let Some(tol) = self.relaxation.settle_tolerance {
            if !(tol.is_finite() && tol >= 0.0) {
                return invalid("relaxation.settle_tolerance", "must be finite and not negative");
            }
        }
        if ZoomLevel::new(self.zoom.default_level).is_err() {
            return invalid("zoom.default_level", "must be finite and greater than zero");
        }
        if self.display.utc_offset().is_none() && self.display.utc_offset_minutes.is_some() {
            return invalid("display.utc_offset_minutes", "must be within one day");
        }
        Ok(())
    }

    /// Engine settings described by this configuration.
    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            cluster_threshold: self.timeline.cluster_threshold,
            relaxation: RelaxationParams {
                min_separation: self.timeline.min_separation,
                passes: self.relaxation.passes,
                damping: self.relaxation.damping,
                settle_tolerance: self.relaxation.settle_tolerance,
            },
            connector_tolerance: self.timeline.connector_tolerance,
        }
    }

    pub fn default_zoom(&self) -> ZoomLevel {
        ZoomLevel::new(self.zoom.default_level).unwrap_or_default()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

impl DisplayConfig {
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|m| FixedOffset::east_opt(m.checked_mul(60)?))
    }
}
