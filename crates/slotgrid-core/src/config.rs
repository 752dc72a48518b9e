#![forbid(unsafe_code)]

//! Configuration-as-data for a slot grid.
//!
//! [`GridConfig`] gathers the slot generation bounds, labeling, layout and
//! gesture tuning into one value that can be loaded from TOML or JSON.
//!
//! ```toml
//! # slotgrid.toml
//! start_hour = 8
//! end_hour = 20
//! locale = "english"
//!
//! [gesture]
//! touch_cooldown_ms = 400
//! ```
//!
//! Every field defaults to the values the poll ships with, so
//! `GridConfig::default()` is a 09:00–22:30 half-hour grid in two columns.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gesture::{DEFAULT_TOUCH_COOLDOWN, GestureConfig};
use crate::layout::DEFAULT_COLUMNS;
use crate::slot::{
    DEFAULT_END_HOUR, DEFAULT_START_HOUR, DEFAULT_STEP_MINUTES, DisplayLocale, SlotError,
    SlotRegistry,
};

/// Top-level grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// First hour row.
    pub start_hour: u8,
    /// Last hour row (inclusive).
    pub end_hour: u8,
    /// Slot length; must divide 60.
    pub step_minutes: u16,
    pub locale: DisplayLocale,
    /// Number of rendered columns.
    pub columns: usize,
    /// Lock slots the server marked unavailable.
    pub enforce_availability: bool,
    pub gesture: GesturePolicyConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            step_minutes: DEFAULT_STEP_MINUTES,
            locale: DisplayLocale::default(),
            columns: DEFAULT_COLUMNS,
            enforce_availability: false,
            gesture: GesturePolicyConfig::default(),
        }
    }
}

/// Gesture tuning as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturePolicyConfig {
    /// Mouse lockout after a touch gesture, in milliseconds.
    pub touch_cooldown_ms: u64,
}

impl Default for GesturePolicyConfig {
    fn default() -> Self {
        Self {
            touch_cooldown_ms: DEFAULT_TOUCH_COOLDOWN.as_millis() as u64,
        }
    }
}

impl GridConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.start_hour > self.end_hour {
            errors.push(format!(
                "start_hour ({}) must not exceed end_hour ({})",
                self.start_hour, self.end_hour
            ));
        }
        if self.end_hour > 23 {
            errors.push(format!("end_hour must be <= 23 (got {})", self.end_hour));
        }
        if self.step_minutes == 0 || 60 % self.step_minutes != 0 {
            errors.push(format!(
                "step_minutes must be a positive divisor of 60 (got {})",
                self.step_minutes
            ));
        }
        if self.columns == 0 {
            errors.push("columns must be >= 1".to_owned());
        }
        if self.gesture.touch_cooldown_ms > 5_000 {
            errors.push(format!(
                "gesture.touch_cooldown_ms must be <= 5000 (got {})",
                self.gesture.touch_cooldown_ms
            ));
        }
        errors
    }

    /// Like [`validate`](Self::validate) but as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build the gesture machine config.
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig {
            touch_cooldown: Duration::from_millis(self.gesture.touch_cooldown_ms),
        }
    }

    /// Generate the slot registry described by this config.
    pub fn build_registry(&self) -> Result<SlotRegistry, SlotError> {
        let mut registry = SlotRegistry::initialize_with_locale(
            self.start_hour,
            self.end_hour,
            self.step_minutes,
            self.locale,
        )?;
        registry.set_enforce_availability(self.enforce_availability);
        Ok(registry)
    }
}

/// Errors that can occur when loading a grid configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
