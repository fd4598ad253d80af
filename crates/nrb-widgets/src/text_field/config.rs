#![forbid(unsafe_code)]

//! Tunables for the text field length-limit machinery.
//!
//! [`TextFieldConfig`] can be loaded from JSON or, with the `policy-config`
//! feature, TOML. Missing keys take their defaults, so an empty document is
//! the default configuration.
//!
//! ```toml
//! # text-field.toml
//! relax_delay_ms = 150
//! revalidate_on_unit_change = false
//! ```
//!
//! ```
//! use nrb_widgets::text_field::TextFieldConfig;
//!
//! let config = TextFieldConfig::from_json_str(r#"{"relax_delay_ms": 150}"#).unwrap();
//! assert_eq!(config.relax_delay_ms, 150);
//! assert_eq!(config.max_insert_bytes, 256);
//! ```

use std::path::Path;

use nrb_core::ApiLevel;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::ConfigError;

/// Length-limit tunables shared by every text field of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextFieldConfig {
    /// Delay before a relaxed toolkit ceiling is restored.
    pub relax_delay_ms: u64,
    /// Size of the insert transfer buffer, terminator included.
    pub max_insert_bytes: usize,
    /// Paste candidates are clipped to `max_length * paste_bytes_per_unit` bytes.
    pub paste_bytes_per_unit: usize,
    /// Legacy-mode ceiling while a beyond-limit callback is registered.
    pub legacy_unbounded_ceiling: usize,
    /// Extra ceiling units while a beyond-limit callback is registered.
    pub beyond_limit_slack_units: usize,
    /// First platform level that delivers will-change events.
    pub will_change_min_api: u32,
    /// Re-validate content immediately when the unit changes under a limit.
    pub revalidate_on_unit_change: bool,
}

impl Default for TextFieldConfig {
    fn default() -> Self {
        Self {
            relax_delay_ms: 100,
            max_insert_bytes: 256,
            paste_bytes_per_unit: 4,
            legacy_unbounded_ceiling: 10_000_000,
            beyond_limit_slack_units: 2,
            will_change_min_api: ApiLevel::WILL_CHANGE.get(),
            revalidate_on_unit_change: true,
        }
    }
}

impl TextFieldConfig {
    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        // One payload byte plus the terminator.
        if self.max_insert_bytes < 2 {
            errors.push(format!(
                "max_insert_bytes must be >= 2, got {}",
                self.max_insert_bytes
            ));
        }
        // A single UTF-8 code point needs up to four bytes.
        if self.paste_bytes_per_unit < 4 {
            errors.push(format!(
                "paste_bytes_per_unit must be >= 4, got {}",
                self.paste_bytes_per_unit
            ));
        }
        if self.legacy_unbounded_ceiling == 0 {
            errors.push("legacy_unbounded_ceiling must be > 0".into());
        }
        if self.will_change_min_api == 0 {
            errors.push("will_change_min_api must be > 0".into());
        }
        errors
    }

    /// Return `self` if [`validate`](Self::validate) reports nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// [`relax_delay_ms`](Self::relax_delay_ms) as a duration.
    #[must_use]
    pub fn relax_delay(&self) -> Duration {
        Duration::from_millis(self.relax_delay_ms)
    }

    /// [`will_change_min_api`](Self::will_change_min_api) as a level.
    #[must_use]
    pub fn will_change_api(&self) -> ApiLevel {
        ApiLevel(self.will_change_min_api)
    }
}
