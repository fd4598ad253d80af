#![forbid(unsafe_code)]

//! Error types for the text field bridge.

use thiserror::Error;

/// A prop value or method argument the view could not accept.
///
/// The view state is left untouched when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropError {
    #[error("`{key}` expects {expected}, got {found}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("unknown length limit type {0}")]
    UnknownLimitType(i64),
    #[error("unknown method `{0}`")]
    UnknownMethod(String),
}

impl PropError {
    pub(crate) fn invalid(key: &'static str, expected: &'static str, found: &serde_json::Value) -> Self {
        Self::InvalidValue {
            key,
            expected,
            found: found.to_string(),
        }
    }
}

/// Errors that can occur when loading a [`TextFieldConfig`](crate::text_field::TextFieldConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "policy-config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

pub type Result<T, E = PropError> = std::result::Result<T, E>;
