//! Core error types for dosetrail-core.
//!
//! The layout engine itself is total over well-formed input and never fails.
//! Errors only arise at the boundaries: ingesting an event snapshot, parsing
//! user-supplied zoom levels, and reading or writing configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dosetrail-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config directory could not be resolved or created
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors raised at the ingestion boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Zoom level is zero, negative, or not finite
    #[error("Invalid zoom level {0}: must be a finite value greater than zero")]
    InvalidZoom(f64),

    /// Required field is missing or empty
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Timestamp could not be parsed as RFC 3339
    #[error("Malformed timestamp '{value}': {message}")]
    MalformedTimestamp { value: String, message: String },

    /// Quantity is negative or not finite
    #[error("Invalid quantity {0}: must be finite and not negative")]
    InvalidQuantity(f64),

    /// The same event id appears twice in one snapshot
    #[error("Duplicate event id '{0}'")]
    DuplicateId(String),

    /// A single record is not an object or has a wrongly-typed field
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The snapshot document itself could not be decoded
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_converts_into_core_error() {
        let err: CoreError = ValidationError::InvalidZoom(0.0).into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("zoom level 0"));
    }

    #[test]
    fn io_and_json_errors_convert_into_core_error() {
        let err: CoreError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CoreError::Io(_)));
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = bad.into();
        assert!(err.to_string().starts_with("JSON error"));
    }

    #[test]
    fn toml_errors_become_parse_failures() {
        let bad = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: ConfigError = bad.into();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }
}
