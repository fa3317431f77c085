//! Error types for the pool configuration backend.
//!
//! - [`ConfigError`] - resolving, loading and parsing configuration
//! - [`ServerError`] - HTTP server start-up and request failures
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while resolving or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment outside `{development, test, production}` in strict mode.
    #[error("Unknown environment: '{0}' (expected development, test or production)")]
    UnknownEnvironment(String),

    /// Failed to read a configuration file.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Override file with an extension we cannot parse.
    #[error("Unsupported configuration format: {0} (use .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    /// A field holds a value of the wrong shape.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Unparseable duration string.
    #[error("Invalid duration: '{0}'")]
    InvalidDuration(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Listener could not be bound or the server stopped.
    #[error("Server IO error: {0}")]
    Bind(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
