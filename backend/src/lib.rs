//! # kaspapool - Kaspa pool dashboard configuration
//!
//! Resolves the configuration record the pool dashboard runs with, one
//! per deployment environment, and loads the stratum bridge start-up
//! settings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Defaults   │────▶│ Environment │────▶│  POOL_* env │────▶│   Record    │
//! │ (built-in)  │     │  overrides  │     │    layer    │     │ (JSON/HTTP) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kaspapool::get_configuration;
//!
//! let record = get_configuration("production");
//! println!("{}", record.app.stratum_url());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`environment`] - Deployment environments
//! - [`config`] - Record, defaults, overrides and the provider
//! - [`validation`] - Typed and JSON schema checks
//! - [`duration`] - Go-style duration strings
//! - [`bridge`] - Stratum bridge settings
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod environment;

// Configuration
pub mod config;
pub mod duration;
pub mod bridge;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, ConfigResult, ServerError, ServerResult};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use environment::Environment;

pub use config::{
    get_configuration,
    ConfigurationProvider,
    ConfigurationRecord,
    AppSettings,
    EmberEnv,
    LocationType,
    ConfigOverrides,
    AppOverrides,
    OverrideTable,
};

pub use duration::parse_duration;

// =============================================================================
// Re-exports - Bridge
// =============================================================================

pub use bridge::{BridgeConfig, BridgeFlags, mask_passwords};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_record, validate, validate_config_json, validate_record};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::logs::{LogEntry, LogLevel, LOG_BROADCASTER};
pub use api::types::{error_response, ConfigQuery, EnvironmentsResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
