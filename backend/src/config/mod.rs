//! Dashboard configuration.
//!
//! - [`record`] - the record and its derived values
//! - [`defaults`] - environment-invariant base values
//! - [`overrides`] - per-environment override tables and the merge step
//! - [`provider`] - resolving a record for an environment

pub mod defaults;
pub mod overrides;
pub mod provider;
pub mod record;

pub use overrides::{AppOverrides, ConfigOverrides, EmberEnvOverrides, OverrideTable};
pub use provider::{get_configuration, ConfigurationProvider};
pub use record::{AppSettings, ConfigurationRecord, EmberEnv, LocationType};
