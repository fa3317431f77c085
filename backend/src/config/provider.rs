//! Resolving a configuration record for an environment.
//!
//! [`get_configuration`] is the pure entry point: defaults plus the
//! built-in branch for the environment. [`ConfigurationProvider`] layers
//! an override file and `POOL_*` variables on top and can refuse unknown
//! environments.
//!
//! # Example
//!
//! ```rust,ignore
//! use kaspapool::{get_configuration, ConfigurationProvider};
//!
//! let record = get_configuration("production");
//! assert_eq!(record.app.stratum_port, 18030);
//!
//! let provider = ConfigurationProvider::new()
//!     .with_override_file("overrides.yaml")?
//!     .strict(true);
//! let record = provider.resolve("test")?;
//! ```

use std::path::Path;

use super::defaults::base_record;
use super::overrides::{AppOverrides, OverrideTable};
use super::record::ConfigurationRecord;
use crate::api::logs::{log_info, log_info_indent, log_warning};
use crate::environment::Environment;
use crate::error::ConfigResult;

/// Record for `environment`. Unknown names get the plain defaults.
pub fn get_configuration(environment: &str) -> ConfigurationRecord {
    let environment = Environment::parse(environment);
    let mut record = base_record(environment.clone());

    if let Some(branch) = OverrideTable::builtin().get(&environment) {
        branch.apply(&mut record);
    }

    record
}

/// Layered configuration source.
#[derive(Debug, Clone)]
pub struct ConfigurationProvider {
    overrides: OverrideTable,
    env_layer: Option<AppOverrides>,
    strict: bool,
}

impl ConfigurationProvider {
    /// Defaults and built-in branches, lenient.
    pub fn new() -> Self {
        Self {
            overrides: OverrideTable::builtin(),
            env_layer: None,
            strict: false,
        }
    }

    /// Replace the per-environment override table.
    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    /// Replace the override table with one read from disk.
    pub fn with_override_file(self, path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let table = OverrideTable::from_path(path)?;
        log_info(format!("Loaded overrides from {}", path.display()));
        Ok(self.with_overrides(table))
    }

    /// Pool settings applied after the environment branch.
    pub fn with_env_layer(mut self, layer: AppOverrides) -> Self {
        self.env_layer = if layer.is_empty() { None } else { Some(layer) };
        self
    }

    /// Refuse environments outside the closed set.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Resolve: defaults, then the environment branch, then the env layer.
    pub fn resolve(&self, environment: &str) -> ConfigResult<ConfigurationRecord> {
        let environment = if self.strict {
            Environment::parse_strict(environment)?
        } else {
            Environment::parse(environment)
        };

        if !environment.is_known() {
            log_warning(format!(
                "Unknown environment '{}', using defaults",
                environment
            ));
        }

        let mut record = base_record(environment.clone());

        if let Some(branch) = self.overrides.get(&environment) {
            if !branch.is_empty() {
                log_info_indent(format!("{} override(s) for {}", branch.len(), environment), 1);
            }
            branch.check()?;
            branch.apply(&mut record);
        }

        if let Some(layer) = &self.env_layer {
            layer.check()?;
            log_info_indent(format!("{} setting(s) from POOL_* variables", layer.len()), 1);
            layer.apply(&mut record.app);
        }

        log_info(format!("Resolved configuration for '{}'", environment));
        Ok(record)
    }

    /// Resolve a pre-parsed environment.
    pub fn resolve_env(&self, environment: &Environment) -> ConfigResult<ConfigurationRecord> {
        self.resolve(environment.as_str())
    }

    /// Every recognized environment, resolved.
    pub fn resolve_all(&self) -> ConfigResult<Vec<ConfigurationRecord>> {
        Environment::KNOWN.iter().map(|env| self.resolve_env(env)).collect()
    }
}

impl Default for ConfigurationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::overrides::ConfigOverrides;
    use crate::error::ConfigError;

    const FIELDS: usize = 14;

    fn documented_fields(record: &ConfigurationRecord) -> [(&'static str, String); FIELDS] {
        let app = &record.app;
        [
            ("rootURL", record.root_url.clone()),
            ("locationType", record.location_type.as_str().to_string()),
            ("ApiUrl", app.api_url.clone()),
            ("PoolName", app.pool_name.clone()),
            ("HttpHost", app.http_host.clone()),
            ("HttpPort", app.http_port.to_string()),
            ("StratumHost", app.stratum_host.clone()),
            ("StratumPort", app.stratum_port.to_string()),
            ("PoolFee", app.pool_fee.clone()),
            ("PayoutThreshold", app.payout_threshold.clone()),
            ("PayoutInterval", app.payout_interval.clone()),
            ("BlockTime", app.block_time.to_string()),
            ("BlockReward", app.block_reward.to_string()),
            ("Unit", app.unit.clone()),
        ]
    }

    #[test]
    fn test_all_fields_present_for_known_environments() {
        for name in ["development", "test", "production"] {
            let record = get_configuration(name);
            for (field, value) in documented_fields(&record) {
                assert!(!value.is_empty(), "{} empty for {}", field, name);
            }
        }
    }

    #[test]
    fn test_environment_echoed_exactly() {
        for name in ["development", "test", "production", "unknown", "Production"] {
            assert_eq!(get_configuration(name).environment.as_str(), name);
        }
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(get_configuration("test"), get_configuration("test"));
        assert_eq!(get_configuration("staging"), get_configuration("staging"));
    }

    #[test]
    fn test_ports_positive() {
        for name in ["development", "test", "production", "unknown"] {
            let app = get_configuration(name).app;
            assert!(app.http_port > 0);
            assert!(app.stratum_port > 0);
        }
    }

    #[test]
    fn test_production_matches_development() {
        let mut production = get_configuration("production");
        let development = get_configuration("development");
        production.environment = development.environment.clone();
        assert_eq!(production, development);
    }

    #[test]
    fn test_unknown_environment_gets_defaults() {
        let unknown = get_configuration("unknown");
        let development = get_configuration("development");
        assert_eq!(unknown.app, development.app);
        assert_eq!(unknown.root_url, "/kaspa/");
        assert_eq!(unknown.environment, Environment::Other("unknown".into()));
    }

    #[test]
    fn test_provider_matches_pure_function() {
        let provider = ConfigurationProvider::new();
        for name in ["development", "test", "production", "unknown"] {
            assert_eq!(provider.resolve(name).unwrap(), get_configuration(name));
        }
    }

    #[test]
    fn test_strict_provider_rejects_unknown() {
        let provider = ConfigurationProvider::new().strict(true);
        assert!(provider.is_strict());
        assert!(provider.resolve("production").is_ok());
        assert!(matches!(
            provider.resolve("unknown"),
            Err(ConfigError::UnknownEnvironment(ref name)) if name == "unknown"
        ));
    }

    #[test]
    fn test_layers_apply_in_order() {
        let mut table = OverrideTable::builtin();
        table
            .insert(
                Environment::Production,
                ConfigOverrides {
                    root_url: Some("/pool/".into()),
                    app: Some(AppOverrides {
                        stratum_port: Some(1111),
                        pool_fee: Some("1%".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .unwrap();

        let provider = ConfigurationProvider::new()
            .with_overrides(table)
            .with_env_layer(AppOverrides {
                stratum_port: Some(2222),
                ..Default::default()
            });

        let production = provider.resolve("production").unwrap();
        assert_eq!(production.root_url, "/pool/");
        assert_eq!(production.app.pool_fee, "1%");
        assert_eq!(production.app.stratum_port, 2222);

        // other environments only see the env layer
        let test = provider.resolve("test").unwrap();
        assert_eq!(test.root_url, "/kaspa/");
        assert_eq!(test.app.pool_fee, "0.5%");
        assert_eq!(test.app.stratum_port, 2222);
    }

    #[test]
    fn test_zero_port_never_resolves() {
        let provider = ConfigurationProvider::new().with_env_layer(AppOverrides {
            http_port: Some(0),
            ..Default::default()
        });
        assert!(matches!(
            provider.resolve("production"),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "HttpPort"
        ));

        let from_vars = AppOverrides::from_vars([("POOL_STRATUM_PORT", "0")]);
        assert!(from_vars.is_err());

        let table: OverrideTable =
            serde_yaml::from_str("production:\n  APP:\n    StratumPort: 0\n").unwrap();
        let provider = ConfigurationProvider::new().with_overrides(table);
        assert!(provider.resolve("production").is_err());
        assert!(provider.resolve("test").is_ok());
    }

    #[test]
    fn test_resolve_all() {
        let records = ConfigurationProvider::new().resolve_all().unwrap();
        let names: Vec<_> = records.iter().map(|r| r.environment.to_string()).collect();
        assert_eq!(names, vec!["development", "test", "production"]);
    }
}
