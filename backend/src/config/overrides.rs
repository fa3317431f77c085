//! Per-environment overrides and the merge step.
//!
//! An override names only the fields it changes, using the same keys as
//! the serialized record:
//!
//! ```yaml
//! production:
//!   rootURL: /pool/
//!   APP:
//!     StratumPort: 18031
//!   EmberENV:
//!     FEATURES:
//!       with-controller: true
//! ```
//!
//! Scalars replace the base value, feature flags merge key by key.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::{AppSettings, ConfigurationRecord, LocationType};
use crate::environment::Environment;
use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Record Overrides
// =============================================================================

/// Subset of record fields to replace for one environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(rename = "modulePrefix", skip_serializing_if = "Option::is_none")]
    pub module_prefix: Option<String>,

    #[serde(rename = "rootURL", skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,

    #[serde(rename = "locationType", skip_serializing_if = "Option::is_none")]
    pub location_type: Option<LocationType>,

    #[serde(rename = "EmberENV", skip_serializing_if = "Option::is_none")]
    pub ember_env: Option<EmberEnvOverrides>,

    #[serde(rename = "APP", skip_serializing_if = "Option::is_none")]
    pub app: Option<AppOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmberEnvOverrides {
    #[serde(rename = "FEATURES", default)]
    pub features: BTreeMap<String, bool>,
}

impl ConfigOverrides {
    /// Merge into `record` in place.
    pub fn apply(&self, record: &mut ConfigurationRecord) {
        set(&mut record.module_prefix, &self.module_prefix);
        set(&mut record.root_url, &self.root_url);
        set(&mut record.location_type, &self.location_type);

        if let Some(ember_env) = &self.ember_env {
            record.ember_env.features.extend(
                ember_env
                    .features
                    .iter()
                    .map(|(flag, enabled)| (flag.clone(), *enabled)),
            );
        }

        if let Some(app) = &self.app {
            app.apply(&mut record.app);
        }
    }

    /// Number of fields this override touches.
    pub fn len(&self) -> usize {
        let top = [
            self.module_prefix.is_some(),
            self.root_url.is_some(),
            self.location_type.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();

        let features = self.ember_env.as_ref().map_or(0, |e| e.features.len());
        let app = self.app.as_ref().map_or(0, AppOverrides::len);

        top + features + app
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject values no record may hold.
    pub fn check(&self) -> ConfigResult<()> {
        match &self.app {
            Some(app) => app.check(),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Pool Setting Overrides
// =============================================================================

/// Subset of [`AppSettings`] to replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct AppOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stratum_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stratum_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout_threshold: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reward: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl AppOverrides {
    pub fn apply(&self, app: &mut AppSettings) {
        set(&mut app.api_url, &self.api_url);
        set(&mut app.pool_name, &self.pool_name);
        set(&mut app.company_name, &self.company_name);
        set(&mut app.http_host, &self.http_host);
        set(&mut app.http_port, &self.http_port);
        set(&mut app.stratum_host, &self.stratum_host);
        set(&mut app.stratum_port, &self.stratum_port);
        set(&mut app.pool_fee, &self.pool_fee);
        set(&mut app.payout_threshold, &self.payout_threshold);
        set(&mut app.payout_interval, &self.payout_interval);
        set(&mut app.block_time, &self.block_time);
        set(&mut app.block_reward, &self.block_reward);
        set(&mut app.unit, &self.unit);
    }

    pub fn len(&self) -> usize {
        [
            self.api_url.is_some(),
            self.pool_name.is_some(),
            self.company_name.is_some(),
            self.http_host.is_some(),
            self.http_port.is_some(),
            self.stratum_host.is_some(),
            self.stratum_port.is_some(),
            self.pool_fee.is_some(),
            self.payout_threshold.is_some(),
            self.payout_interval.is_some(),
            self.block_time.is_some(),
            self.block_reward.is_some(),
            self.unit.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ports must be positive.
    pub fn check(&self) -> ConfigResult<()> {
        check_port("HttpPort", self.http_port)?;
        check_port("StratumPort", self.stratum_port)
    }

    /// Build from `POOL_*` variables. Other variables are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = Self::default();

        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                "POOL_API_URL" => overrides.api_url = Some(value.to_string()),
                "POOL_NAME" => overrides.pool_name = Some(value.to_string()),
                "POOL_COMPANY_NAME" => overrides.company_name = Some(value.to_string()),
                "POOL_HTTP_HOST" => overrides.http_host = Some(value.to_string()),
                "POOL_HTTP_PORT" => overrides.http_port = Some(parse_port("POOL_HTTP_PORT", value)?),
                "POOL_STRATUM_HOST" => overrides.stratum_host = Some(value.to_string()),
                "POOL_STRATUM_PORT" => {
                    overrides.stratum_port = Some(parse_port("POOL_STRATUM_PORT", value)?)
                }
                "POOL_FEE" => overrides.pool_fee = Some(value.to_string()),
                "POOL_PAYOUT_THRESHOLD" => overrides.payout_threshold = Some(value.to_string()),
                "POOL_PAYOUT_INTERVAL" => overrides.payout_interval = Some(value.to_string()),
                "POOL_BLOCK_TIME" => {
                    overrides.block_time = Some(parse_var("POOL_BLOCK_TIME", value)?)
                }
                "POOL_BLOCK_REWARD" => {
                    overrides.block_reward = Some(parse_var("POOL_BLOCK_REWARD", value)?)
                }
                "POOL_UNIT" => overrides.unit = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(overrides)
    }

    /// Build from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(std::env::vars())
    }
}

fn parse_var<T>(name: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::invalid(name, format!("'{}': {}", value, e)))
}

fn parse_port(name: &str, value: &str) -> ConfigResult<u16> {
    let port = parse_var(name, value)?;
    check_port(name, Some(port))?;
    Ok(port)
}

fn check_port(field: &str, port: Option<u16>) -> ConfigResult<()> {
    if port == Some(0) {
        return Err(ConfigError::invalid(field, "port must be positive"));
    }
    Ok(())
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

// =============================================================================
// Override Table
// =============================================================================

/// Overrides keyed by environment name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    entries: BTreeMap<String, ConfigOverrides>,
}

impl OverrideTable {
    /// The table compiled into the binary: one empty branch per environment.
    pub fn builtin() -> Self {
        let entries = Environment::KNOWN
            .iter()
            .map(|env| (env.as_str().to_string(), ConfigOverrides::default()))
            .collect();
        Self { entries }
    }

    /// Branch for `environment`. Unknown environments never match.
    pub fn get(&self, environment: &Environment) -> Option<&ConfigOverrides> {
        if !environment.is_known() {
            return None;
        }
        self.entries.get(environment.as_str())
    }

    pub fn insert(&mut self, environment: Environment, overrides: ConfigOverrides) -> ConfigResult<()> {
        if !environment.is_known() {
            return Err(ConfigError::UnknownEnvironment(environment.to_string()));
        }
        overrides.check()?;
        self.entries.insert(environment.to_string(), overrides);
        Ok(())
    }

    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let table: Self = serde_json::from_str(content)?;
        table.checked()
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let table: Self = serde_yaml::from_str(content)?;
        table.checked()
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_str() {
            "json" => Self::from_json_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn checked(self) -> ConfigResult<Self> {
        if let Some(name) = self
            .entries
            .keys()
            .find(|name| !Environment::parse(name).is_known())
        {
            return Err(ConfigError::UnknownEnvironment(name.clone()));
        }
        for overrides in self.entries.values() {
            overrides.check()?;
        }
        Ok(self)
    }
}
