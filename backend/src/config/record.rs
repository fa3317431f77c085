//! The configuration record handed to the pool dashboard.
//!
//! Field names serialize exactly as the dashboard reads them
//! (`modulePrefix`, `rootURL`, `EmberENV.FEATURES`, `APP.StratumPort`, ...).

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::environment::Environment;
use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Configuration Record
// =============================================================================

/// Complete, immutable settings for one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    /// Identifier of the owning application.
    #[serde(rename = "modulePrefix")]
    pub module_prefix: String,

    /// The environment this record was resolved for, verbatim.
    pub environment: Environment,

    /// Base path prefix for routing.
    #[serde(rename = "rootURL")]
    pub root_url: String,

    /// URL addressing strategy.
    #[serde(rename = "locationType")]
    pub location_type: LocationType,

    /// Framework-level settings (feature flags).
    #[serde(rename = "EmberENV")]
    pub ember_env: EmberEnv,

    /// Pool settings shown by the dashboard.
    #[serde(rename = "APP")]
    pub app: AppSettings,
}

impl ConfigurationRecord {
    /// Feature flags, by name.
    pub fn feature_flags(&self) -> &BTreeMap<String, bool> {
        &self.ember_env.features
    }

    /// Whether a feature flag is present and enabled.
    pub fn feature_enabled(&self, flag: &str) -> bool {
        self.ember_env.features.get(flag).copied().unwrap_or(false)
    }
}

// =============================================================================
// Location Type
// =============================================================================

/// How the dashboard encodes its routes in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    /// `#/route` fragments.
    Hash,
    /// HTML5 history API.
    History,
    /// History when supported, hash otherwise.
    Auto,
    /// No URL updates.
    None,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Hash => "hash",
            LocationType::History => "history",
            LocationType::Auto => "auto",
            LocationType::None => "none",
        }
    }
}

// =============================================================================
// Framework Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmberEnv {
    /// Experimental feature switches, empty by default.
    #[serde(rename = "FEATURES", default)]
    pub features: BTreeMap<String, bool>,
}

// =============================================================================
// Pool Settings
// =============================================================================

/// Endpoints, fees and payout parameters of the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppSettings {
    /// API base URL used by the dashboard.
    pub api_url: String,
    pub pool_name: String,
    pub company_name: String,

    /// HTTP mining endpoint.
    pub http_host: String,
    pub http_port: u16,

    /// Stratum mining endpoint.
    pub stratum_host: String,
    pub stratum_port: u16,

    /// Fee as a percentage string, e.g. `"0.5%"`.
    pub pool_fee: String,
    /// Minimum balance before a payout, as a decimal string.
    pub payout_threshold: String,
    /// Time between payouts, Go duration notation.
    pub payout_interval: String,

    /// Used for the network hashrate estimate.
    pub block_time: f64,
    pub block_reward: f64,
    /// Coin ticker.
    pub unit: String,
}

impl AppSettings {
    /// Address miners point their software at.
    pub fn stratum_url(&self) -> String {
        format!("stratum+tcp://{}:{}", self.stratum_host, self.stratum_port)
    }

    /// HTTP mining endpoint with its port.
    pub fn http_endpoint(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Numeric fee, `0.5` for `"0.5%"`.
    pub fn pool_fee_percent(&self) -> ConfigResult<f64> {
        let number = self
            .pool_fee
            .trim()
            .strip_suffix('%')
            .ok_or_else(|| ConfigError::invalid("PoolFee", "must end with '%'"))?;
        number
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::invalid("PoolFee", e.to_string()))
    }

    /// Numeric payout threshold in coin units.
    pub fn payout_threshold_value(&self) -> ConfigResult<f64> {
        self.payout_threshold
            .trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::invalid("PayoutThreshold", e.to_string()))
    }

    pub fn payout_interval_duration(&self) -> ConfigResult<Duration> {
        parse_duration(&self.payout_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::base_record;

    #[test]
    fn test_serialized_field_names() {
        let record = base_record(Environment::Production);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["modulePrefix"], "open-social-pool");
        assert_eq!(json["environment"], "production");
        assert_eq!(json["rootURL"], "/kaspa/");
        assert_eq!(json["locationType"], "hash");
        assert!(json["EmberENV"]["FEATURES"].as_object().unwrap().is_empty());
        assert_eq!(json["APP"]["ApiUrl"], "/kaspa/");
        assert_eq!(json["APP"]["StratumHost"], "pool.lamba.top");
        assert_eq!(json["APP"]["StratumPort"], 18030);
        assert_eq!(json["APP"]["HttpPort"], 18830);
        assert_eq!(json["APP"]["PoolFee"], "0.5%");
        assert_eq!(json["APP"]["Unit"], "KASPA");
    }

    #[test]
    fn test_derived_values() {
        let app = base_record(Environment::Development).app;

        assert_eq!(app.stratum_url(), "stratum+tcp://pool.lamba.top:18030");
        assert_eq!(app.http_endpoint(), "http://pool.lamba.top:18830");
        assert!((app.pool_fee_percent().unwrap() - 0.5).abs() < f64::EPSILON);
        assert!((app.payout_threshold_value().unwrap() - 1.0).abs() < f64::EPSILON);
        assert_eq!(app.payout_interval_duration().unwrap(), Duration::from_secs(1800));
    }

    #[test]
    fn test_fee_without_percent_sign() {
        let mut app = base_record(Environment::Development).app;
        app.pool_fee = "0.5".into();
        assert!(matches!(
            app.pool_fee_percent(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "PoolFee"
        ));
    }

    #[test]
    fn test_feature_lookup() {
        let mut record = base_record(Environment::Test);
        assert!(!record.feature_enabled("with-controller"));

        record.ember_env.features.insert("with-controller".into(), true);
        assert!(record.feature_enabled("with-controller"));
        assert_eq!(record.feature_flags().len(), 1);
    }
}
