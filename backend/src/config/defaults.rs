//! Environment-invariant defaults.

use std::collections::BTreeMap;

use super::record::{AppSettings, ConfigurationRecord, EmberEnv, LocationType};
use crate::environment::Environment;

pub const MODULE_PREFIX: &str = "open-social-pool";
pub const ROOT_URL: &str = "/kaspa/";

pub const API_URL: &str = "/kaspa/";
pub const POOL_NAME: &str = "KASPA SOLO !!! BETA !!!";
pub const COMPANY_NAME: &str = "Mine to buy a cool car :-)";

pub const HTTP_HOST: &str = "http://pool.lamba.top";
pub const HTTP_PORT: u16 = 18830;

pub const STRATUM_HOST: &str = "pool.lamba.top";
pub const STRATUM_PORT: u16 = 18030;

pub const POOL_FEE: &str = "0.5%";
pub const PAYOUT_THRESHOLD: &str = "1.0";
pub const PAYOUT_INTERVAL: &str = "30m";

// Network hashrate inputs; change for another fork.
pub const BLOCK_TIME: f64 = 1.0;
pub const BLOCK_REWARD: f64 = 1.0;
pub const UNIT: &str = "KASPA";

/// Default pool settings.
pub fn app_settings() -> AppSettings {
    AppSettings {
        api_url: API_URL.to_string(),
        pool_name: POOL_NAME.to_string(),
        company_name: COMPANY_NAME.to_string(),
        http_host: HTTP_HOST.to_string(),
        http_port: HTTP_PORT,
        stratum_host: STRATUM_HOST.to_string(),
        stratum_port: STRATUM_PORT,
        pool_fee: POOL_FEE.to_string(),
        payout_threshold: PAYOUT_THRESHOLD.to_string(),
        payout_interval: PAYOUT_INTERVAL.to_string(),
        block_time: BLOCK_TIME,
        block_reward: BLOCK_REWARD,
        unit: UNIT.to_string(),
    }
}

/// The record every environment starts from.
pub fn base_record(environment: Environment) -> ConfigurationRecord {
    ConfigurationRecord {
        module_prefix: MODULE_PREFIX.to_string(),
        environment,
        root_url: ROOT_URL.to_string(),
        location_type: LocationType::Hash,
        ember_env: EmberEnv {
            features: BTreeMap::new(),
        },
        app: app_settings(),
    }
}
