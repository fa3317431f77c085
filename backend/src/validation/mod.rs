//! Validation of resolved configuration records.
//!
//! Two passes, both collected into one error list:
//!
//! 1. Typed checks on the record (ports, fee percentage, durations, ...)
//! 2. JSON Schema Draft 7 validation of the serialized record
//!
//! The schema is embedded at compile time from
//! `schemas/pool-config.json`.
//!
//! # Example
//!
//! ```rust,ignore
//! use kaspapool::{get_configuration, validate_record};
//!
//! let record = get_configuration("production");
//! assert!(validate_record(&record).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::config::ConfigurationRecord;

static POOL_CONFIG_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/pool-config.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a serialized record against the embedded schema only.
pub fn validate_config_json(data: &Value) -> Result<(), Vec<String>> {
    validate(&POOL_CONFIG_SCHEMA, data)
}

/// Run the typed checks and the schema check on a record.
pub fn validate_record(record: &ConfigurationRecord) -> Result<(), Vec<String>> {
    let mut errors = typed_checks(record);

    match serde_json::to_value(record) {
        Ok(json) => {
            if let Err(schema_errors) = validate_config_json(&json) {
                errors.extend(schema_errors);
            }
        }
        Err(e) => errors.push(format!("Record does not serialize: {}", e)),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check.
pub fn is_valid_record(record: &ConfigurationRecord) -> bool {
    validate_record(record).is_ok()
}

fn typed_checks(record: &ConfigurationRecord) -> Vec<String> {
    let app = &record.app;
    let mut errors = Vec::new();

    let required = [
        ("modulePrefix", &record.module_prefix),
        ("rootURL", &record.root_url),
        ("ApiUrl", &app.api_url),
        ("PoolName", &app.pool_name),
        ("HttpHost", &app.http_host),
        ("StratumHost", &app.stratum_host),
        ("PayoutInterval", &app.payout_interval),
        ("Unit", &app.unit),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(format!("{} must not be empty", field));
        }
    }

    if app.http_port == 0 {
        errors.push("HttpPort must be a positive integer".to_string());
    }
    if app.stratum_port == 0 {
        errors.push("StratumPort must be a positive integer".to_string());
    }

    match app.pool_fee_percent() {
        Ok(fee) if !(0.0..=100.0).contains(&fee) => {
            errors.push(format!("PoolFee must be between 0% and 100%, got {}", app.pool_fee));
        }
        Ok(_) => {}
        Err(e) => errors.push(e.to_string()),
    }

    match app.payout_threshold_value() {
        Ok(threshold) if threshold < 0.0 => {
            errors.push("PayoutThreshold must not be negative".to_string());
        }
        Ok(_) => {}
        Err(e) => errors.push(e.to_string()),
    }

    if !app.payout_interval.trim().is_empty() {
        if let Err(e) = app.payout_interval_duration() {
            errors.push(format!("PayoutInterval: {}", e));
        }
    }

    if !(app.block_time.is_finite() && app.block_time > 0.0) {
        errors.push("BlockTime must be a positive number".to_string());
    }
    if !(app.block_reward.is_finite() && app.block_reward >= 0.0) {
        errors.push("BlockReward must not be negative".to_string());
    }

    errors
}
