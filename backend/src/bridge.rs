//! Stratum bridge start-up configuration.
//!
//! The bridge connects mining clients (stratum) to a kaspad node. Its
//! settings come from `config.yaml`, command-line flags override the
//! file, and [`BridgeConfig::normalize`] fills in and clamps the values
//! the listener actually runs with.
//!
//! ```yaml
//! stratum_port: ":5555"
//! kaspad_address: "localhost:16110"
//! log_to_file: true
//! block_wait_time: 500ms
//! min_share_diff: 4
//! extranonce_size: 0
//! pool_wallet: ""
//! ora_connstr: 'user="pool" password="secret" connectString="tns"'
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_STRATUM_PORT: &str = ":5555";
pub const DEFAULT_KASPAD_ADDRESS: &str = "localhost:16110";
pub const DEFAULT_MIN_SHARE_DIFF: u32 = 4;

/// Used when the file leaves `block_wait_time` at zero.
pub const FALLBACK_BLOCK_WAIT: Duration = Duration::from_secs(5);
pub const MIN_BLOCK_WAIT: Duration = Duration::from_millis(500);
pub const MAX_EXTRANONCE_SIZE: u32 = 3;

static PASSWORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"password=".*?""#).expect("Invalid password pattern"));

/// Settings the stratum bridge is started with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listen address for miners, e.g. `:5555`.
    pub stratum_port: String,

    /// kaspad RPC address.
    #[serde(rename = "kaspad_address")]
    pub rpc_server: String,

    /// Write errors to `bridge.log` instead of the console.
    #[serde(rename = "log_to_file")]
    pub use_log_file: bool,

    /// Wait before manually requesting a new block template.
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub block_wait_time: Duration,

    /// Minimum share difficulty accepted from miners.
    pub min_share_diff: u32,

    /// Extranonce size in bytes.
    pub extranonce_size: u32,

    /// Pool payout wallet. Empty means the client's own wallet.
    pub pool_wallet: String,

    /// Connect string of the share database.
    #[serde(rename = "ora_connstr")]
    pub db_connect: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            stratum_port: DEFAULT_STRATUM_PORT.to_string(),
            rpc_server: DEFAULT_KASPAD_ADDRESS.to_string(),
            use_log_file: true,
            block_wait_time: Duration::ZERO,
            min_share_diff: DEFAULT_MIN_SHARE_DIFF,
            extranonce_size: 0,
            pool_wallet: String::new(),
            db_connect: String::new(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct BridgeFlags {
    pub stratum_port: Option<String>,
    pub rpc_server: Option<String>,
    pub block_wait_time: Option<Duration>,
    pub min_share_diff: Option<u32>,
    pub extranonce_size: Option<u32>,
    pub use_log_file: Option<bool>,
    pub pool_wallet: Option<String>,
    pub db_connect: Option<String>,
}

impl BridgeConfig {
    /// Read a YAML file. An empty file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply_flags(&mut self, flags: BridgeFlags) {
        if let Some(port) = flags.stratum_port {
            self.stratum_port = port;
        }
        if let Some(server) = flags.rpc_server {
            self.rpc_server = server;
        }
        if let Some(wait) = flags.block_wait_time {
            self.block_wait_time = wait;
        }
        if let Some(diff) = flags.min_share_diff {
            self.min_share_diff = diff;
        }
        if let Some(size) = flags.extranonce_size {
            self.extranonce_size = size;
        }
        if let Some(log) = flags.use_log_file {
            self.use_log_file = log;
        }
        if let Some(wallet) = flags.pool_wallet {
            self.pool_wallet = wallet;
        }
        if let Some(connect) = flags.db_connect {
            self.db_connect = connect;
        }
    }

    /// Effective settings: zero values replaced, limits enforced.
    pub fn normalize(mut self) -> Self {
        if self.min_share_diff == 0 {
            self.min_share_diff = DEFAULT_MIN_SHARE_DIFF;
        }
        if self.block_wait_time.is_zero() {
            self.block_wait_time = FALLBACK_BLOCK_WAIT;
        }

        self.block_wait_time = self.block_wait_time.max(MIN_BLOCK_WAIT);
        self.min_share_diff = self.min_share_diff.max(1);
        self.extranonce_size = self.extranonce_size.min(MAX_EXTRANONCE_SIZE);
        self
    }

    /// Connect string with every `password="..."` hidden.
    pub fn masked_connect_string(&self) -> String {
        mask_passwords(&self.db_connect)
    }

    /// Start-up banner, one setting per line.
    pub fn summary_lines(&self) -> Vec<String> {
        let wallet = if self.pool_wallet.is_empty() {
            "(client wallet)"
        } else {
            self.pool_wallet.as_str()
        };

        vec![
            format!("kaspad:          {}", self.rpc_server),
            format!("stratum:         {}", self.stratum_port),
            format!("log:             {}", self.use_log_file),
            format!("min diff:        {}", self.min_share_diff),
            format!("block wait:      {:?}", self.block_wait_time),
            format!("extranonce size: {}", self.extranonce_size),
            format!("pool wallet:     {}", wallet),
            format!("db connect:      {}", self.masked_connect_string()),
        ]
    }
}

pub fn mask_passwords(connect: &str) -> String {
    PASSWORD_PATTERN
        .replace_all(connect, r#"password="***""#)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.stratum_port, ":5555");
        assert_eq!(cfg.rpc_server, "localhost:16110");
        assert!(cfg.use_log_file);
        assert_eq!(cfg.min_share_diff, 4);
        assert_eq!(cfg.extranonce_size, 0);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "stratum_port: \":18030\"\nkaspad_address: \"10.0.0.2:16110\"\nlog_to_file: false\nblock_wait_time: 750ms\nmin_share_diff: 8\npool_wallet: kaspa:qpool"
        )
        .unwrap();

        let cfg = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(cfg.stratum_port, ":18030");
        assert_eq!(cfg.rpc_server, "10.0.0.2:16110");
        assert!(!cfg.use_log_file);
        assert_eq!(cfg.block_wait_time, Duration::from_millis(750));
        assert_eq!(cfg.min_share_diff, 8);
        assert_eq!(cfg.pool_wallet, "kaspa:qpool");
        // not in the file
        assert_eq!(cfg.extranonce_size, 0);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            BridgeConfig::load("/nonexistent/config.yaml"),
            Err(ConfigError::Io { .. })
        ));
        assert!(matches!(
            BridgeConfig::from_yaml_str("min_share_diff: [1, 2]"),
            Err(ConfigError::Yaml(_))
        ));
        assert_eq!(BridgeConfig::from_yaml_str("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let mut cfg = BridgeConfig::from_yaml_str("stratum_port: \":1111\"\nmin_share_diff: 2").unwrap();
        cfg.apply_flags(BridgeFlags {
            stratum_port: Some(":2222".into()),
            use_log_file: Some(false),
            ..Default::default()
        });
        assert_eq!(cfg.stratum_port, ":2222");
        assert!(!cfg.use_log_file);
        assert_eq!(cfg.min_share_diff, 2);
    }

    #[test]
    fn test_normalize_fills_zero_values() {
        let cfg = BridgeConfig {
            min_share_diff: 0,
            block_wait_time: Duration::ZERO,
            ..Default::default()
        }
        .normalize();
        assert_eq!(cfg.min_share_diff, 4);
        assert_eq!(cfg.block_wait_time, Duration::from_secs(5));
    }

    #[test]
    fn test_normalize_clamps() {
        let cfg = BridgeConfig {
            block_wait_time: Duration::from_millis(100),
            extranonce_size: 9,
            ..Default::default()
        }
        .normalize();
        assert_eq!(cfg.block_wait_time, Duration::from_millis(500));
        assert_eq!(cfg.extranonce_size, 3);

        let kept = BridgeConfig {
            block_wait_time: Duration::from_secs(2),
            extranonce_size: 2,
            ..Default::default()
        }
        .normalize();
        assert_eq!(kept.block_wait_time, Duration::from_secs(2));
        assert_eq!(kept.extranonce_size, 2);
    }

    #[test]
    fn test_masks_password() {
        let masked = mask_passwords(
            r#"user="pool" password="figAn3Write+2" connectString="cft3" noTimezoneCheck=true"#,
        );
        assert_eq!(
            masked,
            r#"user="pool" password="***" connectString="cft3" noTimezoneCheck=true"#
        );
        assert_eq!(mask_passwords("no secrets here"), "no secrets here");
    }

    #[test]
    fn test_summary_hides_password() {
        let cfg = BridgeConfig {
            db_connect: r#"user="u" password="p""#.into(),
            ..Default::default()
        };
        let banner = cfg.summary_lines().join("\n");
        assert!(banner.contains(r#"password="***""#));
        assert!(!banner.contains(r#"password="p""#));
        assert!(banner.contains("(client wallet)"));
    }
}
