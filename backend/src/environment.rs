//! Deployment environments.
//!
//! The dashboard knows three environments. Any other name is carried
//! through verbatim so that a lenient lookup can still echo it back in
//! the resolved record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Named deployment context selecting configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
    /// Unrecognized name, kept exactly as given.
    Other(String),
}

impl Environment {
    /// The recognized environments, in declaration order.
    pub const KNOWN: [Environment; 3] = [
        Environment::Development,
        Environment::Test,
        Environment::Production,
    ];

    /// Lenient parse: exact, case-sensitive match, anything else is `Other`.
    pub fn parse(name: &str) -> Self {
        match name {
            "development" => Environment::Development,
            "test" => Environment::Test,
            "production" => Environment::Production,
            other => Environment::Other(other.to_string()),
        }
    }

    /// Strict parse: fails on names outside the closed set.
    pub fn parse_strict(name: &str) -> ConfigResult<Self> {
        match Self::parse(name) {
            Environment::Other(name) => Err(ConfigError::UnknownEnvironment(name)),
            env => Ok(env),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
            Environment::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Environment::Other(_))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Environment {
    fn from(name: &str) -> Self {
        Environment::parse(name)
    }
}

impl From<String> for Environment {
    fn from(name: String) -> Self {
        Environment::parse(&name)
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("test"), Environment::Test);
        assert_eq!(Environment::parse("production"), Environment::Production);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let env = Environment::parse("Production");
        assert_eq!(env, Environment::Other("Production".into()));
        assert!(!env.is_known());
        assert_eq!(env.as_str(), "Production");
    }

    #[test]
    fn test_parse_strict_rejects_unknown() {
        assert!(Environment::parse_strict("test").is_ok());
        match Environment::parse_strict("staging") {
            Err(ConfigError::UnknownEnvironment(name)) => assert_eq!(name, "staging"),
            other => panic!("expected UnknownEnvironment, got {:?}", other),
        }
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Environment::Production).unwrap();
        assert_eq!(json, "\"production\"");

        let back: Environment = serde_json::from_str("\"qa\"").unwrap();
        assert_eq!(back, Environment::Other("qa".into()));
    }
}
