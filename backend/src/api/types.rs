//! REST API types for the dashboard.
//!
//! Configuration records are returned as-is; their serialized form is
//! what the dashboard reads at start-up.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::environment::Environment;

/// Query string of `GET /api/config`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigQuery {
    /// Falls back to the server's environment when absent.
    pub environment: Option<String>,
}

/// Response of `GET /api/environments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentsResponse {
    /// Environment served at `/config/environment`.
    pub current: String,
    /// Recognized environment names.
    pub known: Vec<String>,
    /// Whether unknown names are refused.
    pub strict: bool,
}

impl EnvironmentsResponse {
    pub fn new(current: &Environment, strict: bool) -> Self {
        Self {
            current: current.to_string(),
            known: Environment::KNOWN.iter().map(|e| e.to_string()).collect(),
            strict,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let body = error_response("Unknown environment: 'qa'");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Unknown environment: 'qa'");
        assert_eq!(body["requestId"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_environments_response() {
        let body = EnvironmentsResponse::new(&Environment::Production, true);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["current"], "production");
        assert_eq!(json["known"], json!(["development", "test", "production"]));
        assert_eq!(json["strict"], true);
    }
}
