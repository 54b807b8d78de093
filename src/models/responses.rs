use serde::{Deserialize, Serialize};
use crate::models::domain::MatchOutcome;

/// Response for the blacklist check endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckBlacklistResponse {
    pub blacklisted: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    pub match_type: String,
}

impl From<MatchOutcome> for CheckBlacklistResponse {
    fn from(outcome: MatchOutcome) -> Self {
        Self {
            blacklisted: outcome.is_blacklisted(),
            details: outcome.details().to_string(),
            match_type: outcome.match_kind().as_str().to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: bool,
    pub cache: bool,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
