use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use crate::models::UserRecord;

/// Body of a successful `GET /api/admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserRecord>,
}

/// Body of every error response. `details` only appears on proxy failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Body of `GET /api/socket`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketInfo {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl SocketInfo {
    pub fn ok(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
