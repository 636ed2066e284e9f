use serde::{Deserialize, Serialize};

/// Response for the health endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving
    pub status: String,
    /// Crate version
    pub version: String,
    /// Unix timestamp of the check
    pub timestamp: i64,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}
