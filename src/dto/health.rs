use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::format_system_time;

/// Health response returned by the `/health` route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("OK" or "degraded").
    pub status: String,
    /// RFC 3339 time at which the status was computed.
    pub timestamp: String,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(now: SystemTime) -> Self {
        Self {
            status: "OK".to_string(),
            timestamp: format_system_time(now),
        }
    }

    /// Create a health response indicating the store is unreachable.
    pub fn degraded(now: SystemTime) -> Self {
        Self {
            status: "degraded".to_string(),
            timestamp: format_system_time(now),
        }
    }
}
