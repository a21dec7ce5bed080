use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::profile_store::ProfileStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub profiles: String,
}

pub struct HealthHandler {
    store: Arc<ProfileStore>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(store: Arc<ProfileStore>) -> Self {
        Self {
            store,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if the server is running.
    pub async fn health(&self) -> impl IntoResponse {
        let uptime = self.start_time.elapsed().as_secs();
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            checks: HealthChecks {
                profiles: "ok".to_string(),
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - the server can only answer schema requests once
    /// profiles are loaded.
    pub async fn ready(&self) -> impl IntoResponse {
        let profile_count = self.store.names().await.len();
        if profile_count > 0 {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ready",
                    "profiles": profile_count,
                })),
            )
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not ready",
                    "profiles": 0,
                })),
            )
        }
    }

    /// Liveness check - returns 200 if the process is responsive.
    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({ "status": "alive" })))
    }
}
