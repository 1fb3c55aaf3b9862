// ── Backend status endpoints ──

use std::sync::Arc;
use std::time::Instant;

use agrifleet_api::{ApiClient, Error};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{HealthCheck, PingResult, SystemStatus};

#[derive(Deserialize)]
struct PingResponse {
    timestamp: DateTime<Utc>,
}

/// Typed facade for `/api/status`, `/api/health`, and `/api/ping`.
#[derive(Clone)]
pub struct StatusService {
    api: Arc<ApiClient>,
}

impl StatusService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn system_status(&self) -> Result<SystemStatus, Error> {
        self.api.get("api/status").await
    }

    pub async fn health(&self) -> Result<Vec<HealthCheck>, Error> {
        self.api.get("api/health").await
    }

    /// Ping the backend; the round-trip latency is measured client-side
    /// around the request.
    pub async fn ping(&self) -> Result<PingResult, Error> {
        let started = Instant::now();
        let resp: PingResponse = self.api.get("api/ping").await?;
        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = started.elapsed().as_millis() as u64;

        Ok(PingResult {
            latency_ms,
            timestamp: resp.timestamp,
        })
    }

    /// Ask the backend to probe one of its configured endpoints.
    pub async fn test_connection(&self, endpoint: &str) -> Result<bool, Error> {
        self.api
            .get_with_params("api/test-connection", &[("endpoint", endpoint.to_owned())])
            .await
    }
}
