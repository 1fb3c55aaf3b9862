// ── Alert endpoints ──

use std::sync::Arc;

use agrifleet_api::{ApiClient, Error, Page};
use serde::Serialize;

use crate::model::{Alert, AlertKind, AlertSeverity};

/// Listing filter for `GET /api/alerts`.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub severity: Option<AlertSeverity>,
    pub kind: Option<AlertKind>,
    pub robot_id: Option<String>,
    pub acknowledged: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AlertFilter {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(severity) = self.severity {
            params.push(("severity", severity.to_string()));
        }
        if let Some(kind) = self.kind {
            params.push(("type", kind.to_string()));
        }
        if let Some(robot_id) = &self.robot_id {
            params.push(("robotId", robot_id.clone()));
        }
        if let Some(acknowledged) = self.acknowledged {
            params.push(("acknowledged", acknowledged.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[derive(Serialize)]
struct ResolveBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<&'a str>,
}

/// Typed facade for `/api/alerts`.
#[derive(Clone)]
pub struct AlertsService {
    api: Arc<ApiClient>,
}

impl AlertsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self, filter: &AlertFilter) -> Result<Page<Alert>, Error> {
        self.api
            .get_paginated("api/alerts", &filter.to_params())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Alert, Error> {
        self.api.get(&format!("api/alerts/{id}")).await
    }

    /// Acknowledge an alert; the backend returns the updated record.
    pub async fn acknowledge(&self, id: &str) -> Result<Alert, Error> {
        self.api
            .put_no_body(&format!("api/alerts/{id}/acknowledge"))
            .await
    }

    /// Resolve an alert (implies acknowledgement server-side too).
    pub async fn resolve(&self, id: &str, resolution: Option<&str>) -> Result<Alert, Error> {
        self.api
            .put(
                &format!("api/alerts/{id}/resolve"),
                &ResolveBody { resolution },
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.api.delete(&format!("api/alerts/{id}")).await
    }

    pub async fn unacknowledged_count(&self) -> Result<u64, Error> {
        self.api.get("api/alerts/unacknowledged/count").await
    }
}
