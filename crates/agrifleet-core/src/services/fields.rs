// ── Field endpoints ──

use std::sync::Arc;

use agrifleet_api::{ApiClient, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::{FieldDraft, FieldUpdate};
use crate::model::{Field, Position};

/// Coverage report for one field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCoverage {
    /// Percentage, 0-100.
    pub coverage: f64,
    #[serde(default)]
    pub heatmap: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct BoundariesBody<'a> {
    boundaries: &'a [Position],
}

/// Typed facade for `/api/fields`.
#[derive(Clone)]
pub struct FieldsService {
    api: Arc<ApiClient>,
}

impl FieldsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Field>, Error> {
        self.api.get("api/fields").await
    }

    pub async fn get(&self, id: &str) -> Result<Field, Error> {
        self.api.get(&format!("api/fields/{id}")).await
    }

    pub async fn create(&self, draft: &FieldDraft) -> Result<Field, Error> {
        self.api.post("api/fields", draft).await
    }

    pub async fn update(&self, id: &str, updates: &FieldUpdate) -> Result<Field, Error> {
        self.api.put(&format!("api/fields/{id}"), updates).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.api.delete(&format!("api/fields/{id}")).await
    }

    pub async fn update_boundaries(
        &self,
        id: &str,
        boundaries: &[Position],
    ) -> Result<Field, Error> {
        self.api
            .put(
                &format!("api/fields/{id}/boundaries"),
                &BoundariesBody { boundaries },
            )
            .await
    }

    /// Server-side area calculation, in hectares.
    pub async fn calculate_area(&self, boundaries: &[Position]) -> Result<f64, Error> {
        self.api
            .post("api/fields/calculate-area", &BoundariesBody { boundaries })
            .await
    }

    pub async fn coverage(
        &self,
        id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<FieldCoverage, Error> {
        let path = format!("api/fields/{id}/coverage");
        match range {
            Some((start, end)) => {
                let params = [("start", start.to_rfc3339()), ("end", end.to_rfc3339())];
                self.api.get_with_params(&path, &params).await
            }
            None => self.api.get(&path).await,
        }
    }
}
