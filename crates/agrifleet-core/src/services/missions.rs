// ── Mission endpoints ──

use std::sync::Arc;

use agrifleet_api::{ApiClient, Error, Page};
use serde::{Deserialize, Serialize};

use crate::command::{MissionDraft, MissionUpdate, WaypointDraft, WaypointOrder, WaypointUpdate};
use crate::model::{Mission, MissionStatus, Waypoint};

/// Listing filter for `GET /api/missions`.
#[derive(Debug, Clone, Default)]
pub struct MissionFilter {
    pub status: Option<MissionStatus>,
    pub robot_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl MissionFilter {
    pub fn with_status(status: MissionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(robot_id) = &self.robot_id {
            params.push(("robotId", robot_id.clone()));
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

/// Result of server-side mission validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionValidation {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Server-side time/distance estimate for a mission plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionEstimate {
    /// Seconds.
    pub estimated_time: u64,
    /// Meters.
    pub distance: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBody<'a> {
    robot_id: &'a str,
}

#[derive(Serialize)]
struct CloneBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct ReorderBody<'a> {
    waypoints: &'a [WaypointOrder],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FromTemplateBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a serde_json::Value>,
}

/// Typed facade for `/api/missions`.
#[derive(Clone)]
pub struct MissionsService {
    api: Arc<ApiClient>,
}

impl MissionsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self, filter: &MissionFilter) -> Result<Page<Mission>, Error> {
        self.api
            .get_paginated("api/missions", &filter.to_params())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Mission, Error> {
        self.api.get(&format!("api/missions/{id}")).await
    }

    pub async fn create(&self, draft: &MissionDraft) -> Result<Mission, Error> {
        self.api.post("api/missions", draft).await
    }

    pub async fn update(&self, id: &str, updates: &MissionUpdate) -> Result<Mission, Error> {
        self.api.put(&format!("api/missions/{id}"), updates).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.api.delete(&format!("api/missions/{id}")).await
    }

    pub async fn clone_mission(&self, id: &str, name: &str) -> Result<Mission, Error> {
        self.api
            .post(&format!("api/missions/{id}/clone"), &CloneBody { name })
            .await
    }

    // ── Waypoints ────────────────────────────────────────────────────

    pub async fn waypoints(&self, id: &str) -> Result<Vec<Waypoint>, Error> {
        self.api.get(&format!("api/missions/{id}/waypoints")).await
    }

    pub async fn add_waypoint(
        &self,
        mission_id: &str,
        draft: &WaypointDraft,
    ) -> Result<Waypoint, Error> {
        self.api
            .post(&format!("api/missions/{mission_id}/waypoints"), draft)
            .await
    }

    pub async fn update_waypoint(
        &self,
        mission_id: &str,
        waypoint_id: &str,
        updates: &WaypointUpdate,
    ) -> Result<Waypoint, Error> {
        self.api
            .put(
                &format!("api/missions/{mission_id}/waypoints/{waypoint_id}"),
                updates,
            )
            .await
    }

    pub async fn delete_waypoint(&self, mission_id: &str, waypoint_id: &str) -> Result<(), Error> {
        self.api
            .delete(&format!("api/missions/{mission_id}/waypoints/{waypoint_id}"))
            .await
    }

    pub async fn reorder_waypoints(
        &self,
        mission_id: &str,
        waypoints: &[WaypointOrder],
    ) -> Result<(), Error> {
        self.api
            .put_empty(
                &format!("api/missions/{mission_id}/waypoints/reorder"),
                &ReorderBody { waypoints },
            )
            .await
    }

    // ── Mission control ──────────────────────────────────────────────

    pub async fn start(&self, id: &str, robot_id: &str) -> Result<(), Error> {
        self.api
            .post_empty(&format!("api/missions/{id}/start"), &StartBody { robot_id })
            .await
    }

    pub async fn pause(&self, id: &str) -> Result<(), Error> {
        self.api
            .post_empty(&format!("api/missions/{id}/pause"), &serde_json::json!({}))
            .await
    }

    pub async fn resume(&self, id: &str) -> Result<(), Error> {
        self.api
            .post_empty(&format!("api/missions/{id}/resume"), &serde_json::json!({}))
            .await
    }

    pub async fn stop(&self, id: &str) -> Result<(), Error> {
        self.api
            .post_empty(&format!("api/missions/{id}/stop"), &serde_json::json!({}))
            .await
    }

    // ── Templates ────────────────────────────────────────────────────

    pub async fn templates(&self) -> Result<Vec<Mission>, Error> {
        self.api.get("api/missions/templates").await
    }

    pub async fn create_from_template(
        &self,
        template_id: &str,
        name: &str,
        parameters: Option<&serde_json::Value>,
    ) -> Result<Mission, Error> {
        self.api
            .post(
                &format!("api/missions/templates/{template_id}/create"),
                &FromTemplateBody { name, parameters },
            )
            .await
    }

    // ── Planning helpers ─────────────────────────────────────────────

    pub async fn validate(&self, mission: &Mission) -> Result<MissionValidation, Error> {
        self.api.post("api/missions/validate", mission).await
    }

    pub async fn estimate(&self, mission: &Mission) -> Result<MissionEstimate, Error> {
        self.api.post("api/missions/estimate", mission).await
    }
}
