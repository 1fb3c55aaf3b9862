// ── Robot endpoints ──

use std::sync::Arc;

use agrifleet_api::{ApiClient, Error};
use chrono::{DateTime, Utc};

use crate::command::{ComponentUpdate, RobotCommand, RobotDraft, RobotUpdate};
use crate::model::{Component, Position, Robot, Telemetry};

/// Typed facade for `/api/robots`.
#[derive(Clone)]
pub struct RobotsService {
    api: Arc<ApiClient>,
}

impl RobotsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Robot>, Error> {
        self.api.get("api/robots").await
    }

    pub async fn get(&self, id: &str) -> Result<Robot, Error> {
        self.api.get(&format!("api/robots/{id}")).await
    }

    pub async fn create(&self, draft: &RobotDraft) -> Result<Robot, Error> {
        self.api.post("api/robots", draft).await
    }

    pub async fn update(&self, id: &str, updates: &RobotUpdate) -> Result<Robot, Error> {
        self.api.put(&format!("api/robots/{id}"), updates).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.api.delete(&format!("api/robots/{id}")).await
    }

    // ── Components ───────────────────────────────────────────────────

    pub async fn components(&self, id: &str) -> Result<Vec<Component>, Error> {
        self.api.get(&format!("api/robots/{id}/components")).await
    }

    pub async fn update_component(
        &self,
        robot_id: &str,
        component_id: &str,
        updates: &ComponentUpdate,
    ) -> Result<Component, Error> {
        self.api
            .put(
                &format!("api/robots/{robot_id}/components/{component_id}"),
                updates,
            )
            .await
    }

    // ── Telemetry & position ─────────────────────────────────────────

    pub async fn telemetry_history(
        &self,
        id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Telemetry>, Error> {
        let path = format!("api/robots/{id}/telemetry");
        match range {
            Some((start, end)) => {
                let params = [
                    ("start", start.to_rfc3339()),
                    ("end", end.to_rfc3339()),
                ];
                self.api.get_with_params(&path, &params).await
            }
            None => self.api.get(&path).await,
        }
    }

    pub async fn latest_telemetry(&self, id: &str) -> Result<Vec<Telemetry>, Error> {
        self.api
            .get(&format!("api/robots/{id}/telemetry/latest"))
            .await
    }

    pub async fn position(&self, id: &str) -> Result<Position, Error> {
        self.api.get(&format!("api/robots/{id}/position")).await
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// The single command primitive every convenience below goes through.
    pub async fn send_command(
        &self,
        id: &str,
        command: &RobotCommand,
    ) -> Result<serde_json::Value, Error> {
        self.api
            .post(&format!("api/robots/{id}/command"), &command.to_request())
            .await
    }

    pub async fn arm(&self, id: &str) -> Result<(), Error> {
        self.send_command(id, &RobotCommand::Arm).await.map(|_| ())
    }

    pub async fn disarm(&self, id: &str) -> Result<(), Error> {
        self.send_command(id, &RobotCommand::Disarm)
            .await
            .map(|_| ())
    }

    pub async fn set_mode(&self, id: &str, mode: &str) -> Result<(), Error> {
        self.send_command(
            id,
            &RobotCommand::SetMode {
                mode: mode.to_owned(),
            },
        )
        .await
        .map(|_| ())
    }

    pub async fn goto(&self, id: &str, position: Position) -> Result<(), Error> {
        self.send_command(id, &RobotCommand::Goto { position })
            .await
            .map(|_| ())
    }

    pub async fn return_to_launch(&self, id: &str) -> Result<(), Error> {
        self.send_command(id, &RobotCommand::ReturnToLaunch)
            .await
            .map(|_| ())
    }

    pub async fn emergency_stop(&self, id: &str) -> Result<(), Error> {
        self.send_command(id, &RobotCommand::EmergencyStop)
            .await
            .map(|_| ())
    }
}
