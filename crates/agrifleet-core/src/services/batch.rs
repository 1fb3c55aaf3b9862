// ── Batch endpoints ──
//
// Batch operations return per-robot outcomes; a 200 from the backend only
// means the batch was processed, not that every robot succeeded. Callers
// must inspect each `BatchOutcome`.

use std::sync::Arc;

use agrifleet_api::{ApiClient, Error};
use serde::Serialize;

use crate::command::{BatchCommand, BatchOutcome, MissionAssignment, RobotUpdate};

#[derive(Serialize)]
struct CommandsBody<'a> {
    commands: &'a [BatchCommand],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody<'a> {
    robot_ids: &'a [String],
    updates: &'a RobotUpdate,
}

#[derive(Serialize)]
struct AssignmentsBody<'a> {
    assignments: &'a [MissionAssignment],
}

/// Typed facade for the batch operation endpoints.
#[derive(Clone)]
pub struct BatchService {
    api: Arc<ApiClient>,
}

impl BatchService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn execute(&self, commands: &[BatchCommand]) -> Result<Vec<BatchOutcome>, Error> {
        self.api
            .post("api/robots/batch-command", &CommandsBody { commands })
            .await
    }

    pub async fn update_robots(
        &self,
        robot_ids: &[String],
        updates: &RobotUpdate,
    ) -> Result<Vec<BatchOutcome>, Error> {
        self.api
            .post("api/robots/batch-update", &UpdateBody { robot_ids, updates })
            .await
    }

    pub async fn start_missions(
        &self,
        assignments: &[MissionAssignment],
    ) -> Result<Vec<BatchOutcome>, Error> {
        self.api
            .post("api/missions/batch-start", &AssignmentsBody { assignments })
            .await
    }

    pub async fn emergency_stop_all(&self) -> Result<Vec<BatchOutcome>, Error> {
        self.api.post_no_body("api/robots/emergency-stop-all").await
    }

    pub async fn return_all_to_base(&self) -> Result<Vec<BatchOutcome>, Error> {
        self.api.post_no_body("api/robots/return-all-to-base").await
    }
}
