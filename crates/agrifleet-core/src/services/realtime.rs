// ── Real-time fetch surface ──
//
// The four endpoints the sync loops hit. Kept separate from the CRUD
// facades so the poll loops depend only on this narrow read surface.

use std::sync::Arc;

use agrifleet_api::{ApiClient, Error};

use crate::model::{Alert, Mission, Robot, Telemetry};

/// Read-only snapshot endpoints backing the poll loops.
#[derive(Clone)]
pub struct RealtimeService {
    api: Arc<ApiClient>,
}

impl RealtimeService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Current status snapshot of every robot.
    pub async fn robot_status(&self) -> Result<Vec<Robot>, Error> {
        self.api.get("api/robots/status").await
    }

    /// Latest telemetry snapshot per robot.
    pub async fn latest_telemetry(&self) -> Result<Vec<Telemetry>, Error> {
        self.api.get("api/telemetry/latest").await
    }

    /// Alerts raised since the last poll window.
    pub async fn recent_alerts(&self) -> Result<Vec<Alert>, Error> {
        self.api.get("api/alerts/recent").await
    }

    /// Missions currently in flight.
    pub async fn active_missions(&self) -> Result<Vec<Mission>, Error> {
        self.api.get("api/missions/active").await
    }

    /// Full robot listing, for manual refresh outside the poll cadence.
    pub async fn refresh_robots(&self) -> Result<Vec<Robot>, Error> {
        self.api.get("api/robots").await
    }
}
