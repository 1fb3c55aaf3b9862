// ── Request types for create/update operations ──
//
// Draft types carry the caller-supplied fields of a new entity (the
// backend owns id and bookkeeping timestamps). Update types are partial:
// every field optional, absent fields untouched -- both on the wire and
// when applied optimistically to local state.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::{
    Alert, AlertKind, AlertSeverity, Component, Field, Mission, MissionKind, MissionParameters,
    MissionStatus, Position, Priority, Robot, RobotStatus, Waypoint, WaypointAction,
};

// ── Robots ───────────────────────────────────────────────────────────

/// Fields for creating a robot. The backend assigns id, last-update, and
/// the first telemetry snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: RobotStatus,
    pub position: Position,
    pub battery: f64,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Partial robot update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RobotStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_mission: Option<String>,
}

impl RobotUpdate {
    pub fn status(status: RobotStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Merge the present fields into a robot.
    pub fn apply_to(&self, robot: &mut Robot) {
        if let Some(name) = &self.name {
            robot.name.clone_from(name);
        }
        if let Some(status) = self.status {
            robot.status = status;
        }
        if let Some(position) = self.position {
            robot.position = position;
        }
        if let Some(battery) = self.battery {
            robot.battery = battery;
        }
        if let Some(mission) = &self.current_mission {
            robot.current_mission = Some(mission.clone());
        }
    }
}

/// Partial component update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<crate::model::ComponentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
}

impl ComponentUpdate {
    pub fn apply_to(&self, component: &mut Component) {
        if let Some(status) = self.status {
            component.status = status;
        }
        if let Some(health) = self.health {
            component.health = health;
        }
        if let Some(temperature) = self.temperature {
            component.temperature = Some(temperature);
        }
        if let Some(voltage) = self.voltage {
            component.voltage = Some(voltage);
        }
        if let Some(current) = self.current {
            component.current = Some(current);
        }
        component.last_update = Utc::now();
    }
}

// ── Missions ─────────────────────────────────────────────────────────

/// Fields for creating a mission. The backend assigns id and created-at;
/// progress starts at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: MissionKind,
    pub status: MissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_robot: Option<String>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    pub parameters: MissionParameters,
    pub estimated_time: u64,
    pub field_area: String,
    pub priority: Priority,
    pub created_by: String,
}

impl MissionDraft {
    /// Materialize the draft locally (optimistic creation).
    pub(crate) fn into_mission(self) -> Mission {
        Mission {
            id: crate::model::mission::fresh_mission_id(),
            name: self.name,
            description: self.description,
            kind: self.kind,
            status: self.status,
            assigned_robot: self.assigned_robot,
            waypoints: self.waypoints,
            parameters: self.parameters,
            progress: 0.0,
            estimated_time: self.estimated_time,
            actual_time: None,
            field_area: self.field_area,
            priority: self.priority,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            created_by: self.created_by,
        }
    }
}

/// Partial mission update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MissionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_robot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u64>,
}

impl MissionUpdate {
    pub fn apply_to(&self, mission: &mut Mission) {
        if let Some(name) = &self.name {
            mission.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            mission.description.clone_from(description);
        }
        if let Some(status) = self.status {
            mission.status = status;
        }
        if let Some(robot) = &self.assigned_robot {
            mission.assigned_robot = Some(robot.clone());
        }
        if let Some(progress) = self.progress {
            mission.progress = progress;
        }
        if let Some(priority) = self.priority {
            mission.priority = priority;
        }
        if let Some(estimated_time) = self.estimated_time {
            mission.estimated_time = estimated_time;
        }
    }
}

/// Fields for creating a waypoint. The backend assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointDraft {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub speed: f64,
    pub action: WaypointAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    pub order: u32,
}

impl WaypointDraft {
    pub(crate) fn into_waypoint(self) -> Waypoint {
        Waypoint {
            id: crate::model::mission::fresh_waypoint_id(),
            lat: self.lat,
            lng: self.lng,
            altitude: self.altitude,
            speed: self.speed,
            action: self.action,
            parameters: self.parameters,
            order: self.order,
        }
    }
}

/// Partial waypoint update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<WaypointAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl WaypointUpdate {
    pub fn apply_to(&self, waypoint: &mut Waypoint) {
        if let Some(lat) = self.lat {
            waypoint.lat = lat;
        }
        if let Some(lng) = self.lng {
            waypoint.lng = lng;
        }
        if let Some(altitude) = self.altitude {
            waypoint.altitude = altitude;
        }
        if let Some(speed) = self.speed {
            waypoint.speed = speed;
        }
        if let Some(action) = self.action {
            waypoint.action = action;
        }
        if let Some(order) = self.order {
            waypoint.order = order;
        }
    }
}

/// One entry of a waypoint reorder request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointOrder {
    pub id: String,
    pub order: u32,
}

/// One entry of a batch mission start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionAssignment {
    pub robot_id: String,
    pub mission_id: String,
}

// ── Fields ───────────────────────────────────────────────────────────

/// Fields for creating a field. Coverage starts at zero with no missions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
    pub name: String,
    pub area: f64,
    pub boundaries: Vec<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
}

impl FieldDraft {
    pub(crate) fn into_field(self) -> Field {
        Field {
            id: format!("field-{}", uuid::Uuid::new_v4()),
            name: self.name,
            area: self.area,
            boundaries: self.boundaries,
            coverage: 0.0,
            last_surveyed: None,
            crop_type: self.crop_type,
            missions: Vec::new(),
        }
    }
}

/// Partial field update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<Vec<Position>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
}

impl FieldUpdate {
    pub fn apply_to(&self, field: &mut Field) {
        if let Some(name) = &self.name {
            field.name.clone_from(name);
        }
        if let Some(area) = self.area {
            field.area = area;
        }
        if let Some(boundaries) = &self.boundaries {
            field.boundaries.clone_from(boundaries);
        }
        if let Some(coverage) = self.coverage {
            field.coverage = coverage;
        }
        if let Some(crop_type) = &self.crop_type {
            field.crop_type = Some(crop_type.clone());
        }
    }
}

// ── Alerts ───────────────────────────────────────────────────────────

/// Fields for raising an alert locally (id and timestamp are assigned on
/// materialization).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robot_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub acknowledged: bool,
}

impl AlertDraft {
    pub(crate) fn into_alert(self) -> Alert {
        Alert {
            id: format!("alert-{}", uuid::Uuid::new_v4()),
            robot_id: self.robot_id,
            kind: self.kind,
            severity: self.severity,
            title: self.title,
            message: self.message,
            timestamp: Utc::now(),
            acknowledged: self.acknowledged,
            resolved_at: None,
        }
    }
}
