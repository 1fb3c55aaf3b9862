// ── Robot domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Geographic position of a robot or waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            altitude: None,
            heading: None,
            timestamp: None,
        }
    }
}

/// Operational status reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RobotStatus {
    Active,
    Idle,
    Error,
    Offline,
    Maintenance,
}

/// Hardware component category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentKind {
    Motor,
    Sensor,
    Camera,
    Gps,
    Radio,
    Battery,
    Autopilot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentStatus {
    Online,
    Offline,
    Error,
    Warning,
}

/// A hardware component attached to a robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub status: ComponentStatus,
    /// 0-100.
    pub health: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    pub last_update: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// ── Telemetry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryReading {
    /// 0-100.
    pub level: f64,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemReading {
    pub cpu: f64,
    pub memory: f64,
    pub temperature: f64,
    pub uptime: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationReading {
    pub signal_strength: f64,
    pub latency: f64,
    pub packets_lost: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopilotReading {
    pub mode: String,
    pub armed: bool,
    pub gps_status: u8,
    pub satellite_count: u8,
}

/// An immutable telemetry snapshot, keyed by `timestamp` + `robot_id`.
///
/// A snapshot always replaces a robot's embedded telemetry wholesale --
/// sub-readings are never merged across snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub timestamp: DateTime<Utc>,
    pub robot_id: String,
    pub position: Position,
    pub battery: BatteryReading,
    pub system: SystemReading,
    pub communication: CommunicationReading,
    pub autopilot: AutopilotReading,
}

// ── Robot ────────────────────────────────────────────────────────────

/// The canonical Robot type.
///
/// Robots are backend-owned: the sync layer creates and mutates them from
/// fetch responses but never deletes them locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Robot {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: RobotStatus,
    pub position: Position,
    /// 0-100.
    pub battery: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_mission: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    /// Latest telemetry snapshot. Absent until the robot has reported once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<Telemetry>,
    pub last_update: DateTime<Utc>,
    #[serde(default)]
    pub total_missions: u32,
    #[serde(default)]
    pub uptime: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl Robot {
    /// Replace the embedded telemetry and let battery and position follow.
    pub fn apply_telemetry(&mut self, telemetry: Telemetry) {
        self.battery = telemetry.battery.level;
        self.position = telemetry.position;
        self.telemetry = Some(telemetry);
        self.last_update = Utc::now();
    }
}
