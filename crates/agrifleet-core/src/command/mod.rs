// ── Command API ──
//
// All robot write operations flow through a unified `RobotCommand` enum,
// serialized to the backend's `{command, parameters}` envelope. Named
// service conveniences (arm, disarm, goto, ...) are sugar over this one
// primitive so every command shares a single failure contract.

pub mod requests;

use serde::{Deserialize, Serialize};

use crate::model::Position;

pub use requests::{
    AlertDraft, ComponentUpdate, FieldDraft, FieldUpdate, MissionAssignment, MissionDraft,
    MissionUpdate, RobotDraft, RobotUpdate, WaypointDraft, WaypointOrder, WaypointUpdate,
};

/// All commands a robot accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum RobotCommand {
    Arm,
    Disarm,
    SetMode { mode: String },
    Goto { position: Position },
    ReturnToLaunch,
    EmergencyStop,
    StartMission { mission_id: String },
    PauseMission,
    ResumeMission,
    StopMission,
}

impl RobotCommand {
    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Disarm => "disarm",
            Self::SetMode { .. } => "set_mode",
            Self::Goto { .. } => "goto",
            Self::ReturnToLaunch => "rtl",
            Self::EmergencyStop => "emergency_stop",
            Self::StartMission { .. } => "start_mission",
            Self::PauseMission => "pause_mission",
            Self::ResumeMission => "resume_mission",
            Self::StopMission => "stop_mission",
        }
    }

    /// Command parameters, when the variant carries any.
    pub fn parameters(&self) -> Option<serde_json::Value> {
        match self {
            Self::SetMode { mode } => Some(serde_json::json!({ "mode": mode })),
            Self::Goto { position } => serde_json::to_value(position).ok(),
            Self::StartMission { mission_id } => {
                Some(serde_json::json!({ "missionId": mission_id }))
            }
            _ => None,
        }
    }

    /// Build the `{command, parameters}` request body.
    pub fn to_request(&self) -> CommandRequest {
        CommandRequest {
            command: self.name(),
            parameters: self.parameters(),
        }
    }
}

/// Wire envelope for `POST /api/robots/:id/command`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// One entry of a batch command request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCommand {
    pub robot_id: String,
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl BatchCommand {
    pub fn new(robot_id: impl Into<String>, command: &RobotCommand) -> Self {
        Self {
            robot_id: robot_id.into(),
            command: command.name(),
            parameters: command.parameters(),
        }
    }
}

/// Per-robot outcome of a batch operation.
///
/// Batch endpoints report partial failure per item; an aggregate success
/// says nothing about individual robots.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub robot_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn command_request_serializes_to_wire_envelope() {
        let cmd = RobotCommand::StartMission {
            mission_id: "mission-001".into(),
        };
        let body = serde_json::to_value(cmd.to_request()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "command": "start_mission",
                "parameters": { "missionId": "mission-001" }
            })
        );
    }

    #[test]
    fn parameterless_command_omits_parameters() {
        let body = serde_json::to_value(RobotCommand::Arm.to_request()).unwrap();
        assert_eq!(body, serde_json::json!({ "command": "arm" }));
    }

    #[test]
    fn goto_carries_the_position() {
        let cmd = RobotCommand::Goto {
            position: crate::model::Position::new(52.1, 5.6),
        };
        let params = cmd.parameters().unwrap();
        assert!((params["lat"].as_f64().unwrap() - 52.1).abs() < f64::EPSILON);
        assert!((params["lng"].as_f64().unwrap() - 5.6).abs() < f64::EPSILON);
    }
}
