// ── Mission domain types ──
//
// Mission.status follows a strict workflow; every transition goes through
// `MissionStatus::can_transition` and illegal ones are rejected with a
// domain error instead of silently mutating state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Mission category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MissionKind {
    Survey,
    Monitoring,
    Analysis,
    Inspection,
    Custom,
}

/// Mission workflow state.
///
/// draft -> scheduled -> active -> {paused <-> active} -> {completed,
/// failed, cancelled}. Terminal states admit no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MissionStatus {
    Draft,
    Scheduled,
    Active,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl MissionStatus {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// The explicit transition table for the mission workflow.
    ///
    /// Draft -> Active is allowed (missions may start without a schedule
    /// step); Draft -> Cancelled closes out an abandoned draft.
    pub fn can_transition(self, to: Self) -> bool {
        match self {
            Self::Draft => matches!(to, Self::Scheduled | Self::Active | Self::Cancelled),
            Self::Scheduled => matches!(to, Self::Active | Self::Cancelled),
            Self::Active => matches!(
                to,
                Self::Paused | Self::Completed | Self::Failed | Self::Cancelled
            ),
            Self::Paused => matches!(
                to,
                Self::Active | Self::Completed | Self::Failed | Self::Cancelled
            ),
            Self::Completed | Self::Failed | Self::Cancelled => false,
        }
    }
}

/// Waypoint action performed on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WaypointAction {
    Survey,
    Photo,
    Sample,
    Wait,
    Land,
}

/// A single point in a mission's traversal sequence.
///
/// `order` defines the sequence; reordering must leave the list sorted
/// ascending by order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub speed: f64,
    pub action: WaypointAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
    pub order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PathPattern {
    Grid,
    Circular,
    Linear,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Flight/drive parameters shared by all waypoints of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionParameters {
    pub altitude: f64,
    pub speed: f64,
    pub overlap: f64,
    pub pattern: PathPattern,
    pub safety_radius: f64,
}

/// The canonical Mission type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: MissionKind,
    pub status: MissionStatus,
    /// Weak reference to the executing robot, by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_robot: Option<String>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    pub parameters: MissionParameters,
    /// 0-100.
    pub progress: f64,
    /// Estimated duration in seconds.
    pub estimated_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<u64>,
    pub field_area: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: String,
}

impl Mission {
    /// Clone this mission as a fresh draft.
    ///
    /// New id, caller-supplied name, status back to draft, progress reset,
    /// no robot assignment, no run timestamps. Waypoints are preserved.
    pub fn clone_as(&self, name: &str) -> Self {
        Self {
            id: fresh_mission_id(),
            name: name.to_owned(),
            status: MissionStatus::Draft,
            progress: 0.0,
            assigned_robot: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            actual_time: None,
            ..self.clone()
        }
    }

    /// Apply new order values to matching waypoints and re-sort ascending.
    pub fn reorder_waypoints(&mut self, orders: &[(String, u32)]) {
        for wp in &mut self.waypoints {
            if let Some((_, order)) = orders.iter().find(|(id, _)| *id == wp.id) {
                wp.order = *order;
            }
        }
        self.waypoints.sort_by_key(|wp| wp.order);
    }
}

pub(crate) fn fresh_mission_id() -> String {
    format!("mission-{}", Uuid::new_v4())
}

pub(crate) fn fresh_waypoint_id() -> String {
    format!("wp-{}", Uuid::new_v4())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mission_with_status(status: MissionStatus) -> Mission {
        Mission {
            id: "mission-001".into(),
            name: "North field survey".into(),
            description: String::new(),
            kind: MissionKind::Survey,
            status,
            assigned_robot: None,
            waypoints: vec![
                Waypoint {
                    id: "wp-1".into(),
                    lat: 52.1,
                    lng: 5.2,
                    altitude: 10.0,
                    speed: 2.0,
                    action: WaypointAction::Survey,
                    parameters: None,
                    order: 1,
                },
                Waypoint {
                    id: "wp-2".into(),
                    lat: 52.2,
                    lng: 5.3,
                    altitude: 10.0,
                    speed: 2.0,
                    action: WaypointAction::Photo,
                    parameters: None,
                    order: 2,
                },
            ],
            parameters: MissionParameters {
                altitude: 10.0,
                speed: 2.0,
                overlap: 70.0,
                pattern: PathPattern::Grid,
                safety_radius: 50.0,
            },
            progress: 40.0,
            estimated_time: 1800,
            actual_time: Some(900),
            field_area: "field-001".into(),
            priority: Priority::Medium,
            created_at: Utc::now(),
            started_at: Some(Utc::now()),
            completed_at: None,
            created_by: "operator".into(),
        }
    }

    #[test]
    fn workflow_allows_listed_transitions() {
        use MissionStatus::{Active, Cancelled, Completed, Draft, Failed, Paused, Scheduled};

        assert!(Draft.can_transition(Scheduled));
        assert!(Draft.can_transition(Active));
        assert!(Scheduled.can_transition(Active));
        assert!(Active.can_transition(Paused));
        assert!(Paused.can_transition(Active));
        assert!(Active.can_transition(Completed));
        assert!(Paused.can_transition(Failed));
        assert!(Active.can_transition(Cancelled));
    }

    #[test]
    fn workflow_rejects_everything_from_terminal_states() {
        use MissionStatus::{Active, Cancelled, Completed, Draft, Failed};

        for terminal in [Completed, Failed, Cancelled] {
            assert!(terminal.is_terminal());
            for to in [Draft, Active, Completed] {
                assert!(!terminal.can_transition(to), "{terminal} -> {to}");
            }
        }
    }

    #[test]
    fn workflow_rejects_resume_from_draft() {
        assert!(!MissionStatus::Draft.can_transition(MissionStatus::Paused));
        // resume == Paused -> Active; a draft mission is not paused.
        assert!(MissionStatus::Paused.can_transition(MissionStatus::Active));
    }

    #[test]
    fn clone_as_resets_run_state_but_keeps_waypoints() {
        let original = mission_with_status(MissionStatus::Active);
        let mut original = original;
        original.assigned_robot = Some("robot-7".into());

        let copy = original.clone_as("Copy A");

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Copy A");
        assert_eq!(copy.status, MissionStatus::Draft);
        assert!((copy.progress - 0.0).abs() < f64::EPSILON);
        assert!(copy.assigned_robot.is_none());
        assert!(copy.started_at.is_none());
        assert!(copy.completed_at.is_none());
        assert!(copy.actual_time.is_none());
        assert_eq!(copy.waypoints, original.waypoints);
    }

    #[test]
    fn reorder_waypoints_sorts_ascending_by_new_order() {
        let mut mission = mission_with_status(MissionStatus::Draft);
        mission.reorder_waypoints(&[("wp-1".into(), 2), ("wp-2".into(), 1)]);

        let ids: Vec<&str> = mission.waypoints.iter().map(|wp| wp.id.as_str()).collect();
        assert_eq!(ids, ["wp-2", "wp-1"]);
        assert_eq!(mission.waypoints[0].order, 1);
        assert_eq!(mission.waypoints[1].order, 2);
    }
}
