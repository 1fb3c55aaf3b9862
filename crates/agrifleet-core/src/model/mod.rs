// ── Domain model ──
//
// Canonical entity types for the fleet dashboard. Serde attributes match
// the backend's camelCase wire format so these double as wire types --
// there is a single REST surface and no separate conversion layer.

pub mod alert;
pub mod field;
pub mod mission;
pub mod robot;
pub mod supporting;

pub use alert::{Alert, AlertKind, AlertSeverity};
pub use field::Field;
pub use mission::{
    Mission, MissionKind, MissionParameters, MissionStatus, PathPattern, Priority, Waypoint,
    WaypointAction,
};
pub use robot::{
    AutopilotReading, BatteryReading, CommunicationReading, Component, ComponentKind,
    ComponentStatus, Position, Robot, RobotStatus, SystemReading, Telemetry,
};
pub use supporting::{
    EndpointHealth, HealthCheck, HealthState, PingResult, RobotsSummary, ServiceState,
    SystemStatus, User, UserRole,
};
