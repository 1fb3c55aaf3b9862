//! Client-side data layer for the AgriFleet dashboard.
//!
//! This crate owns the domain model, per-resource stores, and the
//! polling-based real-time sync layer between `agrifleet-api` and UI
//! consumers:
//!
//! - **[`FleetSession`]** -- Composition root owning the API client,
//!   services, dispatcher, sync loops, and stores. [`start()`](FleetSession::start)
//!   wires store subscriptions and begins polling; [`shutdown()`](FleetSession::shutdown)
//!   reverses both. No module-level singletons.
//!
//! - **[`Poller`](sync::Poller)** / **[`AutoRefresh`](sync::AutoRefresh)** --
//!   The repeating-timer primitive and the fetch wrapper built on it,
//!   with watch-observable data/loading/error/last-updated state.
//!
//! - **[`Dispatcher`](sync::Dispatcher)** -- Typed topic registry fed by
//!   four independent poll loops (robots 2s, telemetry 1s, alerts 5s,
//!   missions 3s). Best-effort: poll failures are logged and swallowed.
//!
//! - **Stores** ([`store`]) -- Single-writer authoritative state per
//!   resource with optimistic mutations, server-authoritative
//!   re-pointing, and selection that stays consistent across mutations.
//!   Mission status changes go through an explicit transition table.
//!
//! - **Domain model** ([`model`]) -- Canonical types (`Robot`, `Mission`,
//!   `Alert`, `Field`, ...) whose serde layout doubles as the wire
//!   format.

pub mod command;
pub mod error;
pub mod geo;
pub mod model;
pub mod services;
pub mod session;
pub mod store;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{BatchCommand, BatchOutcome, RobotCommand};
pub use error::CoreError;
pub use session::{FleetConfig, FleetSession};
pub use store::{AlertStore, FieldStore, MissionStore, RobotStore, SystemStore};
pub use sync::{AutoRefresh, Dispatcher, Poller, PollerOptions, RealtimeSync, Topic, Update};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alert,
    AlertKind,
    AlertSeverity,
    Field,
    HealthCheck,
    Mission,
    MissionKind,
    MissionStatus,
    Position,
    Robot,
    RobotStatus,
    SystemStatus,
    Telemetry,
    User,
    Waypoint,
    WaypointAction,
};
