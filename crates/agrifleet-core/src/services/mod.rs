// ── Domain services ──
//
// Thin typed facades over `ApiClient`, one per backend resource. Each
// method maps directly onto a REST endpoint; the shared facade owns auth,
// timeouts, and error normalization, so these stay stateless request
// builders.

pub mod alerts;
pub mod batch;
pub mod fields;
pub mod missions;
pub mod realtime;
pub mod robots;
pub mod status;

pub use alerts::{AlertFilter, AlertsService};
pub use batch::BatchService;
pub use fields::{FieldCoverage, FieldsService};
pub use missions::{MissionEstimate, MissionFilter, MissionValidation, MissionsService};
pub use realtime::RealtimeService;
pub use robots::RobotsService;
pub use status::StatusService;
