// ── Domain stores ──
//
// Per-resource authoritative client-side state. Each store is
// single-writer: mutations apply an optimistic local change, then hand
// authority to the server response when one carries the entity. Failed
// actions set a human-readable error and leave prior state intact.

mod collection;

pub mod alerts;
pub mod fields;
pub mod missions;
pub mod robots;
pub mod system;

pub use alerts::AlertStore;
pub use fields::FieldStore;
pub use missions::MissionStore;
pub use robots::RobotStore;
pub use system::SystemStore;
