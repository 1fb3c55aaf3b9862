// ── Field domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::robot::Position;

/// A managed field with a polygon boundary.
///
/// The boundary is an ordered ring of positions, implicitly closed (the
/// last vertex connects back to the first). `missions` holds weak
/// references to missions flown over this field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    /// Hectares.
    pub area: f64,
    pub boundaries: Vec<Position>,
    /// Surveyed coverage percentage, 0-100.
    pub coverage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_surveyed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub missions: Vec<String>,
}
