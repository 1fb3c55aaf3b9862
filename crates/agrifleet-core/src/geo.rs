// ── Geographic helpers ──
//
// Small-area approximations for mid-latitude farm fields: haversine for
// distances, shoelace with a flat meters-per-degree factor for polygon
// areas. Not suitable for continent-scale geometry.

use crate::model::Position;

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Flat-earth approximation of meters per degree of latitude.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Great-circle distance between two positions, in meters (haversine).
pub fn distance_m(a: &Position, b: &Position) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` to `b`, in degrees clockwise from north.
pub fn bearing_deg(a: &Position, b: &Position) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Area of an implicitly closed boundary polygon, in square meters.
///
/// Shoelace formula over lat/lng, scaled by the flat meters-per-degree
/// factor in both axes. Degenerate polygons (< 3 vertices) have zero
/// area.
pub fn polygon_area_m2(boundary: &[Position]) -> f64 {
    if boundary.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for (i, a) in boundary.iter().enumerate() {
        let b = &boundary[(i + 1) % boundary.len()];
        area += a.lat * b.lng;
        area -= b.lat * a.lng;
    }
    area = area.abs() / 2.0;

    area * METERS_PER_DEGREE * METERS_PER_DEGREE
}

/// Polygon area in hectares.
pub fn polygon_area_hectares(boundary: &[Position]) -> f64 {
    polygon_area_m2(boundary) / 10_000.0
}

/// Arithmetic centroid of the boundary vertices.
pub fn polygon_center(boundary: &[Position]) -> Position {
    if boundary.is_empty() {
        return Position::new(0.0, 0.0);
    }

    #[allow(clippy::cast_precision_loss)]
    let n = boundary.len() as f64;
    let lat = boundary.iter().map(|p| p.lat).sum::<f64>() / n;
    let lng = boundary.iter().map(|p| p.lng).sum::<f64>() / n;
    Position::new(lat, lng)
}

/// Rectangular bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Whether a position falls inside (or on) the bounds.
pub fn within_bounds(position: &Position, bounds: &GeoBounds) -> bool {
    position.lat >= bounds.south
        && position.lat <= bounds.north
        && position.lng >= bounds.west
        && position.lng <= bounds.east
}

/// Human-readable `"lat, lng"` with a fixed precision.
pub fn format_coordinates(lat: f64, lng: f64, precision: usize) -> String {
    format!("{lat:.precision$}, {lng:.precision$}")
}
