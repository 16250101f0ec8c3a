//! Geographic grid generation for coverage sweeps.
//!
//! A single places query is capped at 60 results, so a dense area is tiled
//! with overlapping search cells. Points sit on concentric rings around the
//! center; each ring is spaced `cell_radius * overlap_factor` from the last
//! and carries enough points that neighbours on a ring are about one step
//! apart.

use std::collections::HashSet;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Step multiplier between rings. Below 2.0 adjacent cells overlap.
pub const DEFAULT_OVERLAP_FACTOR: f64 = 1.5;

/// Every ring carries at least this many points.
const MIN_POINTS_PER_RING: u32 = 6;

/// Rounding used for point deduplication, ~0.11 m at the equator.
const DEDUP_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GridPoint {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn dedup_key(self) -> (i64, i64) {
        (
            (self.lat * DEDUP_SCALE).round() as i64,
            (self.lng * DEDUP_SCALE).round() as i64,
        )
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Radius of the whole area to cover, in meters.
    pub coverage_radius_m: f64,
    /// Search radius of one cell, in meters.
    pub cell_radius_m: f64,
    pub overlap_factor: f64,
}

impl GridConfig {
    #[must_use]
    pub fn new(coverage_radius_m: f64, cell_radius_m: f64) -> Self {
        Self {
            coverage_radius_m,
            cell_radius_m,
            overlap_factor: DEFAULT_OVERLAP_FACTOR,
        }
    }

    /// Distance between consecutive rings.
    #[must_use]
    pub fn step_distance_m(&self) -> f64 {
        self.cell_radius_m * self.overlap_factor
    }

    /// `ceil(coverage / step)`, or zero when the step is unusable.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn ring_count(&self) -> u32 {
        let step = self.step_distance_m();
        if !is_positive(step) || !is_positive(self.coverage_radius_m) {
            return 0;
        }
        (self.coverage_radius_m / step).ceil() as u32
    }
}

/// Destination reached from `origin` after `distance_m` along `bearing_deg`
/// on a sphere of radius [`EARTH_RADIUS_M`].
#[must_use]
pub fn destination_point(origin: GridPoint, distance_m: f64, bearing_deg: f64) -> GridPoint {
    let lat = origin.lat.to_radians();
    let lng = origin.lng.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_m / EARTH_RADIUS_M;

    let new_lat =
        (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos()).asin();
    let new_lng = lng
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * new_lat.sin());

    GridPoint {
        lat: new_lat.to_degrees(),
        lng: new_lng.to_degrees(),
    }
}

/// Great-circle distance in meters.
#[must_use]
pub fn haversine_m(a: GridPoint, b: GridPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Generate search-cell centers covering a disk around `center`.
///
/// The exact `center` is always the first point; rings follow outward and
/// each ring starts at bearing 0°. Ring `i` sits at `i * step`, except that
/// the outermost ring is pulled in to `coverage + cell_radius` when the
/// ring arithmetic would overshoot further; that ring still lies beyond the
/// coverage edge. Points closer than ~0.11 m to an earlier point are
/// dropped.
///
/// Returns an empty grid when `cell_radius_m` is not a positive number.
#[must_use]
pub fn generate_grid(center: GridPoint, config: &GridConfig) -> Vec<GridPoint> {
    if !is_positive(config.cell_radius_m) {
        tracing::error!(
            cell_radius_m = config.cell_radius_m,
            "cell radius must be positive; no grid generated"
        );
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut points = Vec::new();
    seen.insert(center.dedup_key());
    points.push(center);

    let step = config.step_distance_m();
    if !is_positive(step) {
        tracing::warn!(step, "non-positive ring step; grid is the center point only");
        return points;
    }

    let max_distance = config.coverage_radius_m + config.cell_radius_m;
    for ring in 1..=config.ring_count() {
        let distance = (f64::from(ring) * step).min(max_distance);
        let count = points_on_ring(distance, step);
        let angle_step = 360.0 / f64::from(count);
        for j in 0..count {
            let point = destination_point(center, distance, f64::from(j) * angle_step);
            if seen.insert(point.dedup_key()) {
                points.push(point);
            }
        }
    }

    tracing::debug!(
        points = points.len(),
        coverage_radius_m = config.coverage_radius_m,
        cell_radius_m = config.cell_radius_m,
        "generated search grid"
    );
    points
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// `max(6, ceil(circumference / step))`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn points_on_ring(distance: f64, step: f64) -> u32 {
    let around = (2.0 * PI * distance / step).ceil() as u32;
    around.max(MIN_POINTS_PER_RING)
}
