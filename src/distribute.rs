//! Candidate point placement inside an overlap region.
//!
//! Placement is deterministic: identical geometry and policy always yield
//! the same candidate sequence, which keeps runs reproducible and test
//! fixtures stable. Regions at or below the area threshold produce an
//! empty sequence; the caller skips them, it is not an error.

use geo::{Area, BoundingRect, Contains, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Spatial sampling policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlacementPolicy {
    /// Row-major lattice with the given spacing (working units), anchored
    /// at the region's bounding-rectangle minimum and offset by half a
    /// cell so narrow regions still receive samples.
    Grid { spacing: f64 },
    /// Low-discrepancy (Halton) sequence over the bounding rectangle,
    /// stopping after `count` points land inside the region.
    Quasirandom { count: usize },
}

/// Produce candidate (lon, lat) locations strictly inside `geometry`.
/// Empty when the region area is at or below `area_threshold`, when the
/// policy parameters are degenerate, or when no sample lands inside.
pub fn distribute(
    geometry: &Polygon<f64>,
    area_threshold: f64,
    policy: &PlacementPolicy,
) -> Vec<(f64, f64)> {
    if geometry.unsigned_area() <= area_threshold {
        return Vec::new();
    }
    let Some(bbox) = geometry.bounding_rect() else {
        return Vec::new();
    };
    let (min, max) = (bbox.min(), bbox.max());
    let width = max.x - min.x;
    let height = max.y - min.y;

    match *policy {
        PlacementPolicy::Grid { spacing } => {
            if !(spacing > 0.0) || !spacing.is_finite() {
                return Vec::new();
            }
            let cols = (width / spacing).ceil() as usize;
            let rows = (height / spacing).ceil() as usize;
            let mut out = Vec::new();
            for row in 0..rows {
                let y = min.y + (row as f64 + 0.5) * spacing;
                if y >= max.y {
                    break;
                }
                for col in 0..cols {
                    let x = min.x + (col as f64 + 0.5) * spacing;
                    if x >= max.x {
                        break;
                    }
                    if geometry.contains(&Point::new(x, y)) {
                        out.push((x, y));
                    }
                }
            }
            out
        }
        PlacementPolicy::Quasirandom { count } => {
            let mut out = Vec::with_capacity(count);
            // Bounded draw budget so thin regions terminate.
            let budget = count.saturating_mul(64).max(256) as u64;
            for draw in 1..=budget {
                if out.len() == count {
                    break;
                }
                let x = min.x + halton(draw, 2) * width;
                let y = min.y + halton(draw, 3) * height;
                if geometry.contains(&Point::new(x, y)) {
                    out.push((x, y));
                }
            }
            out
        }
    }
}

/// Radical-inverse of `index` in the given base, in [0, 1).
fn halton(mut index: u64, base: u64) -> f64 {
    let mut fraction = 1.0;
    let mut result = 0.0;
    while index > 0 {
        fraction /= base as f64;
        result += fraction * (index % base) as f64;
        index /= base;
    }
    result
}
