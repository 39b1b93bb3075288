//! Persistence collaborator boundary.
//!
//! Geometry crosses this boundary as typed polygons; implementations that
//! speak SQL can render well-known text via
//! [`OverlapRegion::geometry_wkt`](crate::overlap::OverlapRegion::geometry_wkt).

use crate::overlap::OverlapRegion;
use crate::types::Point;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Accepts finished points.
pub trait PointSink: Send + Sync {
    /// Insert the whole batch atomically: either all points land or none
    /// do. Called at most once per run.
    fn bulk_insert_points(&self, points: &[Point]) -> Result<(), StoreError>;
}

/// Source and sink for overlap regions.
pub trait OverlapStore: Send + Sync {
    /// Regions with area strictly greater than `min_area`.
    fn query_overlaps(&self, min_area: f64) -> Result<Vec<OverlapRegion>, StoreError>;

    /// Replace the prior region set wholesale; decomposition is always a
    /// full recomputation, never an incremental patch.
    fn replace_overlap_regions(&self, regions: &[OverlapRegion]) -> Result<(), StoreError>;
}
