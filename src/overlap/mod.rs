//! Footprint overlap decomposition.
//!
//! Overview
//! - [`decompose`] overlays every image footprint into elementary faces
//!   (a planar subdivision with no interior overlaps), then determines
//!   each face's membership against an R-tree footprint index using an
//!   intersection-area tolerance that rejects degenerate slivers from
//!   floating-point boundary noise.
//! - One [`OverlapRegion`] is emitted per elementary face; the membership
//!   list is an attribute and disjoint faces with identical membership
//!   stay separate regions. Faces covered by fewer than two images are
//!   dropped.
//! - Decomposition is a full recomputation: on any footprint change the
//!   caller replaces the previous region set wholesale (see
//!   [`OverlapStore::replace_overlap_regions`](crate::pipeline::OverlapStore)).
//!
//! Region ids are assigned deterministically (faces sorted by membership,
//! then centroid), so re-running on unchanged footprints reproduces the
//! same set.

mod decompose;
mod index;

pub use decompose::{decompose, DecomposeOptions};
pub use index::FootprintIndex;

use crate::types::ImageId;
use geo::{Area, MultiPolygon, Polygon};
use thiserror::Error;
use wkt::ToWkt;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("overlap region {0} has empty geometry")]
    EmptyRegion(u64),
    #[error("overlap region {0} contains non-finite coordinates")]
    NonFiniteRegion(u64),
}

/// Maximal area where one fixed set of images overlap.
///
/// Derived from footprints; holds image ids only (weak references into the
/// caller's working set).
#[derive(Clone, Debug)]
pub struct OverlapRegion {
    pub id: u64,
    pub geometry: Polygon<f64>,
    /// Sorted, deduplicated ids of the images whose footprints cover this
    /// region. Usable regions have two or more members.
    pub members: Vec<ImageId>,
}

impl OverlapRegion {
    pub fn area(&self) -> f64 {
        self.geometry.unsigned_area()
    }

    /// Well-known-text rendering of the geometry for the persistence
    /// boundary.
    pub fn geometry_wkt(&self) -> String {
        self.geometry.wkt_string()
    }

    /// Reject empty or non-finite geometry before spending work on the
    /// region.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !polygon_is_finite(&self.geometry) {
            return Err(GeometryError::NonFiniteRegion(self.id));
        }
        if self.area() <= 0.0 {
            return Err(GeometryError::EmptyRegion(self.id));
        }
        Ok(())
    }
}

pub(crate) fn polygon_is_finite(polygon: &Polygon<f64>) -> bool {
    polygon
        .exterior()
        .coords()
        .chain(polygon.interiors().iter().flat_map(|ring| ring.coords()))
        .all(|c| c.x.is_finite() && c.y.is_finite())
}

pub(crate) fn multi_polygon_is_finite(geometry: &MultiPolygon<f64>) -> bool {
    geometry.0.iter().all(polygon_is_finite)
}
