//! R-tree index over image footprints.
//!
//! The membership pass of the decomposer asks, for every elementary face,
//! which footprints could cover it. The index answers with a cheap
//! bounding-box pre-filter; the caller confirms candidates with an exact
//! intersection-area test.

use crate::types::ImageId;
use geo::{BoundingRect, MultiPolygon, Polygon};
use rstar::{RTree, RTreeObject, AABB};

#[derive(Clone, Debug)]
struct IndexedFootprint {
    image: ImageId,
    geometry: MultiPolygon<f64>,
}

impl RTreeObject for IndexedFootprint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let bbox = self
            .geometry
            .bounding_rect()
            .unwrap_or_else(|| geo::Rect::new(geo::Coord { x: 0.0, y: 0.0 }, geo::Coord { x: 0.0, y: 0.0 }));
        let min = bbox.min();
        let max = bbox.max();
        AABB::from_corners([min.x, min.y], [max.x, max.y])
    }
}

/// Bounding-box index over the footprint collection.
pub struct FootprintIndex {
    tree: RTree<IndexedFootprint>,
}

impl FootprintIndex {
    pub fn new(footprints: Vec<(ImageId, MultiPolygon<f64>)>) -> Self {
        let indexed = footprints
            .into_iter()
            .map(|(image, geometry)| IndexedFootprint { image, geometry })
            .collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    /// Footprints whose bounding box intersects the face's bounding box.
    /// Candidates only; the caller owns the exact test.
    pub fn candidates(&self, face: &Polygon<f64>) -> Vec<(ImageId, &MultiPolygon<f64>)> {
        let Some(bbox) = face.bounding_rect() else {
            return Vec::new();
        };
        let envelope = AABB::from_corners(
            [bbox.min().x, bbox.min().y],
            [bbox.max().x, bbox.max().y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|fp| (fp.image, &fp.geometry))
            .collect()
    }
}
