//! Incremental overlay of footprints into maximal same-membership regions.
//!
//! Stages
//! 1. Overlay: fold each footprint into the running planar subdivision via
//!    boolean intersection/difference, yielding elementary faces with no
//!    interior overlaps. Faces and the covered union stay pairwise
//!    disjoint throughout.
//! 2. Membership: for every elementary face, collect the footprints whose
//!    intersection with the face exceeds the area tolerance, using the
//!    footprint index for bounding-box pre-filtering. The tolerance keeps
//!    boundary slivers out of the membership sets.
//!
//! Faces with fewer than two members are dropped. Ids are assigned after
//! sorting faces by (membership, centroid), so unchanged input reproduces
//! an identical region set.

use super::{multi_polygon_is_finite, FootprintIndex, OverlapRegion};
use crate::types::ImageId;
use geo::{Area, BooleanOps, BoundingRect, Centroid, MultiPolygon, Rect};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DecomposeOptions {
    /// Minimum intersection area (working units squared) for a footprint
    /// to count as covering a face. Rejects degenerate slivers left by
    /// floating-point boundary noise.
    pub membership_area_tolerance: f64,
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            membership_area_tolerance: 1e-6,
        }
    }
}

/// Decompose the footprint union into maximal regions covered by the same
/// image set. Footprints with empty or non-finite geometry are skipped
/// with a warning; the remaining footprints still decompose.
pub fn decompose(
    footprints: &[(ImageId, MultiPolygon<f64>)],
    options: DecomposeOptions,
) -> Vec<OverlapRegion> {
    let tolerance = options.membership_area_tolerance;

    let mut valid: Vec<(ImageId, &MultiPolygon<f64>)> = Vec::with_capacity(footprints.len());
    for (image, geometry) in footprints {
        if !multi_polygon_is_finite(geometry) {
            warn!("footprint of image {image} contains non-finite coordinates; skipping");
            continue;
        }
        if geometry.unsigned_area() <= tolerance {
            warn!("footprint of image {image} is empty; skipping");
            continue;
        }
        valid.push((*image, geometry));
    }
    valid.sort_by_key(|(image, _)| *image);

    let faces = overlay(&valid, tolerance);
    debug!(
        "overlay of {} footprints produced {} face groups",
        valid.len(),
        faces.len()
    );

    let index = FootprintIndex::new(
        valid
            .iter()
            .map(|(image, geometry)| (*image, (*geometry).clone()))
            .collect(),
    );

    let mut keyed: Vec<(Vec<ImageId>, geo::Polygon<f64>)> = Vec::new();
    for group in &faces {
        for face in &group.0 {
            if face.unsigned_area() <= tolerance {
                continue;
            }
            let face_mp = MultiPolygon::new(vec![face.clone()]);
            let mut members: Vec<ImageId> = index
                .candidates(face)
                .into_iter()
                .filter(|(_, footprint)| {
                    face_mp.intersection(footprint).unsigned_area() > tolerance
                })
                .map(|(image, _)| image)
                .collect();
            members.sort_unstable();
            members.dedup();
            if members.len() < 2 {
                continue;
            }
            keyed.push((members, face.clone()));
        }
    }

    keyed.sort_by(|(members_a, face_a), (members_b, face_b)| {
        members_a.cmp(members_b).then_with(|| {
            let ca = face_a.centroid().map(|p| (p.x(), p.y())).unwrap_or((0.0, 0.0));
            let cb = face_b.centroid().map(|p| (p.x(), p.y())).unwrap_or((0.0, 0.0));
            ca.0.total_cmp(&cb.0).then(ca.1.total_cmp(&cb.1))
        })
    });

    keyed
        .into_iter()
        .enumerate()
        .map(|(i, (members, geometry))| OverlapRegion {
            id: i as u64 + 1,
            geometry,
            members,
        })
        .collect()
}

/// Fold every footprint into a set of pairwise-disjoint faces covering the
/// footprint union.
fn overlay(
    footprints: &[(ImageId, &MultiPolygon<f64>)],
    tolerance: f64,
) -> Vec<MultiPolygon<f64>> {
    let mut faces: Vec<MultiPolygon<f64>> = Vec::new();
    let mut covered: Option<MultiPolygon<f64>> = None;

    for (_, footprint) in footprints {
        let footprint_bbox = footprint.bounding_rect();
        let mut next: Vec<MultiPolygon<f64>> = Vec::with_capacity(faces.len() + 1);
        for face in faces {
            let disjoint = match (face.bounding_rect(), footprint_bbox) {
                (Some(a), Some(b)) => !rects_overlap(&a, &b),
                _ => true,
            };
            if disjoint {
                next.push(face);
                continue;
            }
            let inside = face.intersection(footprint);
            let outside = face.difference(footprint);
            if inside.unsigned_area() > tolerance {
                next.push(inside);
            }
            if outside.unsigned_area() > tolerance {
                next.push(outside);
            }
        }

        let remainder = match &covered {
            None => (*footprint).clone(),
            Some(union) => footprint.difference(union),
        };
        if remainder.unsigned_area() > tolerance {
            next.push(remainder);
        }

        covered = Some(match covered {
            None => (*footprint).clone(),
            Some(union) => union.union(footprint),
        });
        faces = next;
    }

    faces
}

#[inline]
fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
                (x0, y0),
            ]),
            vec![],
        )])
    }

    #[test]
    fn two_overlapping_squares_yield_one_region() {
        let footprints = vec![(1u64, square(0.0, 0.0, 10.0)), (2, square(5.0, 0.0, 10.0))];
        let regions = decompose(&footprints, DecomposeOptions::default());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].members, vec![1, 2]);
        assert!((regions[0].area() - 50.0).abs() < 1e-6);
    }

    #[test]
    fn disjoint_squares_yield_nothing() {
        let footprints = vec![(1u64, square(0.0, 0.0, 10.0)), (2, square(30.0, 0.0, 10.0))];
        let regions = decompose(&footprints, DecomposeOptions::default());
        assert!(regions.is_empty());
    }

    #[test]
    fn edge_adjacent_squares_produce_no_sliver_region() {
        // Shared edge only: intersection area is zero, below the tolerance.
        let footprints = vec![(1u64, square(0.0, 0.0, 10.0)), (2, square(10.0, 0.0, 10.0))];
        let regions = decompose(&footprints, DecomposeOptions::default());
        assert!(regions.is_empty());
    }

    #[test]
    fn empty_footprints_are_skipped() {
        let degenerate = MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]),
            vec![],
        )]);
        let footprints = vec![
            (1u64, square(0.0, 0.0, 10.0)),
            (2, square(5.0, 0.0, 10.0)),
            (3, degenerate),
        ];
        let regions = decompose(&footprints, DecomposeOptions::default());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].members, vec![1, 2]);
    }

    #[test]
    fn three_squares_partition_into_distinct_memberships() {
        // 1 and 2 overlap on x in [5, 10]; 3 overlaps both on y in [5, 10].
        let footprints = vec![
            (1u64, square(0.0, 0.0, 10.0)),
            (2, square(5.0, 0.0, 10.0)),
            (3, square(2.0, 5.0, 10.0)),
        ];
        let regions = decompose(&footprints, DecomposeOptions::default());
        assert!(regions.iter().all(|r| r.members.len() >= 2));
        assert!(regions.iter().all(|r| r.area() > 0.0));

        let memberships: Vec<Vec<ImageId>> =
            regions.iter().map(|r| r.members.clone()).collect();
        assert!(memberships.contains(&vec![1, 2]));
        assert!(memberships.contains(&vec![1, 3]));
        assert!(memberships.contains(&vec![2, 3]));
        assert!(memberships.contains(&vec![1, 2, 3]));

        let triple: f64 = regions
            .iter()
            .filter(|r| r.members == vec![1, 2, 3])
            .map(|r| r.area())
            .sum();
        // All three cover x in [5, 10], y in [5, 10].
        assert!((triple - 25.0).abs() < 1e-6);
    }

    #[test]
    fn rerunning_reproduces_the_same_region_set() {
        let footprints = vec![
            (1u64, square(0.0, 0.0, 20.0)),
            (2, square(10.0, 0.0, 20.0)),
            (3, square(0.0, 10.0, 20.0)),
            (4, square(10.0, 10.0, 20.0)),
        ];
        let first = decompose(&footprints, DecomposeOptions::default());
        let second = decompose(&footprints, DecomposeOptions::default());
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.members, b.members);
            assert!((a.area() - b.area()).abs() < 1e-12);
            assert_eq!(
                a.geometry.exterior().coords().count(),
                b.geometry.exterior().coords().count()
            );
        }
    }
}
