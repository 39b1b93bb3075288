mod common;

use common::stubs::square;
use geo::{Area, BooleanOps, MultiPolygon};
use tiegen::overlap::{decompose, DecomposeOptions};
use tiegen::types::ImageId;

/// Four 20×20 squares staggered so every pair overlaps and the centre is
/// covered by all four.
fn staggered_footprints() -> Vec<(ImageId, MultiPolygon<f64>)> {
    vec![
        (1, square(0.0, 0.0, 20.0)),
        (2, square(10.0, 0.0, 20.0)),
        (3, square(0.0, 10.0, 20.0)),
        (4, square(10.0, 10.0, 20.0)),
    ]
}

#[test]
fn staggered_squares_partition_into_expected_memberships() {
    let _ = env_logger::builder().is_test(true).try_init();
    let regions = decompose(&staggered_footprints(), DecomposeOptions::default());

    assert!(regions.iter().all(|r| r.members.len() >= 2));
    assert!(regions.iter().all(|r| r.area() > 0.0));
    assert_eq!(regions.len(), 5);

    let memberships: Vec<Vec<ImageId>> = regions.iter().map(|r| r.members.clone()).collect();
    for expected in [
        vec![1, 2],
        vec![1, 3],
        vec![2, 4],
        vec![3, 4],
        vec![1, 2, 3, 4],
    ] {
        assert!(
            memberships.contains(&expected),
            "missing membership {expected:?} in {memberships:?}"
        );
    }

    let centre = regions
        .iter()
        .find(|r| r.members == vec![1, 2, 3, 4])
        .expect("four-image overlap present");
    assert!((centre.area() - 100.0).abs() < 1e-6);
}

#[test]
fn decomposition_preserves_the_overlapping_portions() {
    let footprints = staggered_footprints();
    let regions = decompose(&footprints, DecomposeOptions::default());

    // The union of emitted region geometries must reproduce the union of
    // all pairwise footprint intersections.
    let mut pairwise: Option<MultiPolygon<f64>> = None;
    for i in 0..footprints.len() {
        for j in (i + 1)..footprints.len() {
            let overlap = footprints[i].1.intersection(&footprints[j].1);
            if overlap.unsigned_area() == 0.0 {
                continue;
            }
            pairwise = Some(match pairwise {
                None => overlap,
                Some(acc) => acc.union(&overlap),
            });
        }
    }
    let expected_area = pairwise.map(|mp| mp.unsigned_area()).unwrap_or(0.0);

    // Regions are pairwise disjoint, so their areas sum to the covered
    // area.
    let region_area: f64 = regions.iter().map(|r| r.area()).sum();
    assert!(
        (region_area - expected_area).abs() < 1e-6,
        "regions cover {region_area}, overlapping portions cover {expected_area}"
    );
}

#[test]
fn rerun_on_unchanged_footprints_is_identical() {
    let footprints = staggered_footprints();
    let first = decompose(&footprints, DecomposeOptions::default());
    let second = decompose(&footprints, DecomposeOptions::default());

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.members, b.members);
        assert_eq!(a.geometry, b.geometry);
    }
}

#[test]
fn single_image_and_uncovered_areas_are_excluded() {
    let regions = decompose(&staggered_footprints(), DecomposeOptions::default());
    // Every region lies inside at least two footprints, so none may reach
    // into a corner covered by a single image.
    let corners = [(1.0, 1.0), (29.0, 1.0), (1.0, 29.0), (29.0, 29.0)];
    for region in &regions {
        for &(x, y) in &corners {
            use geo::Contains;
            assert!(
                !region.geometry.contains(&geo::Point::new(x, y)),
                "region {} reaches single-image corner ({x}, {y})",
                region.id
            );
        }
    }
}
