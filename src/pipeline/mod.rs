//! Overlap-driven control point pipeline.
//!
//! Overview
//! - [`Pipeline::run`] walks a set of overlap regions, places candidates
//!   with the configured policy, builds points through
//!   [`PointBuilder`](crate::builder::PointBuilder), and aggregates a
//!   [`RunReport`].
//! - Regions are independent units of work with no shared mutable state,
//!   so they fan out across rayon workers; results merge back in input
//!   order, which keeps reports reproducible.
//! - Regions at or below the size threshold, with broken geometry, or
//!   whose membership references an image without a sensor model are
//!   skipped (warned and counted), never fatal. Per-candidate and
//!   per-image failures are absorbed inside the builder.
//! - [`Pipeline::run_and_store`] adds the persistence boundary: query
//!   regions, run, then hand all accepted points to the sink in one batch.
//!
//! Submodules
//! - `report`: run report and summary counters.
//! - `store`: persistence collaborator traits.
//! - `dispatch`: cluster-mode job messages and batch submission.

mod dispatch;
mod report;
mod store;

pub use dispatch::{dispatch_overlap_jobs, DispatchError, JobDispatcher, OverlapJob};
pub use report::{RunReport, RunSummary};
pub use store::{OverlapStore, PointSink, StoreError};

use crate::builder::{BuilderOptions, CandidateOutcome, PointBuilder};
use crate::distribute::{distribute, PlacementPolicy};
use crate::elevation::ElevationSource;
use crate::ellipsoid::Ellipsoid;
use crate::overlap::OverlapRegion;
use crate::register::SubpixelRegister;
use crate::sensor::SensorSet;
use crate::types::{ImageId, Point};
use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Pipeline-wide options.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Regions with area at or below this are skipped.
    pub size_threshold: f64,
    pub placement: PlacementPolicy,
    pub builder: BuilderOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            size_threshold: 0.0007,
            placement: PlacementPolicy::Grid { spacing: 0.01 },
            builder: BuilderOptions::default(),
        }
    }
}

/// Drives candidate placement and point building over overlap regions.
pub struct Pipeline {
    sensors: SensorSet,
    registrar: Arc<dyn SubpixelRegister>,
    elevation: Option<Arc<dyn ElevationSource>>,
    ellipsoid: Ellipsoid,
    options: PipelineOptions,
}

enum RegionOutcome {
    SkippedSmall,
    SkippedMissingSensor,
    SkippedBadGeometry,
    Processed {
        points: Vec<Point>,
        candidates: usize,
        without_reference: usize,
        below_minimum: usize,
        registrations_failed: usize,
    },
}

impl Pipeline {
    pub fn new(
        sensors: SensorSet,
        registrar: Arc<dyn SubpixelRegister>,
        ellipsoid: Ellipsoid,
        options: PipelineOptions,
    ) -> Self {
        Self {
            sensors,
            registrar,
            elevation: None,
            ellipsoid,
            options,
        }
    }

    pub fn with_elevation(mut self, elevation: Arc<dyn ElevationSource>) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Process every region and aggregate accepted points plus counters.
    pub fn run(&self, regions: &[OverlapRegion]) -> RunReport {
        let start = Instant::now();
        let outcomes: Vec<RegionOutcome> = regions
            .par_iter()
            .map(|region| self.run_region(region))
            .collect();

        let mut summary = RunSummary {
            regions_total: regions.len(),
            ..Default::default()
        };
        let mut points = Vec::new();
        for outcome in outcomes {
            match outcome {
                RegionOutcome::SkippedSmall => summary.regions_skipped_small += 1,
                RegionOutcome::SkippedMissingSensor => {
                    summary.regions_skipped_missing_sensor += 1
                }
                RegionOutcome::SkippedBadGeometry => summary.regions_skipped_bad_geometry += 1,
                RegionOutcome::Processed {
                    points: region_points,
                    candidates,
                    without_reference,
                    below_minimum,
                    registrations_failed,
                } => {
                    summary.regions_processed += 1;
                    summary.candidates_placed += candidates;
                    summary.candidates_without_reference += without_reference;
                    summary.candidates_below_measure_minimum += below_minimum;
                    summary.registrations_failed += registrations_failed;
                    summary.points_accepted += region_points.len();
                    summary.measures_emitted +=
                        region_points.iter().map(|p| p.measures.len()).sum::<usize>();
                    points.extend(region_points);
                }
            }
        }
        summary.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        RunReport { points, summary }
    }

    /// Query regions from the store, run, and hand every accepted point to
    /// the sink as one batch.
    pub fn run_and_store(
        &self,
        store: &dyn OverlapStore,
        sink: &dyn PointSink,
    ) -> Result<RunReport, StoreError> {
        let regions = store.query_overlaps(self.options.size_threshold)?;
        let report = self.run(&regions);
        if !report.points.is_empty() {
            sink.bulk_insert_points(&report.points)?;
        }
        Ok(report)
    }

    fn run_region(&self, region: &OverlapRegion) -> RegionOutcome {
        if let Err(err) = region.validate() {
            warn!("{err}; skipping region");
            return RegionOutcome::SkippedBadGeometry;
        }
        if region.area() <= self.options.size_threshold {
            return RegionOutcome::SkippedSmall;
        }
        let missing: Vec<ImageId> = region
            .members
            .iter()
            .copied()
            .filter(|&image| !self.sensors.contains(image))
            .collect();
        if !missing.is_empty() {
            warn!(
                "overlap region {}: no sensor model for image(s) {missing:?}; skipping region",
                region.id
            );
            return RegionOutcome::SkippedMissingSensor;
        }

        let candidates = distribute(
            &region.geometry,
            self.options.size_threshold,
            &self.options.placement,
        );
        if candidates.is_empty() {
            warn!("overlap region {}: no candidate points placed", region.id);
            return RegionOutcome::Processed {
                points: Vec::new(),
                candidates: 0,
                without_reference: 0,
                below_minimum: 0,
                registrations_failed: 0,
            };
        }

        let builder = PointBuilder::new(
            &self.sensors,
            &*self.registrar,
            self.elevation.as_deref(),
            self.ellipsoid,
            self.options.builder,
        );

        let mut points = Vec::new();
        let mut without_reference = 0usize;
        let mut below_minimum = 0usize;
        let mut registrations_failed = 0usize;
        let candidate_count = candidates.len();
        for (lon, lat) in candidates {
            match builder.build(lon, lat, region) {
                CandidateOutcome::Accepted(point) => {
                    registrations_failed += region.members.len() - point.measures.len();
                    points.push(point);
                }
                CandidateOutcome::ReferenceProjectionFailed => without_reference += 1,
                CandidateOutcome::TooFewMeasures { registered } => {
                    below_minimum += 1;
                    registrations_failed += region.members.len() - 1 - registered;
                }
            }
        }

        RegionOutcome::Processed {
            points,
            candidates: candidate_count,
            without_reference,
            below_minimum,
            registrations_failed,
        }
    }
}
