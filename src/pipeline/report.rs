use crate::types::Point;
use serde::Serialize;

/// Result of one pipeline run: the accepted points plus the run summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub points: Vec<Point>,
    pub summary: RunSummary,
}

/// Counters describing what the run did and what it skipped.
///
/// Skips and discards are expected outcomes; the summary is the place they
/// surface, not the error channel.
#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub regions_total: usize,
    pub regions_processed: usize,
    /// Regions at or below the size threshold.
    pub regions_skipped_small: usize,
    /// Regions whose membership references an image without a sensor model.
    pub regions_skipped_missing_sensor: usize,
    /// Regions with empty or non-finite geometry.
    pub regions_skipped_bad_geometry: usize,
    pub candidates_placed: usize,
    /// Candidates abandoned because the reference projection failed.
    pub candidates_without_reference: usize,
    /// Candidates discarded with fewer than two measures.
    pub candidates_below_measure_minimum: usize,
    /// Per-image registrations that did not converge.
    pub registrations_failed: usize,
    pub points_accepted: usize,
    pub measures_emitted: usize,
    pub elapsed_ms: f64,
}
