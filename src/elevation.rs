//! Optional elevation collaborator.
//!
//! Candidate heights come from an elevation source when one is configured;
//! without one, heights default to 0 (on the ellipsoid) everywhere.

/// Height lookup over a geodetic grid, typically backed by a DEM.
pub trait ElevationSource: Send + Sync {
    /// Height above the ellipsoid at (lon, lat) in degrees, or `None` when
    /// the location falls outside the source's coverage.
    fn height_at(&self, lon: f64, lat: f64) -> Option<f64>;
}

/// Constant height everywhere; useful for bodies modeled without terrain.
#[derive(Clone, Copy, Debug)]
pub struct UniformElevation(pub f64);

impl ElevationSource for UniformElevation {
    fn height_at(&self, _lon: f64, _lat: f64) -> Option<f64> {
        Some(self.0)
    }
}
