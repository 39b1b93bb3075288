#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod builder;
pub mod distribute;
pub mod ellipsoid;
pub mod overlap;
pub mod pipeline;
pub mod types;

// Collaborator seams and lower-level machinery.
pub mod config;
pub mod elevation;
pub mod raster;
pub mod register;
pub mod sensor;

// --- High-level re-exports -------------------------------------------------

// Main entry points: decomposition + pipeline.
pub use crate::overlap::{decompose, DecomposeOptions, OverlapRegion};
pub use crate::pipeline::{Pipeline, PipelineOptions, RunReport, RunSummary};

// Building blocks that callers wire together.
pub use crate::builder::{
    BuilderOptions, CandidateOutcome, ContainmentPolicy, PointBuilder, ReferencePolicy,
};
pub use crate::distribute::{distribute, PlacementPolicy};
pub use crate::ellipsoid::Ellipsoid;
pub use crate::register::{Registrar, RegisterOptions, SubpixelRegister};
pub use crate::sensor::{SensorModel, SensorSet};
pub use crate::types::{ImageId, Measure, MeasureType, PixelCoord, Point, PointType};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::ellipsoid::Ellipsoid;
    pub use crate::overlap::{decompose, DecomposeOptions, OverlapRegion};
    pub use crate::pipeline::{Pipeline, PipelineOptions};
    pub use crate::types::{ImageId, Measure, PixelCoord, Point};
}
