//! Sensor-model capability for moving between ground and image space.
//!
//! Overview
//! - [`SensorModel`] is the one capability the pipeline consumes: project a
//!   geocentric ground point into (sample, line) and intersect a pixel back
//!   to the ground. Implementations are per image and opaque; the math
//!   lives with the caller's camera stack.
//! - Two adapter variants cover the common external shapes:
//!   [`EcefSensor`] drives a camera-model object addressed directly in
//!   body-fixed coordinates, while [`GeodeticSensor`] drives a pipeline
//!   queried in geodetic lon/lat and converts through an [`Ellipsoid`].
//! - [`SensorSet`] keys shared handles by image id. Handles are `Arc`s and
//!   the trait requires `Send + Sync`; a worker clones the handles it needs
//!   for the scope of one overlap region and drops them afterwards.
//!
//! Rejections surface as [`ProjectionError`] and are fatal only for the
//! affected image within a candidate, never for the region.

mod ecef;
mod geodetic;

pub use ecef::{EcefCameraObject, EcefSensor};
pub use geodetic::{GeodeticQuery, GeodeticSensor};

use crate::types::{ImageId, PixelCoord};
use nalgebra::Vector3;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("ground point projects outside the image field of view")]
    OutOfView,
    #[error("no ground intersection for pixel ({sample}, {line})")]
    NoGroundIntersection { sample: f64, line: f64 },
}

/// Per-image projection capability.
pub trait SensorModel: Send + Sync {
    /// Project a geocentric ground point into pixel coordinates.
    fn ground_to_image(&self, ground: &Vector3<f64>) -> Result<PixelCoord, ProjectionError>;

    /// Intersect a pixel's look direction with the ground.
    fn image_to_ground(&self, pixel: PixelCoord) -> Result<Vector3<f64>, ProjectionError>;

    /// Stable sensor identity string, recorded on measures.
    fn serial(&self) -> &str;
}

/// Sensor handles keyed by image id.
#[derive(Clone, Default)]
pub struct SensorSet {
    sensors: HashMap<ImageId, Arc<dyn SensorModel>>,
}

impl SensorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: ImageId, sensor: Arc<dyn SensorModel>) {
        self.sensors.insert(image, sensor);
    }

    /// Clone the handle for one image, scoped to the caller.
    pub fn handle(&self, image: ImageId) -> Option<Arc<dyn SensorModel>> {
        self.sensors.get(&image).cloned()
    }

    pub fn contains(&self, image: ImageId) -> bool {
        self.sensors.contains_key(&image)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
