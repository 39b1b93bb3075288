//! Adapter for camera-model objects addressed in body-fixed coordinates.

use super::{ProjectionError, SensorModel};
use crate::types::PixelCoord;
use nalgebra::Vector3;

/// External camera-model object operating directly on geocentric
/// coordinates. `None` results mean the model rejected the input.
pub trait EcefCameraObject: Send + Sync {
    /// (sample, line) for a body-fixed ground point, `None` outside the
    /// field of view.
    fn ground_to_image(&self, x: f64, y: f64, z: f64) -> Option<(f64, f64)>;

    /// Body-fixed ground intersection for a pixel, `None` when the look
    /// direction misses the body.
    fn image_to_ground(&self, sample: f64, line: f64) -> Option<(f64, f64, f64)>;

    fn serial(&self) -> &str;
}

/// [`SensorModel`] over an [`EcefCameraObject`].
pub struct EcefSensor {
    camera: Box<dyn EcefCameraObject>,
}

impl EcefSensor {
    pub fn new(camera: Box<dyn EcefCameraObject>) -> Self {
        Self { camera }
    }
}

impl SensorModel for EcefSensor {
    fn ground_to_image(&self, ground: &Vector3<f64>) -> Result<PixelCoord, ProjectionError> {
        self.camera
            .ground_to_image(ground.x, ground.y, ground.z)
            .map(|(sample, line)| PixelCoord::new(sample, line))
            .ok_or(ProjectionError::OutOfView)
    }

    fn image_to_ground(&self, pixel: PixelCoord) -> Result<Vector3<f64>, ProjectionError> {
        self.camera
            .image_to_ground(pixel.sample, pixel.line)
            .map(|(x, y, z)| Vector3::new(x, y, z))
            .ok_or(ProjectionError::NoGroundIntersection {
                sample: pixel.sample,
                line: pixel.line,
            })
    }

    fn serial(&self) -> &str {
        self.camera.serial()
    }
}
