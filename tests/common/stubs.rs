//! Shared stub collaborators for the integration suites.

use std::sync::Arc;

use geo::{LineString, MultiPolygon, Polygon};
use tiegen::register::{Registration, SubpixelRegister};
use tiegen::sensor::{EcefCameraObject, EcefSensor, SensorSet};
use tiegen::types::{ImageId, PixelCoord};

/// Axis-aligned square footprint.
pub fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![square_polygon(x0, y0, size)])
}

pub fn square_polygon(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]),
        vec![],
    )
}

/// Camera returning a fixed pixel for every ground point; `None` models a
/// sensor that rejects all projections.
pub struct FixedCamera {
    serial: String,
    pixel: Option<(f64, f64)>,
}

impl FixedCamera {
    pub fn new(image: ImageId, pixel: Option<(f64, f64)>) -> Self {
        Self {
            serial: format!("STUB/{image}"),
            pixel,
        }
    }
}

impl EcefCameraObject for FixedCamera {
    fn ground_to_image(&self, _x: f64, _y: f64, _z: f64) -> Option<(f64, f64)> {
        self.pixel
    }

    fn image_to_ground(&self, _sample: f64, _line: f64) -> Option<(f64, f64, f64)> {
        None
    }

    fn serial(&self) -> &str {
        &self.serial
    }
}

/// Sensor set over fixed cameras; `None` pixels model failing projections.
pub fn fixed_sensors(cameras: Vec<(ImageId, Option<(f64, f64)>)>) -> SensorSet {
    let mut sensors = SensorSet::new();
    for (image, pixel) in cameras {
        sensors.insert(
            image,
            Arc::new(EcefSensor::new(Box::new(FixedCamera::new(image, pixel)))),
        );
    }
    sensors
}

/// Deterministic registrar shifting the initial estimate by a fixed
/// offset; images in `failing` never register.
pub struct OffsetRegistrar {
    pub offset: (f64, f64),
    pub failing: Vec<ImageId>,
}

impl OffsetRegistrar {
    pub fn shifting(offset: (f64, f64)) -> Self {
        Self {
            offset,
            failing: Vec::new(),
        }
    }

    pub fn failing_for(offset: (f64, f64), failing: Vec<ImageId>) -> Self {
        Self { offset, failing }
    }
}

impl SubpixelRegister for OffsetRegistrar {
    fn register(
        &self,
        _reference: ImageId,
        _reference_pixel: PixelCoord,
        target: ImageId,
        initial: PixelCoord,
    ) -> Option<Registration> {
        if self.failing.contains(&target) {
            return None;
        }
        Some(Registration {
            pixel: PixelCoord::new(
                initial.sample + self.offset.0,
                initial.line + self.offset.1,
            ),
            correlation: 0.95,
        })
    }
}
