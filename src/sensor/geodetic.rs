//! Adapter for imaging pipelines queried in geodetic coordinates.

use super::{ProjectionError, SensorModel};
use crate::ellipsoid::Ellipsoid;
use crate::types::PixelCoord;
use nalgebra::Vector3;

/// External pipeline addressed in geodetic lon/lat degrees. Height in
/// `image_to_ground` answers is 0 when the backend carries no elevation
/// data.
pub trait GeodeticQuery: Send + Sync {
    /// (sample, line) for a geodetic location, `None` outside the image.
    fn ground_to_image(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// (lon, lat, height) for a pixel, `None` when unresolvable.
    fn image_to_ground(&self, sample: f64, line: f64) -> Option<(f64, f64, f64)>;

    fn serial(&self) -> &str;
}

/// [`SensorModel`] over a [`GeodeticQuery`], converting geocentric
/// coordinates through the body's ellipsoid at the boundary.
pub struct GeodeticSensor {
    query: Box<dyn GeodeticQuery>,
    ellipsoid: Ellipsoid,
}

impl GeodeticSensor {
    pub fn new(query: Box<dyn GeodeticQuery>, ellipsoid: Ellipsoid) -> Self {
        Self { query, ellipsoid }
    }
}

impl SensorModel for GeodeticSensor {
    fn ground_to_image(&self, ground: &Vector3<f64>) -> Result<PixelCoord, ProjectionError> {
        let (lon, lat, _height) = self.ellipsoid.geocentric_to_geodetic(ground);
        self.query
            .ground_to_image(lon, lat)
            .map(|(sample, line)| PixelCoord::new(sample, line))
            .ok_or(ProjectionError::OutOfView)
    }

    fn image_to_ground(&self, pixel: PixelCoord) -> Result<Vector3<f64>, ProjectionError> {
        self.query
            .image_to_ground(pixel.sample, pixel.line)
            .map(|(lon, lat, height)| self.ellipsoid.geodetic_to_geocentric(lon, lat, height))
            .ok_or(ProjectionError::NoGroundIntersection {
                sample: pixel.sample,
                line: pixel.line,
            })
    }

    fn serial(&self) -> &str {
        self.query.serial()
    }
}
