//! Geodetic ↔ geocentric coordinate conversion on a biaxial ellipsoid.
//!
//! Ground positions travel through the pipeline in body-centered fixed
//! (geocentric) coordinates; overlap geometry and candidate placement work
//! in geodetic longitude/latitude degrees. [`Ellipsoid`] carries the two
//! conversions between them. Both are pure functions of the input; the
//! inverse iterates on latitude and converges in a handful of steps for
//! any point away from the body center.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EllipsoidError {
    #[error("degenerate ellipsoid axes: semi-major {semi_major}, semi-minor {semi_minor}")]
    Degenerate { semi_major: f64, semi_minor: f64 },
}

/// Biaxial reference ellipsoid, axes in working units (typically metres).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Ellipsoid {
    semi_major: f64,
    semi_minor: f64,
}

impl Ellipsoid {
    /// Requires `semi_major >= semi_minor > 0`.
    pub fn new(semi_major: f64, semi_minor: f64) -> Result<Self, EllipsoidError> {
        let valid = semi_minor > 0.0
            && semi_major >= semi_minor
            && semi_major.is_finite()
            && semi_minor.is_finite();
        if !valid {
            return Err(EllipsoidError::Degenerate {
                semi_major,
                semi_minor,
            });
        }
        Ok(Self {
            semi_major,
            semi_minor,
        })
    }

    pub fn sphere(radius: f64) -> Result<Self, EllipsoidError> {
        Self::new(radius, radius)
    }

    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// First eccentricity squared.
    #[inline]
    fn e2(&self) -> f64 {
        1.0 - (self.semi_minor * self.semi_minor) / (self.semi_major * self.semi_major)
    }

    /// Convert geodetic (lon, lat in degrees, height in working units) to
    /// geocentric coordinates.
    pub fn geodetic_to_geocentric(&self, lon_deg: f64, lat_deg: f64, height: f64) -> Vector3<f64> {
        let lon = lon_deg.to_radians();
        let lat = lat_deg.to_radians();
        let e2 = self.e2();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        // Prime vertical radius of curvature.
        let n = self.semi_major / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        Vector3::new(
            (n + height) * cos_lat * lon.cos(),
            (n + height) * cos_lat * lon.sin(),
            (n * (1.0 - e2) + height) * sin_lat,
        )
    }

    /// Convert geocentric coordinates back to geodetic (lon, lat in
    /// degrees, height in working units).
    pub fn geocentric_to_geodetic(&self, ground: &Vector3<f64>) -> (f64, f64, f64) {
        let (x, y, z) = (ground.x, ground.y, ground.z);
        let e2 = self.e2();
        let p = (x * x + y * y).sqrt();
        if p < 1e-9 {
            // On the polar axis the longitude is arbitrary.
            let lat = if z >= 0.0 { 90.0 } else { -90.0 };
            return (0.0, lat, z.abs() - self.semi_minor);
        }
        let lon = y.atan2(x);

        let mut lat = (z / (p * (1.0 - e2))).atan();
        let mut height = 0.0;
        for _ in 0..12 {
            let sin_lat = lat.sin();
            let n = self.semi_major / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            height = p / lat.cos() - n;
            let next = (z / (p * (1.0 - e2 * n / (n + height)))).atan();
            let done = (next - lat).abs() < 1e-14;
            lat = next;
            if done {
                break;
            }
        }
        (lon.to_degrees(), lat.to_degrees(), height)
    }
}
