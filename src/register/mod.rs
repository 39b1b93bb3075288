//! Cross-image sub-pixel registration.
//!
//! Overview
//! - The point builder registers through the [`SubpixelRegister`] seam;
//!   [`Registrar`] is the shipped implementation.
//! - [`Registrar`] clips a reference window and a search patch through the
//!   per-image [`RasterSource`] collaborators, scores every integer offset
//!   within the search radius by zero-mean normalized cross-correlation,
//!   re-centres and repeats while the peak sits on the search border, and
//!   finishes with a per-axis quadratic fit for the sub-pixel shift.
//! - `None` means not registered: windows could not be clipped, texture
//!   was flat, the peak correlation stayed below the configured minimum,
//!   or the search never converged into the interior. The caller drops
//!   that image's measure and moves on.

mod search;
mod zncc;

pub use zncc::zncc;

use crate::raster::RasterSource;
use crate::types::{ImageId, PixelCoord};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Options for the correlation search.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RegisterOptions {
    /// Side of the square comparison window in pixels; forced odd.
    pub window_size: usize,
    /// Integer search radius around the initial estimate, per axis.
    pub search_radius: usize,
    /// Minimum peak correlation for a registration to count.
    pub min_correlation: f64,
    /// Re-centering attempts while the peak sits on the search border.
    pub max_iterations: usize,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            window_size: 71,
            search_radius: 5,
            min_correlation: 0.7,
            max_iterations: 3,
        }
    }
}

/// Successful sub-pixel registration in the target image.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Registration {
    pub pixel: PixelCoord,
    /// Peak zero-mean normalized cross-correlation, in [-1, 1].
    pub correlation: f64,
}

/// Registration seam consumed by the point builder.
pub trait SubpixelRegister: Send + Sync {
    /// Refine `initial` in `target` so it observes the same surface
    /// feature as `reference_pixel` does in `reference`. `None` means not
    /// registered: an expected outcome, never an error.
    fn register(
        &self,
        reference: ImageId,
        reference_pixel: PixelCoord,
        target: ImageId,
        initial: PixelCoord,
    ) -> Option<Registration>;
}

/// Correlation-based registrar over per-image raster sources.
pub struct Registrar {
    rasters: HashMap<ImageId, Arc<dyn RasterSource>>,
    options: RegisterOptions,
}

impl Registrar {
    pub fn new(options: RegisterOptions) -> Self {
        Self {
            rasters: HashMap::new(),
            options,
        }
    }

    pub fn insert_raster(&mut self, image: ImageId, raster: Arc<dyn RasterSource>) {
        self.rasters.insert(image, raster);
    }

    pub fn options(&self) -> &RegisterOptions {
        &self.options
    }
}

impl SubpixelRegister for Registrar {
    fn register(
        &self,
        reference: ImageId,
        reference_pixel: PixelCoord,
        target: ImageId,
        initial: PixelCoord,
    ) -> Option<Registration> {
        let window = self.options.window_size.max(3) | 1;
        let half = (window as i64 - 1) / 2;
        let radius = self.options.search_radius.max(1);

        let reference_window = self.rasters.get(&reference)?.clip_window(
            reference_pixel.sample,
            reference_pixel.line,
            window,
        )?;
        let target_raster = self.rasters.get(&target)?;

        let mut center = initial;
        for iteration in 0..self.options.max_iterations.max(1) {
            let patch =
                target_raster.clip_window(center.sample, center.line, window + 2 * radius)?;
            let surface = search::correlate(&reference_window, &patch, radius)?;
            let (dx, dy, score) = surface.peak()?;
            if score < self.options.min_correlation {
                debug!(
                    "registration {reference}->{target}: peak correlation {score:.3} below minimum"
                );
                return None;
            }

            // Absolute location of the best candidate window's centre.
            let peak_sample = (patch.origin_sample + radius as i64 + half) as f64 + dx as f64;
            let peak_line = (patch.origin_line + radius as i64 + half) as f64 + dy as f64;

            let on_border = dx.unsigned_abs() as usize == radius || dy.unsigned_abs() as usize == radius;
            if on_border {
                if iteration + 1 == self.options.max_iterations.max(1) {
                    debug!("registration {reference}->{target}: search never left the border");
                    return None;
                }
                center = PixelCoord::new(peak_sample, peak_line);
                continue;
            }

            let (fx, fy) = surface.subpixel_peak(dx, dy);
            return Some(Registration {
                pixel: PixelCoord::new(peak_sample + fx, peak_line + fy),
                correlation: score,
            });
        }
        None
    }
}
