//! Control point assembly for one candidate ground location.
//!
//! Per candidate the builder walks: reference projection → per-image
//! registration → validation. The reference image anchors the candidate;
//! if its projection fails the candidate is abandoned outright. Every
//! other member image contributes a measure only when both its own
//! projection and the sub-pixel registration succeed; failures drop that
//! image's contribution and nothing else. A candidate survives validation
//! with two or more measures; otherwise it is discarded without side
//! effects.
//!
//! After validation an optional refinement pass re-derives the ground
//! position from the reference pixel via `image_to_ground`. The refined
//! position is kept only while it stays inside the source region;
//! otherwise the containment policy decides between reverting to the
//! seeded position and keeping the refined one flagged low-confidence.

use crate::elevation::ElevationSource;
use crate::ellipsoid::Ellipsoid;
use crate::overlap::OverlapRegion;
use crate::register::SubpixelRegister;
use crate::sensor::{SensorModel, SensorSet};
use crate::types::{ImageId, Measure, PixelCoord, Point};
use geo::Contains;
use log::debug;
use serde::{Deserialize, Serialize};

/// Which member image anchors a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferencePolicy {
    /// Lowest image id in the region membership.
    LowestId,
    /// A caller-supplied image; candidates in regions that do not contain
    /// it are abandoned.
    Fixed(ImageId),
}

/// What to do when the refined ground position leaves the region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainmentPolicy {
    /// Restore the seeded ground position.
    Revert,
    /// Keep the refined position and mark the point low-confidence.
    Flag,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BuilderOptions {
    pub reference: ReferencePolicy,
    pub containment: ContainmentPolicy,
    /// Re-derive the ground position from the reference pixel after
    /// registration.
    pub refine_ground: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            reference: ReferencePolicy::LowestId,
            containment: ContainmentPolicy::Revert,
            refine_ground: true,
        }
    }
}

/// Terminal state of one candidate.
#[derive(Debug)]
pub enum CandidateOutcome {
    Accepted(Point),
    /// The reference image rejected the projection; no point.
    ReferenceProjectionFailed,
    /// Fewer than two images observed the feature; `registered` counts the
    /// non-reference measures that succeeded.
    TooFewMeasures { registered: usize },
}

/// Builds points for candidates against one set of collaborators.
pub struct PointBuilder<'a> {
    sensors: &'a SensorSet,
    registrar: &'a dyn SubpixelRegister,
    elevation: Option<&'a dyn ElevationSource>,
    ellipsoid: Ellipsoid,
    options: BuilderOptions,
}

impl<'a> PointBuilder<'a> {
    pub fn new(
        sensors: &'a SensorSet,
        registrar: &'a dyn SubpixelRegister,
        elevation: Option<&'a dyn ElevationSource>,
        ellipsoid: Ellipsoid,
        options: BuilderOptions,
    ) -> Self {
        Self {
            sensors,
            registrar,
            elevation,
            ellipsoid,
            options,
        }
    }

    fn reference_of(&self, members: &[ImageId]) -> Option<ImageId> {
        match self.options.reference {
            ReferencePolicy::LowestId => members.iter().copied().min(),
            ReferencePolicy::Fixed(id) => members.contains(&id).then_some(id),
        }
    }

    /// Run one candidate (lon, lat in degrees) against the region's
    /// membership.
    pub fn build(&self, lon: f64, lat: f64, region: &OverlapRegion) -> CandidateOutcome {
        let Some(reference) = self.reference_of(&region.members) else {
            debug!("region {}: no reference image for candidate", region.id);
            return CandidateOutcome::ReferenceProjectionFailed;
        };
        let Some(reference_sensor) = self.sensors.handle(reference) else {
            debug!("region {}: no sensor model for reference image {reference}", region.id);
            return CandidateOutcome::ReferenceProjectionFailed;
        };

        let height = self
            .elevation
            .and_then(|source| source.height_at(lon, lat))
            .unwrap_or(0.0);
        let ground = self.ellipsoid.geodetic_to_geocentric(lon, lat, height);

        let reference_pixel = match reference_sensor.ground_to_image(&ground) {
            Ok(pixel) => pixel,
            Err(err) => {
                debug!(
                    "candidate ({lon:.6}, {lat:.6}): reference image {reference} rejected: {err}"
                );
                return CandidateOutcome::ReferenceProjectionFailed;
            }
        };

        let mut point = Point::free(ground);
        point
            .measures
            .push(Measure::projected(reference, reference_sensor.serial(), reference_pixel));

        for &image in region.members.iter().filter(|&&m| m != reference) {
            let Some(sensor) = self.sensors.handle(image) else {
                debug!("region {}: no sensor model for image {image}", region.id);
                continue;
            };
            let initial = match sensor.ground_to_image(&ground) {
                Ok(pixel) => pixel,
                Err(err) => {
                    debug!("candidate ({lon:.6}, {lat:.6}): image {image} rejected: {err}");
                    continue;
                }
            };
            match self
                .registrar
                .register(reference, reference_pixel, image, initial)
            {
                Some(registration) => point.measures.push(Measure::registered(
                    image,
                    sensor.serial(),
                    initial,
                    registration.pixel,
                )),
                None => {
                    debug!("candidate ({lon:.6}, {lat:.6}): image {image} did not register");
                }
            }
        }

        if !point.is_valid() {
            return CandidateOutcome::TooFewMeasures {
                registered: point.measures.len() - 1,
            };
        }

        if self.options.refine_ground {
            self.refine_ground_position(&mut point, &*reference_sensor, reference_pixel, region);
        }

        CandidateOutcome::Accepted(point)
    }

    /// Re-derive the ground position from the reference pixel, keeping it
    /// only while it stays inside the region.
    fn refine_ground_position(
        &self,
        point: &mut Point,
        reference_sensor: &dyn SensorModel,
        reference_pixel: PixelCoord,
        region: &OverlapRegion,
    ) {
        let refined = match reference_sensor.image_to_ground(reference_pixel) {
            Ok(ground) => ground,
            Err(err) => {
                debug!("ground refinement skipped: {err}");
                return;
            }
        };
        let (lon, lat, _height) = self.ellipsoid.geocentric_to_geodetic(&refined);
        if region.geometry.contains(&geo::Point::new(lon, lat)) {
            point.apriori = refined;
            point.adjusted = refined;
        } else {
            match self.options.containment {
                ContainmentPolicy::Revert => {
                    debug!("refined ground position left region {}; reverting", region.id);
                }
                ContainmentPolicy::Flag => {
                    point.apriori = refined;
                    point.adjusted = refined;
                    point.low_confidence = true;
                }
            }
        }
    }
}
