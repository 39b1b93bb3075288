use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Identifier of a registered image.
///
/// Regions and measures hold image ids only; the images themselves are
/// owned by the caller's working set.
pub type ImageId = u64;

/// Pixel location in (sample, line) order: sample is the column, line the
/// row, both in full-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelCoord {
    pub sample: f64,
    pub line: f64,
}

impl PixelCoord {
    pub fn new(sample: f64, line: f64) -> Self {
        Self { sample, line }
    }
}

/// Tag distinguishing free tie points from constrained and ground control.
///
/// The generation pipeline emits [`PointType::Free`]; the other variants
/// are reserved for points constrained downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointType {
    Free,
    Constrained,
    Ground,
}

/// How a measure's pixel location was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureType {
    /// Back-projected through the image's sensor model.
    Projected,
    /// Refined by sub-pixel registration against the reference image.
    Registered,
}

/// One image's observation of a [`Point`].
///
/// A measure is owned exclusively by its point; it records both the
/// apriori pixel (the initial back-projection) and the current pixel.
#[derive(Clone, Debug, Serialize)]
pub struct Measure {
    pub image_id: ImageId,
    /// Stable sensor identity string, recorded for downstream matching.
    pub serial: String,
    pub sample: f64,
    pub line: f64,
    pub apriori_sample: f64,
    pub apriori_line: f64,
    pub measure_type: MeasureType,
}

impl Measure {
    /// Measure whose pixel comes straight from a sensor-model projection.
    pub fn projected(image_id: ImageId, serial: &str, pixel: PixelCoord) -> Self {
        Self {
            image_id,
            serial: serial.to_string(),
            sample: pixel.sample,
            line: pixel.line,
            apriori_sample: pixel.sample,
            apriori_line: pixel.line,
            measure_type: MeasureType::Projected,
        }
    }

    /// Measure refined by registration; keeps the projected estimate as the
    /// apriori pixel.
    pub fn registered(
        image_id: ImageId,
        serial: &str,
        apriori: PixelCoord,
        refined: PixelCoord,
    ) -> Self {
        Self {
            image_id,
            serial: serial.to_string(),
            sample: refined.sample,
            line: refined.line,
            apriori_sample: apriori.sample,
            apriori_line: apriori.line,
            measure_type: MeasureType::Registered,
        }
    }

    pub fn pixel(&self) -> PixelCoord {
        PixelCoord::new(self.sample, self.line)
    }
}

/// One physical ground feature observed in at least two images.
///
/// Ground positions are geocentric (body-centered fixed). The adjusted
/// position starts equal to the apriori position; bundle adjustment owns
/// it afterwards.
#[derive(Clone, Debug, Serialize)]
pub struct Point {
    pub apriori: Vector3<f64>,
    pub adjusted: Vector3<f64>,
    pub point_type: PointType,
    /// Set when the refined ground position left its source region and the
    /// containment policy kept it anyway.
    pub low_confidence: bool,
    pub measures: Vec<Measure>,
}

impl Point {
    /// Free point at the given geocentric position, with no measures yet.
    pub fn free(ground: Vector3<f64>) -> Self {
        Self {
            apriori: ground,
            adjusted: ground,
            point_type: PointType::Free,
            low_confidence: false,
            measures: Vec::new(),
        }
    }

    /// A usable control point needs two or more observing images.
    pub fn is_valid(&self) -> bool {
        self.measures.len() >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_constructors_record_apriori_pixel() {
        let projected = Measure::projected(7, "SENSOR/7", PixelCoord::new(10.0, 20.0));
        assert_eq!(projected.measure_type, MeasureType::Projected);
        assert_eq!(projected.apriori_sample, 10.0);
        assert_eq!(projected.sample, 10.0);

        let registered = Measure::registered(
            8,
            "SENSOR/8",
            PixelCoord::new(10.0, 20.0),
            PixelCoord::new(10.4, 19.7),
        );
        assert_eq!(registered.measure_type, MeasureType::Registered);
        assert_eq!(registered.apriori_sample, 10.0);
        assert_eq!(registered.apriori_line, 20.0);
        assert_eq!(registered.sample, 10.4);
        assert_eq!(registered.line, 19.7);
    }

    #[test]
    fn point_validity_requires_two_measures() {
        let mut point = Point::free(Vector3::new(1.0, 2.0, 3.0));
        assert!(!point.is_valid());
        point
            .measures
            .push(Measure::projected(1, "A", PixelCoord::new(0.0, 0.0)));
        assert!(!point.is_valid());
        point
            .measures
            .push(Measure::projected(2, "B", PixelCoord::new(1.0, 1.0)));
        assert!(point.is_valid());
        assert_eq!(point.apriori, point.adjusted);
    }
}
