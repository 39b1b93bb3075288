use std::path::Path;
use std::sync::Arc;

use geo::{LineString, MultiPolygon, Polygon};
use tiegen::config::{load_config, RunConfig};
use tiegen::distribute::PlacementPolicy;
use tiegen::overlap::{decompose, DecomposeOptions};
use tiegen::register::{Registration, SubpixelRegister};
use tiegen::sensor::{EcefCameraObject, EcefSensor, SensorSet};
use tiegen::types::{ImageId, PixelCoord};
use tiegen::{BuilderOptions, Ellipsoid, Pipeline, PipelineOptions};

fn main() {
    // Demo stub: two overlapping synthetic footprints, fixed stub cameras,
    // and a registrar that shifts estimates by a constant offset.
    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(Path::new(&path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },
        None => RunConfig {
            semi_major: 3_396_190.0,
            semi_minor: 3_376_200.0,
            pipeline: PipelineOptions {
                placement: PlacementPolicy::Quasirandom { count: 5 },
                builder: BuilderOptions {
                    refine_ground: false,
                    ..Default::default()
                },
                ..Default::default()
            },
            register: Default::default(),
        },
    };

    let ellipsoid = match Ellipsoid::new(config.semi_major, config.semi_minor) {
        Ok(ellipsoid) => ellipsoid,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let footprints = vec![(1u64, square(0.0, 0.0, 10.0)), (2, square(4.0, 0.0, 10.0))];
    let regions = decompose(&footprints, DecomposeOptions::default());

    let mut sensors = SensorSet::new();
    sensors.insert(1, Arc::new(EcefSensor::new(Box::new(DemoCamera::new(1)))));
    sensors.insert(2, Arc::new(EcefSensor::new(Box::new(DemoCamera::new(2)))));

    let pipeline = Pipeline::new(
        sensors,
        Arc::new(DemoRegistrar),
        ellipsoid,
        config.pipeline,
    );
    let report = pipeline.run(&regions);

    println!(
        "regions={} processed={} points={} measures={} elapsed_ms={:.3}",
        report.summary.regions_total,
        report.summary.regions_processed,
        report.summary.points_accepted,
        report.summary.measures_emitted,
        report.summary.elapsed_ms,
    );
}

fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Polygon::new(
        LineString::from(vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]),
        vec![],
    )])
}

/// Stub camera scaling geocentric coordinates into pixel space.
struct DemoCamera {
    serial: String,
}

impl DemoCamera {
    fn new(image: ImageId) -> Self {
        Self {
            serial: format!("DEMO/{image}"),
        }
    }
}

impl EcefCameraObject for DemoCamera {
    fn ground_to_image(&self, x: f64, y: f64, _z: f64) -> Option<(f64, f64)> {
        Some((x / 1000.0, y / 1000.0))
    }

    fn image_to_ground(&self, _sample: f64, _line: f64) -> Option<(f64, f64, f64)> {
        None
    }

    fn serial(&self) -> &str {
        &self.serial
    }
}

/// Stub registrar shifting every estimate by a constant quarter pixel.
struct DemoRegistrar;

impl SubpixelRegister for DemoRegistrar {
    fn register(
        &self,
        _reference: ImageId,
        _reference_pixel: PixelCoord,
        _target: ImageId,
        initial: PixelCoord,
    ) -> Option<Registration> {
        Some(Registration {
            pixel: PixelCoord::new(initial.sample + 0.25, initial.line + 0.25),
            correlation: 0.99,
        })
    }
}
