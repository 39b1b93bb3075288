//! JSON run-configuration loading for the demo binary.

use crate::pipeline::PipelineOptions;
use crate::register::RegisterOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
pub struct RunConfig {
    /// Ellipsoid semi-major axis in working units.
    pub semi_major: f64,
    /// Ellipsoid semi-minor axis in working units.
    pub semi_minor: f64,
    #[serde(default)]
    pub pipeline: PipelineOptions,
    #[serde(default)]
    pub register: RegisterOptions,
}

pub fn load_config(path: &Path) -> Result<RunConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RunConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}
