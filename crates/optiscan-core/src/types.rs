//! Component specifications read from the `system` section of a job.
//!
//! These are plain data: builders turn them into [`Model`](optiscan_engine::Model)
//! components. Field defaults follow the values the tool has always assumed
//! when a key is missing.

use serde::Deserialize;

/// Laser source parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct LaserSpec {
    /// Output power (W).
    #[serde(default = "default_power")]
    pub power: f64,
    /// Vacuum wavelength (m).
    #[serde(default = "default_wavelength")]
    pub wavelength: f64,
}

impl Default for LaserSpec {
    fn default() -> Self {
        Self {
            power: default_power(),
            wavelength: default_wavelength(),
        }
    }
}

fn default_power() -> f64 {
    1.0
}
fn default_wavelength() -> f64 {
    1.064e-6
}

/// A partially reflective element.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorSpec {
    pub name: String,
    /// Power reflectivity.
    #[serde(rename = "R", default = "default_r")]
    pub r: f64,
    /// Power transmissivity.
    #[serde(rename = "T", default = "default_t")]
    pub t: f64,
}

fn default_r() -> f64 {
    0.99
}
fn default_t() -> f64 {
    0.01
}

/// A propagation link between two named ports.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkSpec {
    pub name: String,
    /// Physical length (m).
    #[serde(rename = "L", default)]
    pub length: f64,
    pub from: String,
    pub to: String,
}

/// A detector bound to a named port.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorSpec {
    pub name: String,
    /// Detector type. Only `"power"` is built.
    #[serde(rename = "type", default = "default_detector_type")]
    pub kind: String,
    pub port: String,
}

fn default_detector_type() -> String {
    "power".into()
}

/// The `system.components` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentsSpec {
    #[serde(default)]
    pub mirrors: Vec<MirrorSpec>,
    #[serde(default, alias = "links")]
    pub spaces: Vec<LinkSpec>,
    #[serde(default)]
    pub detectors: Vec<DetectorSpec>,
    /// Nominal arm length for the Michelson layout (m).
    #[serde(default)]
    pub arm_length: Option<f64>,
}
