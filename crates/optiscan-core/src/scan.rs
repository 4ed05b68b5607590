//! One-dimensional parameter scans.
//!
//! A scan sweeps the length of one link over `num` evenly spaced values and
//! records the readout detector after each steady-state solve. For every
//! sample the link is set from its nominal length, solved, then restored to
//! the nominal value captured before the first sample, so the model leaves a
//! scan exactly as it entered.

use std::fmt;
use std::str::FromStr;

use optiscan_engine::{Engine, EngineError, Model, ModelError, Parameter};
use serde::Deserialize;
use thiserror::Error;

use crate::builder::Built;
use crate::table::ScanTable;

/// Errors raised while preparing or running a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Malformed scan parameter '{0}': expected '<component>.<attribute>'")]
    MalformedParam(String),

    #[error("Unsupported scan parameter '{param}': only link length ('.L') can be scanned")]
    UnsupportedAttribute { param: String },

    #[error("Scan parameter '{param}' refers to unknown link '{name}'")]
    UnknownLink { param: String, name: String },

    #[error("Readout '{0}' does not match any detector in the model")]
    UnknownReadout(String),

    #[error("Scan needs at least one sample")]
    NoSamples,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A `<component>.<attribute>` reference such as `s2.L`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRef {
    pub component: String,
    pub attribute: String,
}

impl FromStr for ParamRef {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().rsplit_once('.') {
            Some((c, a)) if !c.is_empty() && !a.is_empty() => Ok(Self {
                component: c.to_string(),
                attribute: a.to_string(),
            }),
            _ => Err(ScanError::MalformedParam(s.to_string())),
        }
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.attribute)
    }
}

/// How a sample value is applied to the nominal link length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    /// `length = nominal + sample`
    #[default]
    Offset,
    /// `length = sample`
    Absolute,
}

impl SampleMode {
    fn apply(self, nominal: f64, sample: f64) -> f64 {
        match self {
            Self::Offset => nominal + sample,
            Self::Absolute => sample,
        }
    }
}

/// What to sweep and what to read.
#[derive(Debug, Clone)]
pub struct ScanSpec {
    pub param: ParamRef,
    pub start: f64,
    pub stop: f64,
    pub num: usize,
    pub mode: SampleMode,
    pub readout: String,
    /// Label for the scanned column; defaults to the parameter reference.
    pub label: Option<String>,
}

impl ScanSpec {
    pub fn new(param: ParamRef, start: f64, stop: f64, num: usize, readout: impl Into<String>) -> Self {
        Self {
            param,
            start,
            stop,
            num,
            mode: SampleMode::Offset,
            readout: readout.into(),
            label: None,
        }
    }

    pub fn with_mode(mut self, mode: SampleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn x_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.param.to_string())
    }

    pub fn samples(&self) -> Vec<f64> {
        linspace(self.start, self.stop, self.num)
    }
}

/// `num` evenly spaced values from `start` to `stop`, both inclusive.
///
/// The first sample is exactly `start` and the last exactly `stop`, even
/// when the span overflows.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let n = (num - 1) as f64;
            let step = (stop - start) / n;
            (0..num)
                .map(|i| match i {
                    0 => start,
                    i if i == num - 1 => stop,
                    i if step.is_finite() => start + step * i as f64,
                    // The span overflows; weight the endpoints instead.
                    i => start / n * (n - i as f64) + stop / n * i as f64,
                })
                .collect()
        }
    }
}

/// Run a scan over `model`.
///
/// All references are resolved before the first solve: an unsupported
/// attribute, an unknown link or an unknown readout fails without invoking
/// the engine. A sample whose solution lacks the readout is recorded as NaN.
pub fn run_scan(
    engine: &dyn Engine,
    model: &mut Model,
    built: &Built,
    spec: &ScanSpec,
) -> Result<ScanTable, ScanError> {
    let param = spec.param.to_string();
    if Parameter::from_attribute(&spec.param.attribute) != Some(Parameter::Length) {
        return Err(ScanError::UnsupportedAttribute { param });
    }
    let link = built
        .link(&spec.param.component)
        .ok_or_else(|| ScanError::UnknownLink {
            param: param.clone(),
            name: spec.param.component.clone(),
        })?;
    if built.detector(&spec.readout).is_none() {
        return Err(ScanError::UnknownReadout(spec.readout.clone()));
    }
    if spec.num == 0 {
        return Err(ScanError::NoSamples);
    }

    let nominal = model.parameter(link, Parameter::Length)?;
    let samples = spec.samples();
    let mut table = ScanTable::with_capacity(spec.x_label(), spec.readout.clone(), samples.len());

    log::info!(
        "scanning {} over [{:e}, {:e}] with {} sample(s), reading '{}'",
        param,
        spec.start,
        spec.stop,
        spec.num,
        spec.readout
    );

    for (i, &x) in samples.iter().enumerate() {
        model.set_parameter(link, Parameter::Length, spec.mode.apply(nominal, x))?;
        let solved = engine.solve(model);
        model.set_parameter(link, Parameter::Length, nominal)?;

        let y = solved?.get(&spec.readout).unwrap_or_else(|| {
            log::warn!("sample {} ({}={:e}): no value for '{}'", i, param, x, spec.readout);
            f64::NAN
        });
        log::debug!("sample {}: {}={:e} -> {}={:e}", i, param, x, spec.readout, y);
        table.push(x, y);
    }

    log::info!("scan complete: {} row(s)", table.len());
    Ok(table)
}
