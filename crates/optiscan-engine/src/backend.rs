//! Engine trait and solve results.
//!
//! The [`Engine`] trait isolates the scan logic in `optiscan-core` from the
//! program that actually solves the optical fields. An engine is asked two
//! things: whether it can run at all, and what its detectors read for the
//! current state of a [`Model`].

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::Model;

/// Errors originating from engines.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Simulation engine '{program}' is not available: {reason}")]
    Unavailable { program: String, reason: String },

    #[error("Simulation engine '{program}' failed ({status}): {stderr}")]
    SolveFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Describes the engine behind a backend.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub name: String,
    pub engine_type: EngineType,
    pub version: Option<String>,
}

/// How the engine is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
    /// A separate executable invoked once per solve.
    Process,
    /// Solved inside this process.
    InProcess,
}

/// Detector readouts from a single steady-state solve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    values: BTreeMap<String, f64>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, detector: impl Into<String>, value: f64) {
        self.values.insert(detector.into(), value);
    }

    /// The value recorded for a detector, if the engine reported one.
    pub fn get(&self, detector: &str) -> Option<f64> {
        self.values.get(detector).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for Solution {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Abstraction over simulation engines.
///
/// Builders call [`Engine::ensure_available`] before touching a model, and
/// scans call [`Engine::solve`] once per sample. Solves are synchronous and
/// see the model exactly as it is at the time of the call.
pub trait Engine: Send + Sync {
    /// Return information about the engine.
    fn engine_info(&self) -> EngineInfo;

    /// Check that the engine can be used.
    ///
    /// Implementations may cache the outcome; repeated calls must agree.
    fn ensure_available(&self) -> Result<(), EngineError>;

    /// Solve the steady state of `model` and return per-detector readouts.
    fn solve(&self, model: &Model) -> Result<Solution, EngineError>;
}
