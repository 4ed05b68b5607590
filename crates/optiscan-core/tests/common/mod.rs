//! Deterministic in-process engines for tests.
#![allow(dead_code)]

use std::sync::Mutex;

use optiscan_engine::{
    Component, Engine, EngineError, EngineInfo, EngineType, Model, Solution,
};

/// Reports, for every power detector, the laser power times the summed
/// length of all links. Records the link lengths seen by each solve.
#[derive(Default)]
pub struct LengthSumEngine {
    pub solves: Mutex<Vec<Vec<(String, f64)>>>,
    /// Detectors left out of every solution.
    pub silent: Vec<String>,
}

impl LengthSumEngine {
    pub fn silent_on(detector: &str) -> Self {
        Self {
            silent: vec![detector.to_string()],
            ..Self::default()
        }
    }

    pub fn solve_count(&self) -> usize {
        self.solves.lock().unwrap().len()
    }

    /// Length of `link` seen by each solve, in order.
    pub fn lengths_of(&self, link: &str) -> Vec<f64> {
        self.solves
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.iter().find(|(n, _)| n == link).map(|(_, l)| *l).unwrap())
            .collect()
    }
}

impl Engine for LengthSumEngine {
    fn engine_info(&self) -> EngineInfo {
        EngineInfo {
            name: "length-sum".into(),
            engine_type: EngineType::InProcess,
            version: None,
        }
    }

    fn ensure_available(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn solve(&self, model: &Model) -> Result<Solution, EngineError> {
        let mut power = 0.0;
        let mut lengths = Vec::new();
        for (name, c) in model.components() {
            match c {
                Component::Laser { power: p, .. } => power = *p,
                Component::Space { length, .. } => lengths.push((name.to_string(), *length)),
                _ => {}
            }
        }
        let total: f64 = lengths.iter().map(|(_, l)| l).sum();
        self.solves.lock().unwrap().push(lengths);

        let mut sol = Solution::new();
        for (name, c) in model.components() {
            if matches!(c, Component::PowerDetector { .. }) && !self.silent.iter().any(|s| s == name) {
                sol.insert(name, power * total);
            }
        }
        Ok(sol)
    }
}

/// An engine whose availability check always fails.
pub struct MissingEngine;

impl Engine for MissingEngine {
    fn engine_info(&self) -> EngineInfo {
        EngineInfo {
            name: "missing".into(),
            engine_type: EngineType::Process,
            version: None,
        }
    }

    fn ensure_available(&self) -> Result<(), EngineError> {
        Err(EngineError::Unavailable {
            program: "missing".into(),
            reason: "not installed".into(),
        })
    }

    fn solve(&self, _model: &Model) -> Result<Solution, EngineError> {
        panic!("solve must not be called on an unavailable engine");
    }
}
