//! Engine backend that drives an external executable.
//!
//! Each solve writes the model as KatScript to a temporary file and runs
//! `<program> <file>`, blocking until the program exits. The
//! availability probe runs `<program> --version` once and caches the result.

use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, Output};
use std::sync::OnceLock;

use crate::backend::{Engine, EngineError, EngineInfo, EngineType, Solution};
use crate::katscript;
use crate::model::Model;

/// Executable used when nothing else is configured.
pub const DEFAULT_PROGRAM: &str = "kat3";

/// Engine backed by an external simulation executable.
pub struct ProcessEngine {
    program: OsString,
    probe: OnceLock<Result<String, String>>,
}

impl ProcessEngine {
    /// Create an engine that invokes `program`.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            probe: OnceLock::new(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn probe(&self) -> &Result<String, String> {
        self.probe.get_or_init(|| {
            log::debug!("probing engine '{}'", self.program_name());
            match Command::new(&self.program).arg("--version").output() {
                Ok(out) if out.status.success() => {
                    let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
                    log::info!("engine '{}' available: {}", self.program_name(), version);
                    Ok(version)
                }
                Ok(out) => Err(format!(
                    "'--version' exited with {}: {}",
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                )),
                Err(e) => Err(e.to_string()),
            }
        })
    }

    fn run_script(&self, script: &str) -> Result<Output, EngineError> {
        let mut file = tempfile::Builder::new()
            .prefix("optiscan-")
            .suffix(".kat")
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.flush()?;

        let output = Command::new(&self.program).arg(file.path()).output()?;
        Ok(output)
    }
}

impl Default for ProcessEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Engine for ProcessEngine {
    fn engine_info(&self) -> EngineInfo {
        EngineInfo {
            name: self.program_name(),
            engine_type: EngineType::Process,
            version: self.probe.get().and_then(|p| p.as_ref().ok().cloned()),
        }
    }

    fn ensure_available(&self) -> Result<(), EngineError> {
        self.probe()
            .as_ref()
            .map(|_| ())
            .map_err(|reason| EngineError::Unavailable {
                program: self.program_name(),
                reason: reason.clone(),
            })
    }

    fn solve(&self, model: &Model) -> Result<Solution, EngineError> {
        let script = katscript::render(model);
        let output = self.run_script(&script)?;
        if !output.status.success() {
            return Err(EngineError::SolveFailed {
                program: self.program_name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(katscript::parse_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_unavailable() {
        let engine = ProcessEngine::new("optiscan-no-such-engine-binary");
        let err = engine.ensure_available().unwrap_err();
        assert!(matches!(err, EngineError::Unavailable { .. }));
        assert!(err.to_string().contains("optiscan-no-such-engine-binary"));
        // The probe result is cached, so a second call reports the same thing.
        assert!(engine.ensure_available().is_err());
        assert_eq!(engine.engine_info().version, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_solve_runs_program_on_script() {
        // `cat` echoes the script back; only lines shaped like readouts survive.
        let engine = ProcessEngine::new("cat");
        let mut model = Model::new();
        model
            .add(
                "m1",
                crate::model::Component::Mirror { r: 0.5, t: 0.5 },
            )
            .unwrap();
        let sol = engine.solve(&model).unwrap();
        assert!(sol.is_empty());
    }
}
