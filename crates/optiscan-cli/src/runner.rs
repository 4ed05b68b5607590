//! Scan runners: tie together configuration, builders, and the scan loop.

use anyhow::{Context, Result};

use optiscan_core::builder::{build_fabry_perot, build_michelson, MichelsonLayout};
use optiscan_core::scan::{run_scan, ParamRef, SampleMode, ScanSpec};
use optiscan_core::{ScanTable, Topology};
use optiscan_engine::{Engine, Model};

use crate::config::JobConfig;

/// Run the scan for `topology` with the parsed job configuration.
pub fn run_job(job: &JobConfig, topology: Topology, engine: &dyn Engine) -> Result<ScanTable> {
    log::info!("running {} scan", topology);
    match topology {
        Topology::FabryPerot => run_cavity_scan(job, engine),
        Topology::Michelson => run_michelson_basic(job, engine),
    }
}

/// Fabry–Perot cavity: scan a configured link length, read a configured detector.
fn run_cavity_scan(job: &JobConfig, engine: &dyn Engine) -> Result<ScanTable> {
    let readout = job.readout()?;
    let scan = &job.simulation.scan;
    let param: ParamRef = scan.param.parse()?;

    let mut model = Model::new();
    let built = build_fabry_perot(&mut model, &job.system.laser, &job.system.components, engine)
        .context("Failed to build Fabry–Perot cavity")?;

    let spec = ScanSpec::new(param, scan.start, scan.stop, scan.num, readout).with_mode(scan.mode);
    run_scan(engine, &mut model, &built, &spec)
        .with_context(|| format!("Cavity scan of '{}' failed", scan.param))
}

/// Basic Michelson: offset the second arm around its nominal length, read `PD_out`.
fn run_michelson_basic(job: &JobConfig, engine: &dyn Engine) -> Result<ScanTable> {
    let scan = &job.simulation.scan;
    let arm_length = job
        .system
        .components
        .arm_length
        .unwrap_or(MichelsonLayout::DEFAULT_ARM_LENGTH);
    if scan.mode != SampleMode::Offset {
        log::warn!("Michelson scans always offset the arm length; ignoring scan.mode");
    }

    let mut model = Model::new();
    let built = build_michelson(&mut model, &job.system.laser, arm_length, engine)
        .context("Failed to build Michelson interferometer")?;

    let param = ParamRef {
        component: MichelsonLayout::SCANNED_ARM.to_string(),
        attribute: "L".to_string(),
    };
    let spec = ScanSpec::new(param, scan.start, scan.stop, scan.num, MichelsonLayout::DETECTOR)
        .with_label("delta_L");
    run_scan(engine, &mut model, &built, &spec).context("Michelson scan failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiscan_core::scan::ScanError;
    use optiscan_engine::{Component, EngineError, EngineInfo, EngineType, Solution};
    use serde_json::json;

    /// Reads `cos²` of the scanned arm offset, in units of the wavelength.
    struct FringeEngine;

    impl Engine for FringeEngine {
        fn engine_info(&self) -> EngineInfo {
            EngineInfo {
                name: "fringe".into(),
                engine_type: EngineType::InProcess,
                version: None,
            }
        }

        fn ensure_available(&self) -> Result<(), EngineError> {
            Ok(())
        }

        fn solve(&self, model: &Model) -> Result<Solution, EngineError> {
            let mut lam = 1.0;
            let mut arm = 0.0;
            let mut sol = Solution::new();
            for (name, c) in model.components() {
                match c {
                    Component::Laser { wavelength, .. } => lam = *wavelength,
                    Component::Space { length, .. } if name == "s2" => arm = *length,
                    Component::PowerDetector { .. } => {
                        let phase = 2.0 * std::f64::consts::PI * arm / lam;
                        sol.insert(name, phase.cos().powi(2));
                    }
                    _ => {}
                }
            }
            Ok(sol)
        }
    }

    fn job(value: serde_json::Value) -> JobConfig {
        JobConfig::from_value(&value).unwrap()
    }

    #[test]
    fn test_cavity_scan_uses_configured_names() {
        let job = job(json!({
            "system": {
                "type": "cavity", "topology": "fp",
                "components": {
                    "mirrors": [{"name": "m1"}, {"name": "m2"}],
                    "spaces": [{"name": "s2", "L": 1.0, "from": "m1.p2", "to": "m2.p1"}],
                    "detectors": [{"name": "pd1", "type": "power", "port": "m2.p2"}]
                }
            },
            "simulation": {
                "scan": {"param": "s2.L", "start": -1e-6, "stop": 1e-6, "num": 3},
                "readout": "pd1"
            }
        }));
        let table = run_job(&job, Topology::FabryPerot, &FringeEngine).unwrap();
        assert_eq!(table.columns(), &["s2.L".to_string(), "pd1".to_string()]);
        assert_eq!(table.x().collect::<Vec<_>>(), vec![-1e-6, 0.0, 1e-6]);
        assert!(table.y().all(|y| (0.0..=1.0).contains(&y)));
    }

    #[test]
    fn test_cavity_requires_readout() {
        let job = job(json!({
            "system": {"type": "cavity", "topology": "fp"},
            "simulation": {"scan": {"num": 3}}
        }));
        let err = run_job(&job, Topology::FabryPerot, &FringeEngine).unwrap_err();
        assert!(err.to_string().contains("simulation.readout"), "{}", err);
    }

    #[test]
    fn test_cavity_rejects_non_length_scan() {
        let job = job(json!({
            "system": {
                "type": "cavity", "topology": "fp",
                "components": {
                    "mirrors": [{"name": "m1"}],
                    "detectors": [{"name": "pd1", "port": "m1.p2"}]
                }
            },
            "simulation": {"scan": {"param": "m1.R", "num": 3}, "readout": "pd1"}
        }));
        let err = run_job(&job, Topology::FabryPerot, &FringeEngine).unwrap_err();
        let scan_err = err.downcast_ref::<ScanError>().expect("scan error");
        assert!(matches!(scan_err, ScanError::UnsupportedAttribute { .. }));
    }

    #[test]
    fn test_michelson_scan_shape() {
        let job = job(json!({
            "system": {
                "type": "interferometer", "topology": "michelson",
                "components": {"arm_length": 1.0}
            },
            "simulation": {"scan": {"start": -1e-6, "stop": 1e-6, "num": 1001}}
        }));
        let table = run_job(&job, Topology::Michelson, &FringeEngine).unwrap();
        assert_eq!(table.len(), 1001);
        assert_eq!(table.columns(), &["delta_L".to_string(), "PD_out".to_string()]);
        assert_eq!(table.rows()[0].0, -1e-6);
        assert_eq!(table.rows()[1000].0, 1e-6);
        assert!(table.y().all(|y| y.is_finite()));
    }
}
