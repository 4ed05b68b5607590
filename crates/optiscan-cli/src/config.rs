//! Job configuration loading.
//!
//! [`load_config`] parses a JSON (or `.toml`) file into a nested mapping and
//! checks only that the top-level sections exist. Typed views with defaults
//! are produced separately by [`JobConfig::from_value`].

use std::path::{Path, PathBuf};

use optiscan_core::scan::SampleMode;
use optiscan_core::types::{ComponentsSpec, LaserSpec};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Errors in the configuration file or its contents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration '{}' is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Configuration '{}' is not valid TOML: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Missing '{0}' section")]
    MissingSection(&'static str),

    #[error("system.type is required and must be a non-empty string")]
    MissingSystemType,

    #[error("Invalid '{section}' section: {source}")]
    Invalid {
        section: &'static str,
        source: serde_json::Error,
    },

    #[error("simulation.readout must reference a detector name defined in system.components.detectors")]
    MissingReadout,

    #[error("simulation.scan.num must be at least 1")]
    NoSamples,
}

/// Load a configuration file and check its required sections.
///
/// The mapping is returned as parsed: no defaults are filled in.
pub fn load_config(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let value: Value = if is_toml {
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    };

    validate(&value)?;
    log::debug!("loaded configuration from {}", path.display());
    Ok(value)
}

/// Check the sections every job needs.
pub fn validate(value: &Value) -> Result<(), ConfigError> {
    let system = value
        .get("system")
        .ok_or(ConfigError::MissingSection("system"))?;
    value
        .get("simulation")
        .ok_or(ConfigError::MissingSection("simulation"))?;

    match system.get("type").and_then(Value::as_str) {
        Some(t) if !t.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::MissingSystemType),
    }
}

/// Typed view of a loaded configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub system: SystemConfig,
    pub simulation: SimulationConfig,
}

/// The `system` section.
#[derive(Debug, Deserialize)]
pub struct SystemConfig {
    #[serde(rename = "type")]
    pub system_type: String,
    #[serde(default)]
    pub topology: String,
    #[serde(default)]
    pub laser: LaserSpec,
    #[serde(default)]
    pub components: ComponentsSpec,
}

/// The `simulation` section.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    /// Detector whose value is recorded at each sample.
    #[serde(default)]
    pub readout: Option<String>,
}

/// The `simulation.scan` section.
#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_param")]
    pub param: String,
    #[serde(default = "default_start")]
    pub start: f64,
    #[serde(default = "default_stop")]
    pub stop: f64,
    #[serde(default = "default_num", deserialize_with = "deserialize_count")]
    pub num: usize,
    #[serde(default)]
    pub mode: SampleMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            param: default_param(),
            start: default_start(),
            stop: default_stop(),
            num: default_num(),
            mode: SampleMode::default(),
        }
    }
}

fn default_param() -> String {
    "s2.L".into()
}
fn default_start() -> f64 {
    -1e-6
}
fn default_stop() -> f64 {
    1e-6
}
fn default_num() -> usize {
    1001
}

/// A sample count written either as an integer or as a whole float (`3.0`).
#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Whole(u64),
    Float(f64),
}

fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    match Count::deserialize(deserializer)? {
        Count::Whole(n) => usize::try_from(n).map_err(D::Error::custom),
        Count::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as usize),
        Count::Float(f) => Err(D::Error::custom(format!(
            "sample count must be a non-negative whole number, found {}",
            f
        ))),
    }
}

impl JobConfig {
    /// Build the typed view of a validated mapping.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        validate(value)?;
        let system = SystemConfig::deserialize(&value["system"])
            .map_err(|source| ConfigError::Invalid { section: "system", source })?;
        let simulation = SimulationConfig::deserialize(&value["simulation"])
            .map_err(|source| ConfigError::Invalid { section: "simulation", source })?;
        if simulation.scan.num == 0 {
            return Err(ConfigError::NoSamples);
        }
        Ok(Self { system, simulation })
    }

    /// The readout detector, which the cavity requires.
    pub fn readout(&self) -> Result<&str, ConfigError> {
        self.simulation
            .readout
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or(ConfigError::MissingReadout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    const CAVITY_JSON: &str = r#"{
        "system": {
            "type": "cavity",
            "topology": "fp",
            "laser": {"power": 2.0},
            "components": {
                "mirrors": [{"name": "m1", "R": 0.9, "T": 0.1}],
                "spaces": [{"name": "s2", "L": 1.0, "from": "L0.p1", "to": "m1.p1"}],
                "detectors": [{"name": "pd1", "type": "power", "port": "m1.p2"}]
            }
        },
        "simulation": {
            "scan": {"param": "s2.L", "start": -1e-6, "stop": 1e-6, "num": 3},
            "readout": "pd1"
        }
    }"#;

    #[test]
    fn test_load_json_returns_mapping_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "job.json", CAVITY_JSON);
        let value = load_config(&path).unwrap();
        let expected: Value = serde_json::from_str(CAVITY_JSON).unwrap();
        assert_eq!(value, expected);
        // No defaulting at load time.
        assert!(value["system"]["laser"].get("wavelength").is_none());
    }

    #[test]
    fn test_typed_view_applies_defaults() {
        let value: Value = serde_json::from_str(CAVITY_JSON).unwrap();
        let job = JobConfig::from_value(&value).unwrap();
        assert_eq!(job.system.laser.power, 2.0);
        assert_eq!(job.system.laser.wavelength, 1.064e-6);
        assert_eq!(job.simulation.scan.num, 3);
        assert_eq!(job.simulation.scan.mode, SampleMode::Offset);
        assert_eq!(job.readout().unwrap(), "pd1");

        let minimal = serde_json::json!({
            "system": {"type": "interferometer", "topology": "michelson"},
            "simulation": {}
        });
        let job = JobConfig::from_value(&minimal).unwrap();
        assert_eq!(job.simulation.scan.param, "s2.L");
        assert_eq!(job.simulation.scan.start, -1e-6);
        assert_eq!(job.simulation.scan.stop, 1e-6);
        assert_eq!(job.simulation.scan.num, 1001);
        assert!(matches!(job.readout(), Err(ConfigError::MissingReadout)));
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "job.toml",
            r#"
[system]
type = "interferometer"
topology = "michelson"

[system.components]
arm_length = 0.5

[simulation.scan]
start = -2e-6
stop = 2e-6
num = 11
mode = "absolute"
"#,
        );
        let value = load_config(&path).unwrap();
        let job = JobConfig::from_value(&value).unwrap();
        assert_eq!(job.system.components.arm_length, Some(0.5));
        assert_eq!(job.simulation.scan.num, 11);
        assert_eq!(job.simulation.scan.mode, SampleMode::Absolute);
    }

    #[test]
    fn test_missing_sections_fail_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            (r#"{"simulation": {}}"#, "system"),
            (r#"{"system": {"type": "cavity"}}"#, "simulation"),
            (r#"{"system": {"type": ""}, "simulation": {}}"#, "system.type"),
            (r#"{"system": {"topology": "fp"}, "simulation": {}}"#, "system.type"),
            (r#"[1, 2, 3]"#, "system"),
        ];
        for (i, (json, needle)) in cases.iter().enumerate() {
            let path = write_file(dir.path(), &format!("bad{}.json", i), json);
            let err = load_config(&path).unwrap_err();
            assert!(err.to_string().contains(needle), "case {}: {}", i, err);
        }
    }

    #[test]
    fn test_invalid_syntax_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "broken.json", "{ not json");
        assert!(matches!(load_config(&path), Err(ConfigError::Json { .. })));

        let path = write_file(dir.path(), "broken.toml", "[system\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Toml { .. })));

        let missing = dir.path().join("nope.json");
        assert!(matches!(load_config(&missing), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_whole_float_sample_count_accepted() {
        let value = serde_json::json!({
            "system": {"type": "cavity", "topology": "fp"},
            "simulation": {"scan": {"num": 3.0}, "readout": "pd1"}
        });
        let job = JobConfig::from_value(&value).unwrap();
        assert_eq!(job.simulation.scan.num, 3);

        for bad in [serde_json::json!(2.5), serde_json::json!(-1), serde_json::json!("3")] {
            let value = serde_json::json!({
                "system": {"type": "cavity", "topology": "fp"},
                "simulation": {"scan": {"num": bad}, "readout": "pd1"}
            });
            assert!(matches!(
                JobConfig::from_value(&value),
                Err(ConfigError::Invalid { section: "simulation", .. })
            ));
        }
    }

    #[test]
    fn test_zero_samples_rejected() {
        let value = serde_json::json!({
            "system": {"type": "cavity", "topology": "fp"},
            "simulation": {"scan": {"num": 0}, "readout": "pd1"}
        });
        assert!(matches!(JobConfig::from_value(&value), Err(ConfigError::NoSamples)));
    }
}
