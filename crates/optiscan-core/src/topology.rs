//! Supported optical topologies.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Unsupported system/topology combination: type='{system_type}', topology='{topology}' (supported: cavity/fp, cavity/fabry-perot, cavity/fabry_perot, interferometer/michelson)")]
    Unsupported {
        system_type: String,
        topology: String,
    },
}

/// A recognised `(system.type, system.topology)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    FabryPerot,
    Michelson,
}

impl Topology {
    /// Resolve the declared type and topology, ignoring ASCII case.
    pub fn from_names(system_type: &str, topology: &str) -> Result<Self, TopologyError> {
        let ty = system_type.trim().to_ascii_lowercase();
        let topo = topology.trim().to_ascii_lowercase();
        match (ty.as_str(), topo.as_str()) {
            ("cavity", "fp" | "fabry-perot" | "fabry_perot") => Ok(Self::FabryPerot),
            ("interferometer", "michelson") => Ok(Self::Michelson),
            _ => Err(TopologyError::Unsupported {
                system_type: ty,
                topology: topo,
            }),
        }
    }

    /// Plot title for scans over this topology.
    pub fn title(self) -> &'static str {
        match self {
            Self::FabryPerot => "Fabry–Perot Cavity Scan",
            Self::Michelson => "Michelson Output (basic)",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FabryPerot => f.write_str("cavity/fabry-perot"),
            Self::Michelson => f.write_str("interferometer/michelson"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognised_pairs() {
        for topo in ["fp", "FP", "Fabry-Perot", "fabry_perot"] {
            assert_eq!(Topology::from_names("Cavity", topo).unwrap(), Topology::FabryPerot);
        }
        assert_eq!(
            Topology::from_names("INTERFEROMETER", "Michelson").unwrap(),
            Topology::Michelson
        );
    }

    #[test]
    fn test_unrecognised_pairs_name_both_values() {
        let cases = [
            ("cavity", "michelson"),
            ("interferometer", "fp"),
            ("cavity", ""),
            ("laser", "fp"),
            ("interferometer", "mach-zehnder"),
        ];
        for (ty, topo) in cases {
            let err = Topology::from_names(ty, topo).unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains(&format!("type='{}'", ty)), "{}", msg);
            assert!(msg.contains(&format!("topology='{}'", topo)), "{}", msg);
        }
    }
}
