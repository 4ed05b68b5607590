//! Topology builders.
//!
//! A builder populates an empty [`Model`] and returns a [`Built`] lookup that
//! maps every declared name to its handle, partitioned by role. Both builders
//! check the engine before adding anything, so an unavailable engine never
//! leaves a half-built model behind.
//!
//! - [`fabry_perot`]: configuration-driven cavity.
//! - [`michelson`]: fixed four-port layout, parameterised by arm length.

pub mod fabry_perot;
pub mod michelson;

use std::collections::BTreeMap;

use optiscan_engine::{Component, Engine, EngineError, Handle, Model, ModelError, Port};
use thiserror::Error;

use crate::types::LaserSpec;

pub use fabry_perot::build_fabry_perot;
pub use michelson::{build_michelson, MichelsonLayout};

/// Name given to the laser source in every topology.
pub const SOURCE_NAME: &str = "L0";

/// Errors raised while building a topology.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    EngineUnavailable(EngineError),

    #[error("Model must be empty before building, found {0} component(s)")]
    ModelNotEmpty(usize),

    #[error("Component '{name}': {source}")]
    Component {
        name: String,
        #[source]
        source: ModelError,
    },
}

/// Handles of every component a builder created, by role.
#[derive(Debug, Clone)]
pub struct Built {
    pub source: Handle,
    pub mirrors: BTreeMap<String, Handle>,
    pub links: BTreeMap<String, Handle>,
    pub detectors: BTreeMap<String, Handle>,
}

impl Built {
    fn new(source: Handle) -> Self {
        Self {
            source,
            mirrors: BTreeMap::new(),
            links: BTreeMap::new(),
            detectors: BTreeMap::new(),
        }
    }

    pub fn link(&self, name: &str) -> Option<Handle> {
        self.links.get(name).copied()
    }

    pub fn detector(&self, name: &str) -> Option<Handle> {
        self.detectors.get(name).copied()
    }
}

/// Fail fast when the engine cannot run or the model is already in use.
fn prepare(model: &Model, engine: &dyn Engine) -> Result<(), BuildError> {
    engine
        .ensure_available()
        .map_err(BuildError::EngineUnavailable)?;
    if !model.is_empty() {
        return Err(BuildError::ModelNotEmpty(model.len()));
    }
    Ok(())
}

fn add(model: &mut Model, name: &str, component: Component) -> Result<Handle, BuildError> {
    model
        .add(name, component)
        .map_err(|source| BuildError::Component {
            name: name.to_string(),
            source,
        })
}

fn add_laser(model: &mut Model, laser: &LaserSpec) -> Result<Handle, BuildError> {
    add(
        model,
        SOURCE_NAME,
        Component::Laser {
            power: laser.power,
            wavelength: laser.wavelength,
        },
    )
}

fn parse_port(owner: &str, port: &str) -> Result<Port, BuildError> {
    port.parse().map_err(|source| BuildError::Component {
        name: owner.to_string(),
        source,
    })
}
