//! In-memory simulation graph.
//!
//! A [`Model`] holds named components in insertion order. Components refer to
//! each other only through [`Port`]s, which are checked against the
//! components already present when a component is added. Engines read the
//! model through [`Model::components`]; scans mutate it through
//! [`Model::set_parameter`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while assembling or mutating a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("A component named '{0}' already exists in the model")]
    DuplicateName(String),

    #[error("Malformed port '{0}': expected '<component>.p<N>' with an optional '.i' or '.o' suffix")]
    MalformedPort(String),

    #[error("Port '{port}' refers to unknown component '{component}'")]
    UnknownComponent { port: String, component: String },

    #[error("Port '{port}' is out of range: component '{component}' has {available} port(s)")]
    InvalidPort {
        port: String,
        component: String,
        available: usize,
    },

    #[error("Component '{component}' has no parameter '{parameter}'")]
    UnknownParameter { component: String, parameter: Parameter },
}

/// Opaque index of a component inside a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(usize);

/// Signal direction at a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// A named port on a component, written `m1.p2` or `m1.p2.o`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub component: String,
    pub index: usize,
    pub direction: Option<Direction>,
}

impl FromStr for Port {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ModelError::MalformedPort(s.to_string());
        let mut parts = s.trim().split('.');
        let component = parts.next().filter(|c| !c.is_empty()).ok_or_else(malformed)?;
        let index = parts
            .next()
            .and_then(|p| p.strip_prefix('p'))
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n >= 1)
            .ok_or_else(malformed)?;
        let direction = match parts.next() {
            None => None,
            Some("i") => Some(Direction::In),
            Some("o") => Some(Direction::Out),
            Some(_) => return Err(malformed()),
        };
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self {
            component: component.to_string(),
            index,
            direction,
        })
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.p{}", self.component, self.index)?;
        match self.direction {
            Some(Direction::In) => write!(f, ".i"),
            Some(Direction::Out) => write!(f, ".o"),
            None => Ok(()),
        }
    }
}

/// A scalar parameter that can be read or mutated on a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Power,
    Wavelength,
    Reflectivity,
    Transmissivity,
    Length,
}

impl Parameter {
    /// Parse the attribute spelling used in scan references (`s2.L`, `m1.R`).
    pub fn from_attribute(attr: &str) -> Option<Self> {
        match attr {
            "P" | "power" => Some(Self::Power),
            "lam" | "wavelength" => Some(Self::Wavelength),
            "R" => Some(Self::Reflectivity),
            "T" => Some(Self::Transmissivity),
            "L" | "length" => Some(Self::Length),
            _ => None,
        }
    }

    /// Short attribute name, as written in KatScript.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Power => "P",
            Self::Wavelength => "lam",
            Self::Reflectivity => "R",
            Self::Transmissivity => "T",
            Self::Length => "L",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Role of a component in the optical layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Laser,
    Mirror,
    Beamsplitter,
    Space,
    PowerDetector,
}

impl ComponentKind {
    /// Number of optical ports exposed to links and detectors.
    pub fn port_count(self) -> usize {
        match self {
            Self::Laser => 1,
            Self::Mirror => 2,
            Self::Beamsplitter => 4,
            Self::Space | Self::PowerDetector => 0,
        }
    }
}

/// A component and its scalar parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Laser { power: f64, wavelength: f64 },
    Mirror { r: f64, t: f64 },
    Beamsplitter { r: f64, t: f64 },
    Space { length: f64, from: Port, to: Port },
    PowerDetector { port: Port },
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Laser { .. } => ComponentKind::Laser,
            Self::Mirror { .. } => ComponentKind::Mirror,
            Self::Beamsplitter { .. } => ComponentKind::Beamsplitter,
            Self::Space { .. } => ComponentKind::Space,
            Self::PowerDetector { .. } => ComponentKind::PowerDetector,
        }
    }

    /// Ports this component attaches to.
    pub fn references(&self) -> Vec<&Port> {
        match self {
            Self::Space { from, to, .. } => vec![from, to],
            Self::PowerDetector { port } => vec![port],
            _ => Vec::new(),
        }
    }

    /// Current value of a scalar parameter, if this component has it.
    pub fn parameter(&self, parameter: Parameter) -> Option<f64> {
        match (self, parameter) {
            (Self::Laser { power, .. }, Parameter::Power) => Some(*power),
            (Self::Laser { wavelength, .. }, Parameter::Wavelength) => Some(*wavelength),
            (Self::Mirror { r, .. } | Self::Beamsplitter { r, .. }, Parameter::Reflectivity) => {
                Some(*r)
            }
            (Self::Mirror { t, .. } | Self::Beamsplitter { t, .. }, Parameter::Transmissivity) => {
                Some(*t)
            }
            (Self::Space { length, .. }, Parameter::Length) => Some(*length),
            _ => None,
        }
    }

    fn parameter_mut(&mut self, parameter: Parameter) -> Option<&mut f64> {
        match (self, parameter) {
            (Self::Laser { power, .. }, Parameter::Power) => Some(power),
            (Self::Laser { wavelength, .. }, Parameter::Wavelength) => Some(wavelength),
            (Self::Mirror { r, .. } | Self::Beamsplitter { r, .. }, Parameter::Reflectivity) => {
                Some(r)
            }
            (Self::Mirror { t, .. } | Self::Beamsplitter { t, .. }, Parameter::Transmissivity) => {
                Some(t)
            }
            (Self::Space { length, .. }, Parameter::Length) => Some(length),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    component: Component,
}

/// The simulation graph handed to an [`Engine`](crate::Engine).
#[derive(Debug, Clone, Default)]
pub struct Model {
    entries: Vec<Entry>,
    index: HashMap<String, Handle>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named component.
    ///
    /// Every port the component references must name a component that is
    /// already in the model and lie within that component's port range.
    pub fn add(&mut self, name: &str, component: Component) -> Result<Handle, ModelError> {
        if self.index.contains_key(name) {
            return Err(ModelError::DuplicateName(name.to_string()));
        }
        for port in component.references() {
            self.check_port(port)?;
        }

        let handle = Handle(self.entries.len());
        log::debug!("model: add {:?} '{}'", component.kind(), name);
        self.entries.push(Entry {
            name: name.to_string(),
            component,
        });
        self.index.insert(name.to_string(), handle);
        Ok(handle)
    }

    fn check_port(&self, port: &Port) -> Result<(), ModelError> {
        let target = self
            .handle(&port.component)
            .ok_or_else(|| ModelError::UnknownComponent {
                port: port.to_string(),
                component: port.component.clone(),
            })?;
        let available = self.component(target).kind().port_count();
        if port.index > available {
            return Err(ModelError::InvalidPort {
                port: port.to_string(),
                component: port.component.clone(),
                available,
            });
        }
        Ok(())
    }

    /// Look up a component by name.
    pub fn handle(&self, name: &str) -> Option<Handle> {
        self.index.get(name).copied()
    }

    pub fn component(&self, handle: Handle) -> &Component {
        &self.entries[handle.0].component
    }

    pub fn name(&self, handle: Handle) -> &str {
        &self.entries[handle.0].name
    }

    /// Components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = (&str, &Component)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.component))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a scalar parameter.
    pub fn parameter(&self, handle: Handle, parameter: Parameter) -> Result<f64, ModelError> {
        self.component(handle)
            .parameter(parameter)
            .ok_or_else(|| self.unknown_parameter(handle, parameter))
    }

    /// Overwrite a scalar parameter in place.
    pub fn set_parameter(
        &mut self,
        handle: Handle,
        parameter: Parameter,
        value: f64,
    ) -> Result<(), ModelError> {
        let err = self.unknown_parameter(handle, parameter);
        let slot = self.entries[handle.0]
            .component
            .parameter_mut(parameter)
            .ok_or(err)?;
        *slot = value;
        Ok(())
    }

    fn unknown_parameter(&self, handle: Handle, parameter: Parameter) -> ModelError {
        ModelError::UnknownParameter {
            component: self.name(handle).to_string(),
            parameter,
        }
    }
}
