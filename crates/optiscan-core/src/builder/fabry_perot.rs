//! Fabry–Perot cavity builder.
//!
//! Everything apart from the source is declared in configuration: mirrors,
//! the links between them, and the detectors. Components are added in the
//! order laser, mirrors, links, detectors, so links and detectors may refer
//! to any mirror or to the laser port `L0.p1`.

use optiscan_engine::{Component, Engine, Model};

use super::{add, add_laser, parse_port, prepare, BuildError, Built};
use crate::types::{ComponentsSpec, LaserSpec};

/// Build a Fabry–Perot cavity into an empty `model`.
pub fn build_fabry_perot(
    model: &mut Model,
    laser: &LaserSpec,
    components: &ComponentsSpec,
    engine: &dyn Engine,
) -> Result<Built, BuildError> {
    prepare(model, engine)?;

    let mut built = Built::new(add_laser(model, laser)?);

    for m in &components.mirrors {
        let handle = add(model, &m.name, Component::Mirror { r: m.r, t: m.t })?;
        built.mirrors.insert(m.name.clone(), handle);
    }

    for s in &components.spaces {
        let component = Component::Space {
            length: s.length,
            from: parse_port(&s.name, &s.from)?,
            to: parse_port(&s.name, &s.to)?,
        };
        let handle = add(model, &s.name, component)?;
        built.links.insert(s.name.clone(), handle);
    }

    for d in &components.detectors {
        if d.kind != "power" {
            log::warn!("skipping detector '{}' of unsupported type '{}'", d.name, d.kind);
            continue;
        }
        let port = parse_port(&d.name, &d.port)?;
        let handle = add(model, &d.name, Component::PowerDetector { port })?;
        built.detectors.insert(d.name.clone(), handle);
    }

    log::info!(
        "built Fabry-Perot cavity: {} mirror(s), {} link(s), {} detector(s)",
        built.mirrors.len(),
        built.links.len(),
        built.detectors.len()
    );
    Ok(built)
}
