//! Basic Michelson interferometer builder.
//!
//! The layout is fixed:
//!
//! ```text
//!   L0 --s_in--> bs.p1
//!                bs.p2 --s1--> m1.p1
//!                bs.p3 --s2--> m2.p1
//!                bs.p4 ---> PD_out
//! ```
//!
//! Only the laser and the nominal arm length come from configuration.

use optiscan_engine::{Component, Engine, Model};

use super::{add, add_laser, parse_port, prepare, BuildError, Built};
use crate::types::LaserSpec;

/// Names used by the fixed Michelson layout.
pub struct MichelsonLayout;

impl MichelsonLayout {
    pub const BEAMSPLITTER: &'static str = "bs";
    pub const END_MIRRORS: [&'static str; 2] = ["m1", "m2"];
    pub const INPUT_LINK: &'static str = "s_in";
    pub const ARM_LINKS: [&'static str; 2] = ["s1", "s2"];
    /// The arm whose length is scanned.
    pub const SCANNED_ARM: &'static str = "s2";
    pub const DETECTOR: &'static str = "PD_out";
    pub const DEFAULT_ARM_LENGTH: f64 = 1.0;
}

/// Build the fixed Michelson layout into an empty `model`.
pub fn build_michelson(
    model: &mut Model,
    laser: &LaserSpec,
    arm_length: f64,
    engine: &dyn Engine,
) -> Result<Built, BuildError> {
    prepare(model, engine)?;

    let mut built = Built::new(add_laser(model, laser)?);

    let bs = MichelsonLayout::BEAMSPLITTER;
    let handle = add(model, bs, Component::Beamsplitter { r: 0.5, t: 0.5 })?;
    built.mirrors.insert(bs.to_string(), handle);
    for name in MichelsonLayout::END_MIRRORS {
        let handle = add(model, name, Component::Mirror { r: 0.999, t: 0.001 })?;
        built.mirrors.insert(name.to_string(), handle);
    }

    let links = [
        (MichelsonLayout::INPUT_LINK, 0.0, "L0.p1", "bs.p1"),
        (MichelsonLayout::ARM_LINKS[0], arm_length, "bs.p2", "m1.p1"),
        (MichelsonLayout::ARM_LINKS[1], arm_length, "bs.p3", "m2.p1"),
    ];
    for (name, length, from, to) in links {
        let component = Component::Space {
            length,
            from: parse_port(name, from)?,
            to: parse_port(name, to)?,
        };
        built.links.insert(name.to_string(), add(model, name, component)?);
    }

    let pd = MichelsonLayout::DETECTOR;
    let port = parse_port(pd, "bs.p4")?;
    built
        .detectors
        .insert(pd.to_string(), add(model, pd, Component::PowerDetector { port })?);

    log::info!("built Michelson interferometer: arm length {} m", arm_length);
    Ok(built)
}
