//! KatScript rendering and engine output parsing.
//!
//! A model is rendered one component per line, in insertion order, followed
//! by `noxaxis()` so the engine performs a single steady-state solve. Engine
//! output is read line by line; every line of the form `<name> <value>`,
//! `<name>: <value>` or `<name> = <value>` becomes one readout.

use std::fmt::Write;

use crate::backend::Solution;
use crate::model::{Component, Direction, Model, Port};

/// Render a model as a KatScript document.
pub fn render(model: &Model) -> String {
    let mut out = String::new();
    let mut wavelength = None;

    for (name, component) in model.components() {
        // Writing into a String cannot fail.
        let _ = match component {
            Component::Laser { power, wavelength: lam } => {
                wavelength.get_or_insert(*lam);
                writeln!(out, "laser {} P={:e}", name, power)
            }
            Component::Mirror { r, t } => writeln!(out, "mirror {} R={:e} T={:e}", name, r, t),
            Component::Beamsplitter { r, t } => {
                writeln!(out, "beamsplitter {} R={:e} T={:e}", name, r, t)
            }
            Component::Space { length, from, to } => {
                writeln!(out, "space {} portA={} portB={} L={:e}", name, from, to, length)
            }
            Component::PowerDetector { port } => {
                writeln!(out, "power_detector_dc {} node={}", name, output_node(port))
            }
        };
    }

    let mut doc = String::with_capacity(out.len() + 32);
    if let Some(lam) = wavelength {
        let _ = writeln!(doc, "lambda({:e})", lam);
    }
    doc.push_str(&out);
    doc.push_str("noxaxis()\n");
    doc
}

/// Detectors read an optical node; an undirected port reads its outgoing side.
fn output_node(port: &Port) -> String {
    match port.direction {
        Some(_) => port.to_string(),
        None => Port {
            direction: Some(Direction::Out),
            ..port.clone()
        }
        .to_string(),
    }
}

/// Parse engine output into detector readouts.
///
/// Lines that do not split into a name and a single number are ignored.
/// A value that fails to parse as a float is skipped, leaving the detector
/// absent from the solution.
pub fn parse_output(text: &str) -> Solution {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (name, value) = line
                .split_once('=')
                .or_else(|| line.split_once(':'))
                .or_else(|| line.split_once(char::is_whitespace))?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return None;
            }
            let value = value.parse::<f64>().ok()?;
            Some((name.to_string(), value))
        })
        .collect()
}
