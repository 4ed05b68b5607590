//! # Optiscan Core
//!
//! Topology builders and parameter scans for simple optical layouts. The
//! simulation graph and the engine that solves it live in
//! `optiscan-engine`; this crate decides what goes into the graph and how
//! it is swept.
//!
//! ## Modules
//!
//! - [`types`]: Component specifications (laser, mirrors, links, detectors).
//! - [`builder`]: Fabry–Perot and Michelson builders.
//! - [`topology`]: Recognised `(type, topology)` pairs.
//! - [`scan`]: Linear sweeps of a link length.
//! - [`table`]: Two-column scan results.

pub mod builder;
pub mod scan;
pub mod table;
pub mod topology;
pub mod types;

pub use builder::{BuildError, Built};
pub use scan::{run_scan, ScanError, ScanSpec};
pub use table::ScanTable;
pub use topology::{Topology, TopologyError};
