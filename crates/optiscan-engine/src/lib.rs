//! # Optiscan Engine
//!
//! The engine-facing layer of optiscan. This crate owns the simulation graph
//! ([`Model`]) and the [`Engine`] trait that solves it, so the scan and
//! topology code in `optiscan-core` never depends on how a solve is carried
//! out.
//!
//! ## Available engines
//!
//! | Engine | Module | Notes |
//! |--------|--------|-------|
//! | External process | [`process`] | KatScript on disk, readouts on stdout |
//!
//! Test code supplies in-process engines by implementing [`Engine`] directly.

pub mod backend;
pub mod katscript;
pub mod model;
pub mod process;

pub use backend::{Engine, EngineError, EngineInfo, EngineType, Solution};
pub use model::{Component, ComponentKind, Direction, Handle, Model, ModelError, Parameter, Port};
pub use process::ProcessEngine;
