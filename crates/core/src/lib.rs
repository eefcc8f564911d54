//! birthmark-core
//!
//! Core library for structural firmware birthmarks.
//!
//! Disassembly listings are parsed into code blocks, each instruction is
//! reduced to an address-independent offset vector, and the canonical hash of
//! `(mnemonic, offset vector)` becomes the unit of comparison. A corpus of
//! known projects is reduced to per-project unique digests, against which an
//! unknown firmware is scored.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends; the `firmware-classifier` CLI is a thin wrapper.

pub mod analysis;
pub mod corpus;
pub mod error;
pub mod features;
pub mod hashing;
pub mod model;
pub mod parser;
pub mod services;
pub mod store;

pub use error::{BirthmarkError, BirthmarkResult};

/// Returns the library version as encoded at compile time.
///
/// Stamped into the feature store so outputs can be traced to a build.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
