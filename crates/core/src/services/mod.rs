//! Pipelines that tie parsing, hashing, the corpus, and the store together.

pub mod classification;
pub mod extraction;
pub mod fingerprint;

pub use classification::ClassificationRunner;
pub use extraction::{CorpusBuild, ExtractionRunner, ExtractionSummary, ProjectSummary};
pub use fingerprint::{FirmwareFingerprint, Fingerprinter};
