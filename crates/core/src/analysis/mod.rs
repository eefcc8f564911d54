//! Corpus analysis: cross-project uniqueness and similarity classification.

pub mod classify;
pub mod uniqueness;

pub use classify::{classify_digests, ClassificationReport, ConfidenceThresholds, RankedRecord};
pub use uniqueness::{
    unique_features, CorpusBuilder, DigestSet, UniqueFeatureSet, UniqueFeatureTable,
};
