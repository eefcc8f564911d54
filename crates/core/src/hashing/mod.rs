//! Canonical feature hashing.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::{DigestedFeature, Feature, FeatureDigest};

/// Hashed form of a feature. Fields are declared in key order and serialize in that order.
#[derive(Serialize)]
struct CanonicalFeature<'a> {
    branch_offset: i64,
    codeblock_offset: i64,
    mnemonic: &'a str,
    opcode_offset: i64,
}

/// Sorted-key JSON encoding of a feature:
/// `{"branch_offset":..,"codeblock_offset":..,"mnemonic":..,"opcode_offset":..}`.
pub fn canonical_encoding(feature: &Feature) -> String {
    let canonical = CanonicalFeature {
        branch_offset: feature.vector.branch_offset,
        codeblock_offset: feature.vector.codeblock_offset,
        mnemonic: &feature.mnemonic,
        opcode_offset: feature.vector.opcode_offset,
    };
    // Integers and a str always serialize.
    serde_json::to_string(&canonical).unwrap_or_default()
}

/// SHA-256 of the canonical encoding, as 64 lowercase hex characters.
pub fn digest_feature(feature: &Feature) -> FeatureDigest {
    FeatureDigest::from_hex(sha256_hex(canonical_encoding(feature).as_bytes()))
}

/// Hash every feature, keeping the feature alongside its digest.
pub fn digest_all(features: Vec<Feature>) -> Vec<DigestedFeature> {
    features
        .into_iter()
        .map(|feature| {
            let digest = digest_feature(&feature);
            DigestedFeature { feature, digest }
        })
        .collect()
}

/// Compute the SHA-256 of a byte slice and return it as a hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
