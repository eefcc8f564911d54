use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::features::FeatureExtractor;
use crate::hashing::digest_all;
use crate::model::{DigestedFeature, FeatureDigest};
use crate::parser::{ListingParser, ParseStats};
use crate::store::ClassifierConfig;

/// Features and digests of one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareFingerprint {
    pub stats: ParseStats,
    /// One entry per instruction, in encounter order.
    pub features: Vec<DigestedFeature>,
}

impl FirmwareFingerprint {
    /// Distinct digests; duplicates within the file collapse.
    pub fn digest_set(&self) -> HashSet<FeatureDigest> {
        self.features.iter().map(|f| f.digest.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Parser, extractor, and hasher wired together.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    parser: ListingParser,
    extractor: FeatureExtractor,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

impl Fingerprinter {
    pub fn new(parser: ListingParser, extractor: FeatureExtractor) -> Self {
        Self { parser, extractor }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            ListingParser::new(config.code_sections.clone()),
            FeatureExtractor::new(config.branch_policy),
        )
    }

    pub fn fingerprint(&self, listing_text: &str) -> FirmwareFingerprint {
        let listing = self.parser.parse(listing_text);
        trace!(
            instructions = listing.instruction_count(),
            blocks = listing.blocks.len(),
            "parsed listing"
        );
        let features = self.extractor.extract(&listing.blocks);
        FirmwareFingerprint { stats: listing.stats, features: digest_all(features) }
    }
}
