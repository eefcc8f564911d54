//! Core data model for parsed listings, structural features, and scores.
//!
//! Instructions, blocks, offset vectors, and digests are transient: they are
//! recomputed from source text on every run and never persisted directly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One parsed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Normalized (lowercase, suffix-stripped) mnemonic.
    pub mnemonic: String,
    /// Operand text, split on top-level commas.
    pub operands: Vec<String>,
    /// Zero-based index within the enclosing block.
    pub position_in_block: usize,
    /// Address column, when the listing has one. Only used to resolve branch targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<u64>,
}

/// Run of instructions opened by a label or section boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Section the block was found in (e.g. `.text`).
    pub section: String,
    /// Position of the block within its section, in parse order.
    pub block_index: usize,
    /// Label that opened the block, if any.
    pub label: Option<String>,
    /// Labels that stood directly before `label` with no instructions of their own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub instructions: Vec<Instruction>,
}

impl CodeBlock {
    pub fn new(section: impl Into<String>, block_index: usize, label: Option<String>) -> Self {
        Self {
            section: section.into(),
            block_index,
            label,
            aliases: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Every name this block can be reached by: the aliases, then the label.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str).chain(self.label.as_deref())
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Structural position of an instruction: `(opcode_offset, codeblock_offset, branch_offset)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OffsetVector {
    pub opcode_offset: i64,
    pub codeblock_offset: i64,
    pub branch_offset: i64,
}

impl OffsetVector {
    pub fn new(opcode_offset: i64, codeblock_offset: i64, branch_offset: i64) -> Self {
        Self { opcode_offset, codeblock_offset, branch_offset }
    }
}

impl fmt::Display for OffsetVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.opcode_offset, self.codeblock_offset, self.branch_offset)
    }
}

/// A mnemonic paired with its offset vector; the input to the canonical hasher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Feature {
    pub mnemonic: String,
    pub vector: OffsetVector,
}

impl Feature {
    pub fn new(mnemonic: impl Into<String>, vector: OffsetVector) -> Self {
        Self { mnemonic: mnemonic.into(), vector }
    }
}

/// Fixed-length lowercase hex digest of a canonical feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureDigest(String);

impl FeatureDigest {
    /// Wrap an already computed hex digest (e.g. one read back from a table).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A digest together with the mnemonic it was computed from.
///
/// The mnemonic is carried along only for reporting; identity is the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestedFeature {
    pub feature: Feature,
    pub digest: FeatureDigest,
}

/// Discretized confidence label derived from a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score of one project against an unknown firmware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub project: String,
    /// `matched_count / total_unique_count`, or 0 for a project without unique features.
    pub similarity: f64,
    pub matched_count: usize,
    pub total_unique_count: usize,
    pub confidence: ConfidenceTier,
}
