//! Offset-vector feature extraction.
//!
//! Each instruction becomes `(mnemonic, [opcode_offset, codeblock_offset, branch_offset])`.
//! The vector encodes control-flow shape (position in block, block position in
//! section, branch reach) rather than raw bytes or absolute addresses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{CodeBlock, Feature, Instruction, OffsetVector};

/// Mnemonics whose first operand is a branch target.
pub const BRANCH_MNEMONICS: &[&str] = &[
    "b", "bl", "bx", "blx", "bne", "beq", "bcs", "bcc", "bmi", "bpl", "bvs", "bvc", "bhi", "bls",
    "bge", "blt", "bgt", "ble", "bal",
];

pub fn is_branch(mnemonic: &str) -> bool {
    BRANCH_MNEMONICS.contains(&mnemonic)
}

/// Encoding of `branch_offset` for resolved targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchOffsetPolicy {
    /// Signed distance in instructions across the whole section.
    #[default]
    SectionLinear,
    /// Signed distance in instructions when the target is in the same block, else 0.
    SameBlock,
}

/// Position of an instruction: index into the block slice and position in that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Site {
    block: usize,
    position: usize,
}

/// Lookup tables for branch targets, built once per listing.
struct TargetIndex<'a> {
    by_address: HashMap<u64, Site>,
    by_label: HashMap<&'a str, Site>,
    label_address: HashMap<&'a str, u64>,
}

impl<'a> TargetIndex<'a> {
    fn build(blocks: &'a [CodeBlock]) -> Self {
        let mut by_address = HashMap::new();
        let mut by_label = HashMap::new();
        let mut label_address = HashMap::new();

        for (block_idx, block) in blocks.iter().enumerate() {
            let first_address = block.instructions.first().and_then(|i| i.address);
            for label in block.labels() {
                by_label.entry(label).or_insert(Site { block: block_idx, position: 0 });
                if let Some(addr) = first_address {
                    label_address.entry(label).or_insert(addr);
                }
            }
            for insn in &block.instructions {
                if let Some(addr) = insn.address {
                    by_address
                        .entry(addr)
                        .or_insert(Site { block: block_idx, position: insn.position_in_block });
                }
            }
        }

        Self { by_address, by_label, label_address }
    }

    /// Resolve the first operand of a branch to a site in the same listing.
    fn resolve(&self, insn: &Instruction) -> Option<Site> {
        let operand = insn.operands.first()?.trim();

        let head = operand.split_whitespace().next().unwrap_or(operand);
        if let Some(addr) = parse_address(head) {
            if let Some(site) = self.by_address.get(&addr) {
                return Some(*site);
            }
        }

        if let (Some(open), Some(close)) = (operand.find('<'), operand.rfind('>')) {
            if open < close {
                return self.resolve_symbol(&operand[open + 1..close]);
            }
        }

        self.by_label.get(head).copied()
    }

    /// Resolve `name` or `name+0xN`.
    fn resolve_symbol(&self, symbol: &str) -> Option<Site> {
        match symbol.split_once('+') {
            None => self.by_label.get(symbol).copied(),
            Some((name, offset)) => {
                let offset = parse_address(offset.trim())?;
                if offset == 0 {
                    return self.by_label.get(name).copied();
                }
                let base = self.label_address.get(name)?;
                self.by_address.get(&base.checked_add(offset)?).copied()
            }
        }
    }
}

fn parse_address(token: &str) -> Option<u64> {
    let token = token.trim_start_matches('#');
    let digits = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")).unwrap_or(token);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Converts parsed code blocks into features.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor {
    policy: BranchOffsetPolicy,
}

impl FeatureExtractor {
    pub fn new(policy: BranchOffsetPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BranchOffsetPolicy {
        self.policy
    }

    /// One feature per instruction, in encounter order.
    pub fn extract(&self, blocks: &[CodeBlock]) -> Vec<Feature> {
        let index = TargetIndex::build(blocks);
        let linear_base = linear_bases(blocks);

        let mut features = Vec::with_capacity(blocks.iter().map(CodeBlock::len).sum());
        for (block_idx, block) in blocks.iter().enumerate() {
            for insn in &block.instructions {
                let branch_offset = if is_branch(&insn.mnemonic) {
                    let here = Site { block: block_idx, position: insn.position_in_block };
                    index
                        .resolve(insn)
                        .map(|target| self.branch_offset(blocks, &linear_base, here, target))
                        .unwrap_or(0)
                } else {
                    0
                };
                let vector = OffsetVector::new(
                    insn.position_in_block as i64,
                    block.block_index as i64,
                    branch_offset,
                );
                features.push(Feature::new(insn.mnemonic.clone(), vector));
            }
        }
        features
    }

    fn branch_offset(
        &self,
        blocks: &[CodeBlock],
        linear_base: &[usize],
        here: Site,
        target: Site,
    ) -> i64 {
        match self.policy {
            BranchOffsetPolicy::SameBlock => {
                if here.block == target.block {
                    target.position as i64 - here.position as i64
                } else {
                    0
                }
            }
            BranchOffsetPolicy::SectionLinear => {
                if blocks[here.block].section != blocks[target.block].section {
                    return 0;
                }
                let from = linear_base[here.block] + here.position;
                let to = linear_base[target.block] + target.position;
                to as i64 - from as i64
            }
        }
    }
}

/// Number of instructions preceding each block within its own section.
fn linear_bases(blocks: &[CodeBlock]) -> Vec<usize> {
    let mut running: HashMap<&str, usize> = HashMap::new();
    blocks
        .iter()
        .map(|block| {
            let total = running.entry(block.section.as_str()).or_insert(0);
            let base = *total;
            *total += block.len();
            base
        })
        .collect()
}
