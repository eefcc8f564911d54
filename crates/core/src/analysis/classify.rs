use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::uniqueness::UniqueFeatureTable;
use crate::model::{ClassificationRecord, ConfidenceTier, FeatureDigest};
use crate::{BirthmarkError, BirthmarkResult};

/// Similarity cutoffs for confidence tiers: `high` if `s >= high`,
/// `medium` if `medium <= s < high`, otherwise `low`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self { high: 0.5, medium: 0.2 }
    }
}

impl ConfidenceThresholds {
    pub fn new(high: f64, medium: f64) -> BirthmarkResult<Self> {
        let thresholds = Self { high, medium };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> BirthmarkResult<()> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.high) || !in_range(self.medium) {
            return Err(BirthmarkError::InvalidConfig(format!(
                "confidence thresholds must lie in [0, 1] (high={}, medium={})",
                self.high, self.medium
            )));
        }
        if self.medium > self.high {
            return Err(BirthmarkError::InvalidConfig(format!(
                "medium threshold {} exceeds high threshold {}",
                self.medium, self.high
            )));
        }
        Ok(())
    }

    pub fn tier(&self, similarity: f64) -> ConfidenceTier {
        if similarity >= self.high {
            ConfidenceTier::High
        } else if similarity >= self.medium {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Score an unknown firmware's digests against every project's unique set.
///
/// Records are sorted by descending similarity, ties broken by project name.
/// Fails only when the table holds no projects.
pub fn classify_digests(
    unknown: &HashSet<FeatureDigest>,
    table: &UniqueFeatureTable,
    thresholds: &ConfidenceThresholds,
) -> BirthmarkResult<Vec<ClassificationRecord>> {
    if table.is_empty() {
        return Err(BirthmarkError::EmptyStore(table.describe_origin()));
    }

    let mut records: Vec<ClassificationRecord> = table
        .projects
        .values()
        .map(|set| {
            let total = set.len();
            let matched = if unknown.len() <= total {
                unknown.iter().filter(|d| set.contains(d)).count()
            } else {
                set.features.keys().filter(|d| unknown.contains(*d)).count()
            };
            let similarity = if total == 0 { 0.0 } else { matched as f64 / total as f64 };
            debug!(project = %set.project, matched, total, similarity, "scored project");
            ClassificationRecord {
                project: set.project.clone(),
                similarity,
                matched_count: matched,
                total_unique_count: total,
                confidence: thresholds.tier(similarity),
            }
        })
        .collect();

    records.sort_by(|a, b| {
        b.similarity.total_cmp(&a.similarity).then_with(|| a.project.cmp(&b.project))
    });
    Ok(records)
}

/// A ranked record as it appears in reports (rank is 1-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecord {
    pub rank: usize,
    #[serde(flatten)]
    pub record: ClassificationRecord,
}

/// Full result of classifying one firmware file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Display name of the classified file.
    pub firmware: String,
    pub instruction_count: usize,
    pub distinct_digests: usize,
    pub records: Vec<RankedRecord>,
}

impl ClassificationReport {
    pub fn new(
        firmware: impl Into<String>,
        instruction_count: usize,
        distinct_digests: usize,
        records: Vec<ClassificationRecord>,
    ) -> Self {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| RankedRecord { rank: i + 1, record })
            .collect();
        Self { firmware: firmware.into(), instruction_count, distinct_digests, records }
    }

    /// The rank-1 record.
    pub fn best_match(&self) -> Option<&ClassificationRecord> {
        self.records.first().map(|r| &r.record)
    }
}
