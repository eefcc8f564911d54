use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{DigestSet, UniqueFeatureSet, UniqueFeatureTable};
use crate::model::FeatureDigest;

/// One firmware file that contributed to a version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the project directory.
    pub path: String,
    /// SHA-256 of the raw listing text.
    pub sha256: String,
    pub instruction_count: usize,
    pub skipped_lines: usize,
}

/// Features recorded for one version of a project.
///
/// `features` maps opcode to digest; when an opcode yields several digests the
/// last one seen (in sorted traversal order) wins. Uniqueness is computed from
/// full digest sets, never from this map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionRecord {
    pub name: String,
    pub files: Vec<FileRecord>,
    pub features: BTreeMap<String, FeatureDigest>,
}

impl VersionRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), files: Vec::new(), features: BTreeMap::new() }
    }
}

/// A known project and its versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    pub name: String,
    pub versions: Vec<VersionRecord>,
}

impl ProjectRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), versions: Vec::new() }
    }

    /// Get or create the version record named `version`.
    pub fn version_mut(&mut self, version: &str) -> &mut VersionRecord {
        let idx = match self.versions.iter().position(|v| v.name == version) {
            Some(idx) => idx,
            None => {
                self.versions.push(VersionRecord::new(version));
                self.versions.len() - 1
            }
        };
        &mut self.versions[idx]
    }
}

/// Feature store written by extraction (`firmware_database.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureStore {
    /// RFC 3339 timestamp of the extraction run.
    pub generated_at: String,
    pub tool_version: String,
    pub projects: Vec<ProjectRecord>,
}

impl FeatureStore {
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            generated_at: generated_at.into(),
            tool_version: crate::version().to_string(),
            projects: Vec::new(),
        }
    }

    /// Get or create the project record named `project`.
    pub fn project_mut(&mut self, project: &str) -> &mut ProjectRecord {
        let idx = match self.projects.iter().position(|p| p.name == project) {
            Some(idx) => idx,
            None => {
                self.projects.push(ProjectRecord::new(project));
                self.projects.len() - 1
            }
        };
        &mut self.projects[idx]
    }

    pub fn project(&self, project: &str) -> Option<&ProjectRecord> {
        self.projects.iter().find(|p| p.name == project)
    }
}

/// One row of `unique_features.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UniqueFeatureRow {
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "Opcode")]
    pub opcode: String,
    #[serde(rename = "Hash")]
    pub hash: FeatureDigest,
}

/// `(opcode, hash)` entry of the JSON table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UniqueFeatureEntry {
    pub opcode: String,
    pub hash: FeatureDigest,
}

/// Per-project section of the JSON table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UniqueProjectDocument {
    pub name: String,
    #[serde(default)]
    pub raw_feature_count: usize,
    pub features: Vec<UniqueFeatureEntry>,
}

/// `unique_features.json`: the unique table, including degenerate projects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UniqueTableDocument {
    pub projects: Vec<UniqueProjectDocument>,
}

impl From<&UniqueFeatureTable> for UniqueTableDocument {
    fn from(table: &UniqueFeatureTable) -> Self {
        let projects = table
            .projects
            .values()
            .map(|set| UniqueProjectDocument {
                name: set.project.clone(),
                raw_feature_count: set.raw_count,
                features: set
                    .iter()
                    .map(|(hash, opcode)| UniqueFeatureEntry {
                        opcode: opcode.to_string(),
                        hash: hash.clone(),
                    })
                    .collect(),
            })
            .collect();
        Self { projects }
    }
}

impl From<UniqueTableDocument> for UniqueFeatureTable {
    fn from(doc: UniqueTableDocument) -> Self {
        let mut projects: BTreeMap<String, UniqueFeatureSet> = BTreeMap::new();
        for project in doc.projects {
            let set = projects.entry(project.name.clone()).or_insert_with(|| {
                UniqueFeatureSet::new(project.name.clone(), 0, DigestSet::new())
            });
            set.raw_count = set.raw_count.max(project.raw_feature_count);
            for entry in project.features {
                set.features.insert(entry.hash, entry.opcode);
            }
        }
        UniqueFeatureTable::new(projects)
    }
}

/// Flatten a table into CSV rows ordered by project, then digest.
pub fn unique_rows(table: &UniqueFeatureTable) -> Vec<UniqueFeatureRow> {
    table
        .projects
        .values()
        .flat_map(|set| {
            set.iter().map(move |(hash, opcode)| UniqueFeatureRow {
                project: set.project.clone(),
                opcode: opcode.to_string(),
                hash: hash.clone(),
            })
        })
        .collect()
}

/// Rebuild a table from CSV rows. Only projects with at least one row appear.
pub fn table_from_rows(rows: impl IntoIterator<Item = UniqueFeatureRow>) -> UniqueFeatureTable {
    let mut projects: BTreeMap<String, UniqueFeatureSet> = BTreeMap::new();
    for row in rows {
        let set = projects
            .entry(row.project.clone())
            .or_insert_with(|| UniqueFeatureSet::new(row.project.clone(), 0, DigestSet::new()));
        set.features.insert(row.hash, row.opcode);
    }
    UniqueFeatureTable::new(projects)
}
