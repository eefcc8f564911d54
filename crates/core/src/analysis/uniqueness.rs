use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{DigestedFeature, FeatureDigest};

/// Digests of one project, each mapped to the mnemonic it was computed from.
pub type DigestSet = BTreeMap<FeatureDigest, String>;

/// Digests that occur in one project and in no other project of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueFeatureSet {
    pub project: String,
    /// Size of the project's aggregate digest set before filtering, when known.
    #[serde(default)]
    pub raw_count: usize,
    pub features: DigestSet,
}

impl UniqueFeatureSet {
    pub fn new(project: impl Into<String>, raw_count: usize, features: DigestSet) -> Self {
        Self { project: project.into(), raw_count, features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, digest: &FeatureDigest) -> bool {
        self.features.contains_key(digest)
    }

    /// `(digest, opcode)` pairs in digest order.
    pub fn iter(&self) -> impl Iterator<Item = (&FeatureDigest, &str)> {
        self.features.iter().map(|(digest, opcode)| (digest, opcode.as_str()))
    }
}

/// Per-project unique sets, keyed (and therefore ordered) by project name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueFeatureTable {
    /// Where the table was loaded from; `None` for tables built in memory.
    pub origin: Option<PathBuf>,
    pub projects: BTreeMap<String, UniqueFeatureSet>,
}

impl UniqueFeatureTable {
    pub fn new(projects: BTreeMap<String, UniqueFeatureSet>) -> Self {
        Self { origin: None, projects }
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn get(&self, project: &str) -> Option<&UniqueFeatureSet> {
        self.projects.get(project)
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Total number of unique digests across all projects.
    pub fn total_features(&self) -> usize {
        self.projects.values().map(UniqueFeatureSet::len).sum()
    }

    pub fn describe_origin(&self) -> String {
        match &self.origin {
            Some(path) => path.display().to_string(),
            None => "in-memory table".to_string(),
        }
    }
}

/// Compute `unique_p = digests(p) - union(digests(q) for q != p)` for every project.
///
/// One pass counts how many projects hold each digest; a second keeps the
/// digests held by exactly one project. Projects with an empty result are
/// kept (and logged) so they can still be scored as zero.
pub fn unique_features(projects: &BTreeMap<String, DigestSet>) -> UniqueFeatureTable {
    let mut holders: HashMap<&FeatureDigest, usize> = HashMap::new();
    for digests in projects.values() {
        for digest in digests.keys() {
            *holders.entry(digest).or_insert(0) += 1;
        }
    }
    debug!(projects = projects.len(), distinct = holders.len(), "computed corpus digest union");

    let sets = projects
        .iter()
        .map(|(name, digests)| {
            let features: DigestSet = digests
                .iter()
                .filter(|(digest, _)| holders.get(digest) == Some(&1))
                .map(|(digest, opcode)| (digest.clone(), opcode.clone()))
                .collect();
            if features.is_empty() {
                warn!(project = %name, raw = digests.len(), "project has no unique features");
            }
            (name.clone(), UniqueFeatureSet::new(name.clone(), digests.len(), features))
        })
        .collect();

    UniqueFeatureTable::new(sets)
}

/// Aggregates per-project digest sets for one build pass.
///
/// The corpus-wide union only exists inside `finish`; nothing outlives the pass.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    projects: BTreeMap<String, DigestSet>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project even if it ends up contributing no digests.
    pub fn ensure_project(&mut self, project: &str) -> &mut DigestSet {
        self.projects.entry(project.to_string()).or_default()
    }

    /// Merge one file's digests into its project. Duplicates collapse.
    pub fn add_features<'f, I>(&mut self, project: &str, features: I) -> &mut Self
    where
        I: IntoIterator<Item = &'f DigestedFeature>,
    {
        let set = self.ensure_project(project);
        for item in features {
            set.insert(item.digest.clone(), item.feature.mnemonic.clone());
        }
        self
    }

    pub fn project_digests(&self) -> &BTreeMap<String, DigestSet> {
        &self.projects
    }

    pub fn finish(self) -> UniqueFeatureTable {
        unique_features(&self.projects)
    }
}
