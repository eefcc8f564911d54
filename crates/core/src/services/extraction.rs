use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{CorpusBuilder, UniqueFeatureTable};
use crate::corpus::{CorpusSource, FirmwareSource};
use crate::hashing::sha256_hex;
use crate::services::fingerprint::Fingerprinter;
use crate::store::{
    write_feature_store, write_unique_csv, write_unique_json, ClassifierConfig, FeatureStore,
    FileRecord, OutputLayout,
};
use crate::{BirthmarkError, BirthmarkResult};

/// Per-project counts reported after a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub versions: usize,
    pub files: usize,
    pub raw_features: usize,
    pub unique_features: usize,
}

/// Outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub files: usize,
    pub instructions: usize,
    pub skipped_lines: usize,
    pub projects: Vec<ProjectSummary>,
}

impl ExtractionSummary {
    pub fn total_unique(&self) -> usize {
        self.projects.iter().map(|p| p.unique_features).sum()
    }
}

/// Everything one build pass produces, before anything is written.
#[derive(Debug, Clone)]
pub struct CorpusBuild {
    pub store: FeatureStore,
    pub unique: UniqueFeatureTable,
    pub summary: ExtractionSummary,
}

/// Builds the feature store and unique table from a corpus.
pub struct ExtractionRunner<'a> {
    pub config: &'a ClassifierConfig,
}

impl<'a> ExtractionRunner<'a> {
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self { config }
    }

    /// Fingerprint every source and compute per-project unique sets.
    ///
    /// Sources may arrive in any order; results depend only on their contents.
    pub fn build<I>(&self, sources: I) -> BirthmarkResult<CorpusBuild>
    where
        I: IntoIterator<Item = BirthmarkResult<FirmwareSource>>,
    {
        let fingerprinter = Fingerprinter::from_config(self.config);
        let mut builder = CorpusBuilder::new();
        let mut store = FeatureStore::new(Utc::now().to_rfc3339());
        let mut files = 0usize;
        let mut instructions = 0usize;
        let mut skipped_lines = 0usize;

        for source in sources {
            let source = source?;
            let fingerprint = fingerprinter.fingerprint(&source.contents);
            debug!(
                project = %source.project,
                version = %source.version,
                file = %source.relative_path,
                instructions = fingerprint.stats.instructions,
                skipped = fingerprint.stats.skipped_lines,
                "fingerprinted listing"
            );
            if fingerprint.is_empty() {
                warn!(file = %source.path.display(), "listing yielded no instructions");
            }

            files += 1;
            instructions += fingerprint.stats.instructions;
            skipped_lines += fingerprint.stats.skipped_lines;

            builder.add_features(&source.project, &fingerprint.features);

            let version = store.project_mut(&source.project).version_mut(&source.version);
            version.files.push(FileRecord {
                path: source.relative_path.clone(),
                sha256: sha256_hex(source.contents.as_bytes()),
                instruction_count: fingerprint.stats.instructions,
                skipped_lines: fingerprint.stats.skipped_lines,
            });
            for item in &fingerprint.features {
                version.features.insert(item.feature.mnemonic.clone(), item.digest.clone());
            }
        }

        let raw_counts: Vec<(String, usize)> =
            builder.project_digests().iter().map(|(name, set)| (name.clone(), set.len())).collect();
        let unique = builder.finish();

        let projects = raw_counts
            .into_iter()
            .map(|(name, raw_features)| {
                let record = store.project(&name);
                ProjectSummary {
                    versions: record.map_or(0, |p| p.versions.len()),
                    files: record.map_or(0, |p| p.versions.iter().map(|v| v.files.len()).sum()),
                    unique_features: unique.get(&name).map_or(0, |set| set.len()),
                    raw_features,
                    name,
                }
            })
            .collect::<Vec<_>>();

        for project in &projects {
            info!(
                project = %project.name,
                raw = project.raw_features,
                unique = project.unique_features,
                "project features"
            );
        }

        let summary = ExtractionSummary { files, instructions, skipped_lines, projects };
        Ok(CorpusBuild { store, unique, summary })
    }

    /// Discover, build, and write all outputs for the corpus at `corpus_root`.
    pub fn run(&self, corpus_root: &Path, output_dir: &Path) -> BirthmarkResult<ExtractionSummary> {
        // Holds any temporary extraction directory until this function returns.
        let corpus = CorpusSource::open(corpus_root)?;
        info!(corpus = %corpus.origin().display(), "scanning firmware corpus");

        let entries = corpus.discover(self.config)?;
        if entries.is_empty() {
            return Err(BirthmarkError::input_not_found(
                corpus_root,
                format!("no firmware listings with extensions {:?}", self.config.extensions),
            ));
        }

        let build = self.build(entries.iter().map(|entry| {
            info!(
                project = %entry.project,
                version = %entry.version,
                file = %entry.relative_path,
                "processing listing"
            );
            entry.load()
        }))?;

        let layout = OutputLayout::new(output_dir);
        fs::create_dir_all(&layout.root)
            .map_err(|source| BirthmarkError::io(&layout.root, source))?;
        write_feature_store(&layout.feature_store_path, &build.store)?;
        write_unique_csv(&layout.unique_csv_path, &build.unique)?;
        write_unique_json(&layout.unique_json_path, &build.unique)?;

        info!(
            files = build.summary.files,
            projects = build.summary.projects.len(),
            unique = build.summary.total_unique(),
            "feature extraction completed"
        );
        Ok(build.summary)
    }
}
