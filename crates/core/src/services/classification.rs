use std::path::Path;

use tracing::info;

use crate::analysis::{classify_digests, ClassificationReport, UniqueFeatureTable};
use crate::corpus::read_listing;
use crate::services::fingerprint::Fingerprinter;
use crate::store::{load_unique_table, ClassifierConfig};
use crate::BirthmarkResult;

/// Classifies unknown listings against a loaded unique-feature table.
#[derive(Debug)]
pub struct ClassificationRunner<'a> {
    pub config: &'a ClassifierConfig,
    pub table: UniqueFeatureTable,
}

impl<'a> ClassificationRunner<'a> {
    pub fn new(config: &'a ClassifierConfig, table: UniqueFeatureTable) -> Self {
        Self { config, table }
    }

    /// Load the table first so a missing or empty store fails before any parsing.
    pub fn from_table_path(
        config: &'a ClassifierConfig,
        table_path: &Path,
    ) -> BirthmarkResult<Self> {
        let table = load_unique_table(table_path)?;
        Ok(Self::new(config, table))
    }

    /// Classify listing text already in memory.
    pub fn classify_text(&self, name: &str, text: &str) -> BirthmarkResult<ClassificationReport> {
        let fingerprint = Fingerprinter::from_config(self.config).fingerprint(text);
        let digests = fingerprint.digest_set();
        info!(
            firmware = name,
            instructions = fingerprint.stats.instructions,
            distinct = digests.len(),
            "fingerprinted unknown firmware"
        );
        let records = classify_digests(&digests, &self.table, &self.config.thresholds)?;
        Ok(ClassificationReport::new(name, fingerprint.stats.instructions, digests.len(), records))
    }

    /// Read and classify the listing at `path`.
    pub fn classify_file(&self, path: &Path) -> BirthmarkResult<ClassificationReport> {
        let text = read_listing(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.classify_text(&name, &text)
    }
}
