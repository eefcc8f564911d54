use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::ConfidenceThresholds;
use crate::features::BranchOffsetPolicy;
use crate::{BirthmarkError, BirthmarkResult};

fn default_code_sections() -> Vec<String> {
    vec![".text".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec!["asm".to_string()]
}

fn default_report_limit() -> usize {
    10
}

/// Tunable policy for extraction and classification.
///
/// Every field has a default, so an empty YAML/JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Section names whose contents are treated as executable code.
    #[serde(default = "default_code_sections")]
    pub code_sections: Vec<String>,
    /// File extensions (without the dot) recognized as disassembly listings.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// How branch targets outside the branch's own block are encoded.
    #[serde(default)]
    pub branch_policy: BranchOffsetPolicy,
    /// Similarity cutoffs for the confidence tiers.
    #[serde(default)]
    pub thresholds: ConfidenceThresholds,
    /// Number of records shown in the rendered text report.
    #[serde(default = "default_report_limit")]
    pub report_limit: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            code_sections: default_code_sections(),
            extensions: default_extensions(),
            branch_policy: BranchOffsetPolicy::default(),
            thresholds: ConfidenceThresholds::default(),
            report_limit: default_report_limit(),
        }
    }
}

impl ClassifierConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> BirthmarkResult<()> {
        if self.code_sections.is_empty() {
            return Err(BirthmarkError::InvalidConfig(
                "at least one code section is required".to_string(),
            ));
        }
        if self.extensions.iter().any(|ext| ext.trim().is_empty()) {
            return Err(BirthmarkError::InvalidConfig(
                "file extensions must not be empty".to_string(),
            ));
        }
        self.thresholds.validate()
    }

    /// Load a config from `.yaml`/`.yml` or `.json`, chosen by extension.
    pub fn load(path: &Path) -> BirthmarkResult<Self> {
        let body =
            std::fs::read_to_string(path).map_err(|source| BirthmarkError::io(path, source))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_lowercase();
        let config: ClassifierConfig = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&body)?,
            "json" => serde_json::from_str(&body)?,
            other => {
                return Err(BirthmarkError::InvalidConfig(format!(
                    "unsupported config format '{other}' for {} (expected yaml, yml, or json)",
                    path.display()
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Whether `path` carries one of the configured listing extensions.
    ///
    /// `firmware.elf.asm` matches `asm`; matching is case-insensitive.
    pub fn matches_extension(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let name = name.to_lowercase();
        self.extensions.iter().any(|ext| {
            let ext = ext.trim_start_matches('.').to_lowercase();
            name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}"))
        })
    }
}
