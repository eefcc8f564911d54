use anyhow::{Context, Result};
use birthmark_core::services::ExtractionRunner;
use birthmark_core::store::OutputLayout;
use tracing::debug;

use crate::canonicalize_or_current;
use crate::commands::{load_config, render_extraction_summary};

/// Build the feature store and unique-feature table from a corpus directory or archive.
pub fn extract_command(corpus_root: &str, output: &str, config: Option<&str>) -> Result<()> {
    let config = load_config(config)?;
    let corpus_path = canonicalize_or_current(corpus_root)?;
    let output_path = canonicalize_or_current(output)?;
    debug!(corpus = %corpus_path.display(), output = %output_path.display(), "resolved paths");

    let summary = ExtractionRunner::new(&config)
        .run(&corpus_path, &output_path)
        .with_context(|| format!("Failed to extract features from {}", corpus_path.display()))?;

    let layout = OutputLayout::new(&output_path);
    print!("{}", render_extraction_summary(&summary));
    println!("  Feature store: {}", layout.feature_store_path.display());
    println!("  Unique features (CSV): {}", layout.unique_csv_path.display());
    println!("  Unique features (JSON): {}", layout.unique_json_path.display());

    Ok(())
}
