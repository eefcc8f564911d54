use std::path::Path;

use anyhow::{Context, Result};
use birthmark_core::services::ClassificationRunner;
use tracing::debug;

use crate::commands::{load_config, render_report};

/// Classify one listing against a previously extracted unique-feature table.
pub fn classify_command(
    firmware: &str,
    features: &str,
    config: Option<&str>,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let table_path = Path::new(features);
    debug!(table = %table_path.display(), firmware, "classifying");

    let runner = ClassificationRunner::from_table_path(&config, table_path)
        .with_context(|| format!("Cannot classify without a unique-feature table ({features})"))?;
    let report = runner
        .classify_file(Path::new(firmware))
        .with_context(|| format!("Failed to classify {firmware}"))?;

    if json {
        let serialized = serde_json::to_string_pretty(&report)
            .context("Failed to serialize classification report to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    print!("{}", render_report(&report, top.unwrap_or(config.report_limit)));
    Ok(())
}
