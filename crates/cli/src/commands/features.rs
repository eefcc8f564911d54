use std::path::Path;

use anyhow::{Context, Result};
use birthmark_core::corpus::read_listing;
use birthmark_core::services::Fingerprinter;

use crate::commands::load_config;

/// Print the parsed features and digests of a single listing.
pub fn features_command(firmware: &str, config: Option<&str>, json: bool) -> Result<()> {
    let config = load_config(config)?;
    let text = read_listing(Path::new(firmware))
        .with_context(|| format!("Failed to read firmware listing {firmware}"))?;
    let fingerprint = Fingerprinter::from_config(&config).fingerprint(&text);

    if json {
        let serialized = serde_json::to_string_pretty(&fingerprint)
            .context("Failed to serialize features to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Features for {firmware}:");
    println!(
        "  Lines: {}  Instructions: {}  Blocks: {}  Skipped: {}",
        fingerprint.stats.lines,
        fingerprint.stats.instructions,
        fingerprint.stats.blocks,
        fingerprint.stats.skipped_lines
    );
    println!("  Distinct digests: {}", fingerprint.digest_set().len());
    if fingerprint.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for item in &fingerprint.features {
        // OffsetVector's Display ignores width, so pad the rendered string.
        let vector = item.feature.vector.to_string();
        println!("  - {:<8} {:<16} {}", item.feature.mnemonic, vector, item.digest);
    }

    Ok(())
}
