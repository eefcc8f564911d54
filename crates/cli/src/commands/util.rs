use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use birthmark_core::analysis::ClassificationReport;
use birthmark_core::services::ExtractionSummary;
use birthmark_core::store::ClassifierConfig;

/// Load the config file if one was given, otherwise the defaults.
pub fn load_config(path: Option<&str>) -> Result<ClassifierConfig> {
    match path {
        Some(p) => ClassifierConfig::load(Path::new(p))
            .with_context(|| format!("Failed to load config at {p}")),
        None => Ok(ClassifierConfig::default()),
    }
}

/// Render the ranked table plus the best-match block.
pub fn render_report(report: &ClassificationReport, limit: usize) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();

    let _ = writeln!(out, "Classification Results for {}", report.firmware);
    let _ = writeln!(
        out,
        "Instructions: {}  Distinct features: {}",
        report.instruction_count, report.distinct_digests
    );
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "{:<5} {:<20} {:<12} {:<10} {:<10} Confidence",
        "Rank", "Project", "Similarity", "Matched", "Total"
    );
    let _ = writeln!(out, "{rule}");
    for ranked in report.records.iter().take(limit) {
        let r = &ranked.record;
        let _ = writeln!(
            out,
            "{:<5} {:<20} {:<12.3} {:<10} {:<10} {}",
            ranked.rank,
            r.project,
            r.similarity,
            r.matched_count,
            r.total_unique_count,
            r.confidence
        );
    }

    if let Some(best) = report.best_match() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Best Match:");
        let _ = writeln!(out, "  Project: {}", best.project);
        let _ = writeln!(
            out,
            "  Similarity: {:.3} ({:.1}%)",
            best.similarity,
            best.similarity * 100.0
        );
        let _ = writeln!(
            out,
            "  Matched Features: {}/{}",
            best.matched_count, best.total_unique_count
        );
        let _ = writeln!(out, "  Confidence: {}", best.confidence);
    }
    out
}

/// Render the post-extraction summary.
pub fn render_extraction_summary(summary: &ExtractionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Feature extraction completed:");
    let _ = writeln!(out, "  Files: {}", summary.files);
    let _ = writeln!(
        out,
        "  Instructions: {} (skipped lines: {})",
        summary.instructions, summary.skipped_lines
    );
    let _ = writeln!(out, "  Projects ({}):", summary.projects.len());
    for project in &summary.projects {
        let _ = writeln!(
            out,
            "    - {}: {} unique of {} features (versions: {}, files: {})",
            project.name,
            project.unique_features,
            project.raw_features,
            project.versions,
            project.files
        );
    }
    let _ = writeln!(out, "  Total unique features: {}", summary.total_unique());
    out
}
