use std::path::{Path, PathBuf};

/// File name of the informational feature store.
pub const FEATURE_STORE_FILE: &str = "firmware_database.json";
/// File name of the unique-feature table (CSV form).
pub const UNIQUE_CSV_FILE: &str = "unique_features.csv";
/// File name of the unique-feature table (JSON form).
pub const UNIQUE_JSON_FILE: &str = "unique_features.json";

/// Logical layout of an extraction output directory.
///
/// This is derived from a chosen root path. It does not perform any IO itself;
/// the extraction service creates the directory before writing.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    /// Output directory.
    pub root: PathBuf,
    /// Feature store (`project -> version -> opcode -> digest`).
    pub feature_store_path: PathBuf,
    /// Unique-feature table consumed by classification.
    pub unique_csv_path: PathBuf,
    /// Same table as JSON, including projects without unique features.
    pub unique_json_path: PathBuf,
}

impl OutputLayout {
    /// Compute the layout for outputs rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let feature_store_path = root.join(FEATURE_STORE_FILE);
        let unique_csv_path = root.join(UNIQUE_CSV_FILE);
        let unique_json_path = root.join(UNIQUE_JSON_FILE);
        Self { root, feature_store_path, unique_csv_path, unique_json_path }
    }
}
