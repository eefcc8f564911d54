//! Persisted artifacts: feature store, unique-feature table, output layout, and config.
//!
//! Only the unique-feature table feeds classification. The feature store is
//! written for inspection and records where every digest came from:
//! - `FeatureStore` -> `ProjectRecord` -> `VersionRecord` (opcode -> digest).
//! - `UniqueFeatureRow`: one CSV row per unique digest.
//! - `UniqueTableDocument`: JSON form that also keeps degenerate projects.

pub mod config;
pub mod layout;
pub mod models;
pub mod util;

pub use config::ClassifierConfig;
pub use layout::{OutputLayout, FEATURE_STORE_FILE, UNIQUE_CSV_FILE, UNIQUE_JSON_FILE};
pub use models::{
    table_from_rows, unique_rows, FeatureStore, FileRecord, ProjectRecord, UniqueFeatureEntry,
    UniqueFeatureRow, UniqueProjectDocument, UniqueTableDocument, VersionRecord,
};
pub use util::{
    load_feature_store, load_unique_table, write_feature_store, write_unique_csv,
    write_unique_json,
};
