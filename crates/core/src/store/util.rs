use std::fs;
use std::path::Path;

use tracing::info;

use crate::analysis::UniqueFeatureTable;
use crate::store::models::{
    table_from_rows, unique_rows, FeatureStore, UniqueFeatureRow, UniqueTableDocument,
};
use crate::{BirthmarkError, BirthmarkResult};

/// Write the feature store as pretty JSON.
pub fn write_feature_store(path: &Path, store: &FeatureStore) -> BirthmarkResult<()> {
    let json = serde_json::to_string_pretty(store)?;
    fs::write(path, json).map_err(|source| BirthmarkError::io(path, source))?;
    info!(path = %path.display(), projects = store.projects.len(), "wrote feature store");
    Ok(())
}

/// Load a feature store previously written by `write_feature_store`.
pub fn load_feature_store(path: &Path) -> BirthmarkResult<FeatureStore> {
    let body = fs::read_to_string(path).map_err(|source| BirthmarkError::io(path, source))?;
    Ok(serde_json::from_str(&body)?)
}

/// Write `Project,Opcode,Hash` rows, one per unique digest.
pub fn write_unique_csv(path: &Path, table: &UniqueFeatureTable) -> BirthmarkResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let rows = unique_rows(table);
    if rows.is_empty() {
        // serde-driven headers are only emitted with the first record.
        writer.write_record(["Project", "Opcode", "Hash"])?;
    }
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| BirthmarkError::io(path, source))?;
    info!(path = %path.display(), rows = rows.len(), "wrote unique-feature table");
    Ok(())
}

/// Write the JSON form of the unique table.
pub fn write_unique_json(path: &Path, table: &UniqueFeatureTable) -> BirthmarkResult<()> {
    let doc = UniqueTableDocument::from(table);
    let json = serde_json::to_string_pretty(&doc)?;
    fs::write(path, json).map_err(|source| BirthmarkError::io(path, source))?;
    Ok(())
}

fn read_unique_csv(path: &Path) -> Result<UniqueFeatureTable, String> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| e.to_string())?;
    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    for required in ["Project", "Opcode", "Hash"] {
        if !headers.iter().any(|h| h == required) {
            return Err(format!("missing '{required}' column"));
        }
    }
    let rows = reader
        .deserialize::<UniqueFeatureRow>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    Ok(table_from_rows(rows))
}

fn read_unique_json(path: &Path) -> Result<UniqueFeatureTable, String> {
    let body = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let doc: UniqueTableDocument = serde_json::from_str(&body).map_err(|e| e.to_string())?;
    Ok(UniqueFeatureTable::from(doc))
}

/// Load a unique-feature table from CSV, or from JSON when the path ends in `.json`.
///
/// Any failure to locate or decode the table is reported as `StoreMissing`;
/// a well-formed table with no projects is `EmptyStore`.
pub fn load_unique_table(path: &Path) -> BirthmarkResult<UniqueFeatureTable> {
    if !path.is_file() {
        return Err(BirthmarkError::store_missing(path, "file does not exist"));
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let is_json = ext.eq_ignore_ascii_case("json");
    let table = if is_json { read_unique_json(path) } else { read_unique_csv(path) }
        .map_err(|reason| BirthmarkError::store_missing(path, reason))?
        .with_origin(path);

    if table.is_empty() {
        return Err(BirthmarkError::EmptyStore(path.display().to_string()));
    }
    info!(
        path = %path.display(),
        projects = table.project_count(),
        features = table.total_features(),
        "loaded unique-feature table"
    );
    Ok(table)
}
