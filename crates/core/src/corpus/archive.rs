use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::{BirthmarkError, BirthmarkResult};

/// A zip archive unpacked into a temporary directory.
///
/// The directory is removed when this value is dropped, whichever way the
/// caller exits.
#[derive(Debug)]
pub struct ExtractedArchive {
    dir: TempDir,
    root: PathBuf,
}

impl ExtractedArchive {
    /// Directory to treat as the corpus root.
    ///
    /// When the archive holds a single top-level directory, that directory;
    /// otherwise the extraction directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The temporary extraction directory.
    pub fn extraction_dir(&self) -> &Path {
        self.dir.path()
    }
}

pub fn is_zip_archive(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    path.is_file() && ext.eq_ignore_ascii_case("zip")
}

/// Unpack `archive` into a fresh temporary directory.
pub fn extract_archive(archive: &Path) -> BirthmarkResult<ExtractedArchive> {
    info!(archive = %archive.display(), "extracting firmware archive");
    let file = fs::File::open(archive).map_err(|source| BirthmarkError::io(archive, source))?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|source| BirthmarkError::Archive { path: archive.to_path_buf(), source })?;

    let dir = tempfile::Builder::new()
        .prefix("firmware-corpus-")
        .tempdir()
        .map_err(|source| BirthmarkError::io(std::env::temp_dir(), source))?;
    zip.extract(dir.path())
        .map_err(|source| BirthmarkError::Archive { path: archive.to_path_buf(), source })?;

    let root = single_top_level_dir(dir.path())?.unwrap_or_else(|| dir.path().to_path_buf());
    debug!(extracted = %dir.path().display(), root = %root.display(), "archive extracted");
    Ok(ExtractedArchive { dir, root })
}

fn single_top_level_dir(dir: &Path) -> BirthmarkResult<Option<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| BirthmarkError::io(dir, source))? {
        let entry = entry.map_err(|source| BirthmarkError::io(dir, source))?;
        if entry.file_name() == "__MACOSX" {
            continue;
        }
        entries.push(entry.path());
    }
    match entries.as_slice() {
        [only] if only.is_dir() => Ok(Some(only.clone())),
        _ => Ok(None),
    }
}
