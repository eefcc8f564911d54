//! Corpus discovery.
//!
//! A corpus is laid out as `project/version/[subdir/]listing.asm`, either as a
//! directory or as a zip archive of one. This module is the only place that
//! touches the filesystem layout; the rest of the core sees `FirmwareSource`
//! values (project, version, path, text).

pub mod archive;

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::store::ClassifierConfig;
use crate::{BirthmarkError, BirthmarkResult};

pub use archive::{extract_archive, is_zip_archive, ExtractedArchive};

/// Version name for listings placed directly under a project directory.
pub const DEFAULT_VERSION: &str = "default";

/// A discovered listing, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareEntry {
    pub project: String,
    pub version: String,
    /// Path relative to the project directory, `/`-separated.
    pub relative_path: String,
    pub path: PathBuf,
}

impl FirmwareEntry {
    pub fn load(&self) -> BirthmarkResult<FirmwareSource> {
        Ok(FirmwareSource {
            project: self.project.clone(),
            version: self.version.clone(),
            relative_path: self.relative_path.clone(),
            path: self.path.clone(),
            contents: read_listing(&self.path)?,
        })
    }
}

/// A listing together with its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareSource {
    pub project: String,
    pub version: String,
    pub relative_path: String,
    pub path: PathBuf,
    pub contents: String,
}

/// Read a listing, decoding non-UTF-8 bytes lossily.
pub fn read_listing(path: &Path) -> BirthmarkResult<String> {
    if !path.is_file() {
        return Err(BirthmarkError::input_not_found(path, "firmware listing does not exist"));
    }
    let bytes = fs::read(path).map_err(|source| BirthmarkError::io(path, source))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Where the corpus lives. Archives are extracted on open and cleaned up on drop.
#[derive(Debug)]
pub enum CorpusSource {
    Directory(PathBuf),
    Archive { archive: PathBuf, extracted: ExtractedArchive },
}

impl CorpusSource {
    pub fn open(path: &Path) -> BirthmarkResult<Self> {
        if path.is_dir() {
            return Ok(CorpusSource::Directory(path.to_path_buf()));
        }
        if is_zip_archive(path) {
            let extracted = extract_archive(path)?;
            return Ok(CorpusSource::Archive { archive: path.to_path_buf(), extracted });
        }
        if path.exists() {
            Err(BirthmarkError::input_not_found(path, "expected a directory or a .zip archive"))
        } else {
            Err(BirthmarkError::input_not_found(path, "corpus root does not exist"))
        }
    }

    /// Directory holding the project directories.
    pub fn root(&self) -> &Path {
        match self {
            CorpusSource::Directory(root) => root,
            CorpusSource::Archive { extracted, .. } => extracted.root(),
        }
    }

    /// The path the user supplied.
    pub fn origin(&self) -> &Path {
        match self {
            CorpusSource::Directory(root) => root,
            CorpusSource::Archive { archive, .. } => archive,
        }
    }

    /// List every listing, sorted by project, version, then path.
    pub fn discover(&self, config: &ClassifierConfig) -> BirthmarkResult<Vec<FirmwareEntry>> {
        let root = self.root();
        let mut entries = Vec::new();

        for project_dir in sorted_subdirs(root)? {
            let project = file_name_string(&project_dir);
            for item in WalkDir::new(&project_dir).min_depth(1).sort_by_file_name() {
                let item = item.map_err(|e| {
                    let path = e.path().unwrap_or(project_dir.as_path()).to_path_buf();
                    BirthmarkError::io(path, std::io::Error::other(e.to_string()))
                })?;
                if !item.file_type().is_file() || !config.matches_extension(item.path()) {
                    continue;
                }
                let Ok(relative) = item.path().strip_prefix(&project_dir) else {
                    continue;
                };
                let components: Vec<String> = relative
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect();
                let version = if components.len() > 1 {
                    components[0].clone()
                } else {
                    DEFAULT_VERSION.to_string()
                };
                entries.push(FirmwareEntry {
                    project: project.clone(),
                    version,
                    relative_path: components.join("/"),
                    path: item.path().to_path_buf(),
                });
            }
        }

        entries.sort_by(|a, b| {
            (&a.project, &a.version, &a.relative_path).cmp(&(
                &b.project,
                &b.version,
                &b.relative_path,
            ))
        });
        debug!(root = %root.display(), listings = entries.len(), "discovered corpus listings");
        Ok(entries)
    }
}

fn sorted_subdirs(dir: &Path) -> BirthmarkResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| BirthmarkError::io(dir, source))? {
        let entry = entry.map_err(|source| BirthmarkError::io(dir, source))?;
        let path = entry.path();
        let name = file_name_string(&path);
        if path.is_dir() && !name.starts_with('.') && name != "__MACOSX" {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn file_name_string(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
