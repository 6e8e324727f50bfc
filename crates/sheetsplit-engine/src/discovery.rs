//! Recursive enumeration of source workbooks under an input root.

use camino::{Utf8Path, Utf8PathBuf};
use globset::GlobSet;
use std::fs;
use tracing::{debug, warn};

use sheetsplit_config::{LOCK_FILE_PREFIX, Selectors};
use sheetsplit_utils::error::{ConfigError, DiscoveryError};

/// A workbook found by discovery; consumed once by the ingestor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Full path to the file
    pub path: Utf8PathBuf,
    /// Path relative to the scanned root, `/`-separated
    pub relative_path: String,
    /// File name, recorded in the `SourceFile` column
    pub file_name: String,
    /// Name of the containing folder, recorded in the `SourceFolder` column
    pub folder: String,
}

impl SourceDocument {
    /// Describe a standalone file (merge inputs given on the command line)
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        Self {
            path: path.to_path_buf(),
            relative_path: path.as_str().replace('\\', "/"),
            file_name: path.file_name().unwrap_or(path.as_str()).to_string(),
            folder: containing_folder(path),
        }
    }

    fn scanned(root: &Utf8Path, path: Utf8PathBuf) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map(|rel| rel.components().map(|c| c.as_str()).collect::<Vec<_>>().join("/"))
            .unwrap_or_else(|_| path.as_str().to_string());
        Self {
            file_name: path.file_name().unwrap_or(path.as_str()).to_string(),
            folder: containing_folder(&path),
            relative_path,
            path,
        }
    }
}

fn containing_folder(path: &Utf8Path) -> String {
    path.parent()
        .and_then(Utf8Path::file_name)
        .unwrap_or_default()
        .to_string()
}

/// Selects workbooks under a root with include/exclude globs
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    include: GlobSet,
    exclude: GlobSet,
}

impl DocumentScanner {
    pub fn new(selectors: &Selectors) -> Result<Self, ConfigError> {
        Ok(Self {
            include: selectors.include_set()?,
            exclude: selectors.exclude_set()?,
        })
    }

    /// Enumerate matching workbooks in lexicographic order of relative path.
    ///
    /// An existing root without matches yields an empty list.
    pub fn scan(&self, root: &Utf8Path) -> Result<Vec<SourceDocument>, DiscoveryError> {
        if !root.exists() {
            return Err(DiscoveryError::DirectoryNotFound {
                path: root.to_string(),
            });
        }
        if !root.is_dir() {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_string(),
            });
        }

        let mut documents = Vec::new();
        self.walk_directory(root, root, &mut documents)?;
        documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        debug!(root = %root, count = documents.len(), "scan finished");
        Ok(documents)
    }

    /// Whether a root-relative path names a workbook this scanner accepts
    #[must_use]
    pub fn accepts(&self, relative_path: &str) -> bool {
        let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        if file_name.starts_with(LOCK_FILE_PREFIX) {
            return false;
        }
        self.include.is_match(relative_path) && !self.exclude.is_match(relative_path)
    }

    fn walk_directory(
        &self,
        root: &Utf8Path,
        dir: &Utf8Path,
        documents: &mut Vec<SourceDocument>,
    ) -> Result<(), DiscoveryError> {
        let scan_failed = |e: std::io::Error| DiscoveryError::ScanFailed {
            path: dir.to_string(),
            reason: e.to_string(),
        };

        for entry in fs::read_dir(dir).map_err(scan_failed)? {
            let entry = entry.map_err(scan_failed)?;
            let Ok(path) = Utf8PathBuf::try_from(entry.path()) else {
                warn!(path = %entry.path().display(), "skipping non UTF-8 path");
                continue;
            };
            let file_type = entry.file_type().map_err(scan_failed)?;

            // Symlinked directories are not followed to avoid cycles
            if file_type.is_dir() {
                self.walk_directory(root, &path, documents)?;
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                let document = SourceDocument::scanned(root, path);
                if self.accepts(&document.relative_path) {
                    documents.push(document);
                }
            }
        }

        Ok(())
    }
}
