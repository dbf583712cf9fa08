//! Companion file discovery
//!
//! Lists the files sitting directly in a record's folder. Unlike a recursive
//! media scan, any failure is returned: a folder that can't be listed can't be
//! composed.

use crate::config::FolderConfig;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source of the files in a folder
pub trait FileDiscovery {
    /// Files directly inside `directory`, in a stable order
    fn discover(&self, directory: &Path) -> Result<Vec<PathBuf>>;
}

/// [`FileDiscovery`] over the real file system
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    ignore_patterns: Vec<String>,
}

impl DirectoryScanner {
    pub fn new(ignore_patterns: Vec<String>) -> Self {
        Self { ignore_patterns }
    }

    pub fn from_config(config: &FolderConfig) -> Self {
        Self::new(config.ignore_patterns.clone())
    }

    /// `name.ext` files only; hidden files and ignored names are skipped
    fn is_candidate(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') || !file_name.contains('.') {
            return false;
        }
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| file_name.contains(pattern.as_str()))
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::from_config(&FolderConfig::default())
    }
}

impl FileDiscovery for DirectoryScanner {
    fn discover(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        if !directory.is_dir() {
            return Err(Error::Scan {
                path: directory.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| Error::Scan {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| directory.to_path_buf()),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if self.is_candidate(&entry.file_name().to_string_lossy()) {
                files.push(entry.into_path());
            }
        }

        tracing::debug!(
            directory = %directory.display(),
            files = files.len(),
            "Discovered folder files"
        );
        Ok(files)
    }
}
