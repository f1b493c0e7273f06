//! Recursive file discovery with regex filtering.
//!
//! The scanner walks a directory tree depth-first in directory-entry
//! enumeration order. Results are not sorted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

/// Error returned when scanning fails.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Include or exclude pattern is not a valid regular expression.
    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
    /// A directory could not be read.
    #[error("Cannot read directory {}: {source}", path.display())]
    ReadDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Include/exclude rules applied to every visited path.
///
/// Patterns are matched against the full joined path (root included), so an
/// exclude pattern of `\.git$` prunes any entry named `.git` at any depth.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl FileFilter {
    /// Build a filter from include and exclude patterns.
    ///
    /// An empty pattern disables that rule.
    pub fn new(include: &str, exclude: &str) -> Result<Self, ScanError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Filter that accepts every file.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.exclude.as_ref().is_some_and(|re| re.is_match(path))
    }

    fn is_included(&self, path: &str) -> bool {
        self.include.as_ref().is_none_or(|re| re.is_match(path))
    }
}

fn compile(pattern: &str) -> Result<Option<Regex>, ScanError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|source| ScanError::Pattern {
            pattern: pattern.to_owned(),
            source,
        })
}

/// Recursively list files under `root` that pass `filter`.
///
/// - Excluded paths are pruned; an excluded directory is never descended into.
/// - Only files are tested against the include pattern; directories are always
///   expanded unless excluded.
/// - Symlinks are not followed into directories.
///
/// # Errors
///
/// Any unreadable directory aborts the whole listing with
/// [`ScanError::ReadDir`]; no partial list is returned.
pub fn list_files(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    visit_dir(root, filter, &mut files)?;
    Ok(files)
}

fn visit_dir(dir: &Path, filter: &FileFilter, files: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    let read_err = |source| ScanError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        let path_str = path.to_string_lossy();

        if filter.is_excluded(&path_str) {
            continue;
        }

        let is_dir = entry.file_type().map_err(read_err)?.is_dir();
        if is_dir {
            visit_dir(&path, filter, files)?;
        } else if filter.is_included(&path_str) {
            files.push(path);
        }
    }

    Ok(())
}
