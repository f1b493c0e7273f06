//! Filesystem scanning for gitdocs.
//!
//! Provides [`list_files`] for recursively discovering files under a directory,
//! filtered by a [`FileFilter`] built from include/exclude regular expressions.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use gitdocs_fs::{FileFilter, list_files};
//!
//! let filter = FileFilter::new(r"\.md$", r"\.git$")?;
//! for path in list_files(Path::new("repos/handbook"), &filter)? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), gitdocs_fs::ScanError>(())
//! ```

mod scanner;

pub use scanner::{FileFilter, ScanError, list_files};
