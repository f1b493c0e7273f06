//! Git metadata probing for gitdocs.
//!
//! This crate provides the [`VersionControlProbe`] capability trait that the
//! project indexer and the mutation endpoints depend on, so that the backing
//! implementation can be swapped without touching them:
//!
//! - [`GitCli`]: shells out to an external `git` executable
//! - [`MockProbe`]: in-memory probe for tests (behind the `mock` feature)
//!
//! Read probes never fail: a directory that is not a git working copy, or a
//! failing `git` invocation, degrades to an empty string, an empty tag list or
//! the [`LATEST`] sentinel. The only propagated error is
//! [`VersionControlProbe::latest_commit`], used to compute checkout targets.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use gitdocs_vcs::{GitCli, VersionControlProbe};
//!
//! let git = GitCli::new();
//! let project = Path::new("repos/handbook");
//! if git.exists(project) {
//!     println!("{} @ {}", git.current_branch(project), git.current_tag(project));
//! }
//! ```

mod git;
#[cfg(feature = "mock")]
mod mock;
mod probe;

pub use git::GitCli;
#[cfg(feature = "mock")]
pub use mock::{MockCall, MockProbe, MockRepo};
pub use probe::{LATEST, VcsError, VersionControlProbe, sort_tags};
