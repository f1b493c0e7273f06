//! Probe trait and error types.

use std::path::{Path, PathBuf};

/// Sentinel tag meaning "no exact tag at HEAD" or "the most recent commit".
pub const LATEST: &str = "latest";

/// Error returned by version control operations.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// Directory has no `.git` entry.
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),
    /// Repository exists but has no commits on any branch.
    #[error("No commits in repository: {}", .0.display())]
    NoCommits(PathBuf),
    /// The git executable could not be started.
    #[error("Failed to run git: {0}")]
    Spawn(#[source] std::io::Error),
    /// The git executable exited with a non-zero status.
    #[error("git {args} failed: {stderr}")]
    CommandFailed {
        /// Space-joined arguments of the failed invocation.
        args: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Read-only and mutating version control operations scoped to a project directory.
///
/// All operations are synchronous and may block on an external process.
pub trait VersionControlProbe: Send + Sync {
    /// Whether a `.git` entry is present directly under `project`.
    fn exists(&self, project: &Path) -> bool;

    /// Current branch name, or an empty string when unknown (detached HEAD,
    /// no commits, not a repository, tool failure).
    fn current_branch(&self, project: &Path) -> String;

    /// [`LATEST`] followed by all tags in descending lexicographic order.
    ///
    /// Empty when `project` is not a repository.
    fn tags(&self, project: &Path) -> Vec<String>;

    /// Tag exactly matching HEAD, [`LATEST`] if there is none, or an empty
    /// string when `project` is not a repository.
    fn current_tag(&self, project: &Path) -> String;

    /// Hash of the most recent commit across all branches.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::NotARepository`] when `project` has no `.git` entry,
    /// and a tool or [`VcsError::NoCommits`] error when no commit can be resolved.
    fn latest_commit(&self, project: &Path) -> Result<String, VcsError>;

    /// Check out `target` (commit, branch or tag). Best effort: failures are
    /// logged and otherwise ignored.
    fn checkout(&self, project: &Path, target: &str);

    /// Pull the current branch. Best effort.
    fn pull(&self, project: &Path);

    /// Run a recursive remote submodule update in `workspace`. Best effort.
    fn submodule_update_recursive(&self, workspace: &Path);

    /// Resolve `reference` and check it out.
    ///
    /// [`LATEST`] is resolved through [`latest_commit`](Self::latest_commit).
    /// Returns the checked-out target, or `None` when resolution failed and
    /// nothing was invoked.
    fn checkout_ref(&self, project: &Path, reference: &str) -> Option<String> {
        let target = if reference == LATEST {
            match self.latest_commit(project) {
                Ok(commit) => commit,
                Err(e) => {
                    tracing::debug!(project = %project.display(), error = %e, "Cannot resolve latest commit");
                    return None;
                }
            }
        } else {
            reference.to_owned()
        };

        self.checkout(project, &target);
        Some(target)
    }
}

/// Prepend [`LATEST`] to `tags` sorted in descending string order.
///
/// Ordering is lexicographic, not semantic: `v9` sorts above `v10`.
///
/// ```
/// use gitdocs_vcs::sort_tags;
///
/// let tags = sort_tags(vec!["v1".into(), "v10".into(), "v2".into()]);
/// assert_eq!(tags, ["latest", "v2", "v10", "v1"]);
/// ```
#[must_use]
pub fn sort_tags(mut tags: Vec<String>) -> Vec<String> {
    tags.sort_unstable_by(|a, b| b.cmp(a));
    let mut sorted = Vec::with_capacity(tags.len() + 1);
    sorted.push(LATEST.to_owned());
    sorted.extend(tags);
    sorted
}
