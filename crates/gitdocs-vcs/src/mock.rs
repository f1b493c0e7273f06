//! In-memory probe for tests.
//!
//! Enabled with the `mock` feature. Repositories are registered by directory
//! path; any other directory behaves like a plain (non-git) directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::probe::{LATEST, VcsError, VersionControlProbe, sort_tags};

/// State of a fake repository.
#[derive(Debug, Clone, Default)]
pub struct MockRepo {
    /// Current branch (empty for detached HEAD).
    pub branch: String,
    /// Tags in any order.
    pub tags: Vec<String>,
    /// Tag pointing at HEAD, if any.
    pub head_tag: Option<String>,
    /// Latest commit hash; `None` simulates a repository without commits.
    pub latest_commit: Option<String>,
}

/// Mutating call recorded by [`MockProbe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `checkout` invoked with the resolved target.
    Checkout {
        /// Project directory.
        project: PathBuf,
        /// Commit, branch or tag passed to checkout.
        target: String,
    },
    /// `pull` invoked.
    Pull(PathBuf),
    /// `submodule_update_recursive` invoked.
    SubmoduleUpdate(PathBuf),
}

/// Fake [`VersionControlProbe`] with recorded mutations.
#[derive(Debug, Default)]
pub struct MockProbe {
    repos: RwLock<HashMap<PathBuf, MockRepo>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockProbe {
    /// Create a probe with no repositories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository at `project`.
    #[must_use]
    pub fn with_repo(self, project: impl Into<PathBuf>, repo: MockRepo) -> Self {
        self.repos.write().unwrap().insert(project.into(), repo);
        self
    }

    /// Mutating calls recorded so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    fn repo(&self, project: &Path) -> Option<MockRepo> {
        self.repos.read().unwrap().get(project).cloned()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl VersionControlProbe for MockProbe {
    fn exists(&self, project: &Path) -> bool {
        self.repos.read().unwrap().contains_key(project)
    }

    fn current_branch(&self, project: &Path) -> String {
        self.repo(project).map(|r| r.branch).unwrap_or_default()
    }

    fn tags(&self, project: &Path) -> Vec<String> {
        self.repo(project)
            .map(|r| sort_tags(r.tags))
            .unwrap_or_default()
    }

    fn current_tag(&self, project: &Path) -> String {
        match self.repo(project) {
            Some(repo) => repo.head_tag.unwrap_or_else(|| LATEST.to_owned()),
            None => String::new(),
        }
    }

    fn latest_commit(&self, project: &Path) -> Result<String, VcsError> {
        let repo = self
            .repo(project)
            .ok_or_else(|| VcsError::NotARepository(project.to_path_buf()))?;
        repo.latest_commit
            .ok_or_else(|| VcsError::NoCommits(project.to_path_buf()))
    }

    fn checkout(&self, project: &Path, target: &str) {
        self.record(MockCall::Checkout {
            project: project.to_path_buf(),
            target: target.to_owned(),
        });
        if let Some(repo) = self.repos.write().unwrap().get_mut(project) {
            repo.head_tag = repo.tags.iter().find(|t| *t == target).cloned();
        }
    }

    fn pull(&self, project: &Path) {
        self.record(MockCall::Pull(project.to_path_buf()));
    }

    fn submodule_update_recursive(&self, workspace: &Path) {
        self.record(MockCall::SubmoduleUpdate(workspace.to_path_buf()));
    }
}
