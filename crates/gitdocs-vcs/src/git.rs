//! [`VersionControlProbe`] backed by the `git` executable.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::probe::{LATEST, VcsError, VersionControlProbe, sort_tags};

/// Probe that shells out to an external `git` binary.
///
/// Every invocation runs with the project directory as its working directory
/// and with terminal prompts disabled, so a pull against a remote that needs
/// credentials fails instead of blocking the request.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl GitCli {
    /// Create a probe using `git` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Create a probe using a specific git executable.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git in `dir` and return trimmed stdout.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, VcsError> {
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(VcsError::Spawn)?;

        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    /// Run a mutating command, logging the outcome and discarding it.
    fn run_best_effort(&self, dir: &Path, args: &[&str]) {
        match self.run(dir, args) {
            Ok(_) => {
                tracing::info!(dir = %dir.display(), args = %args.join(" "), "git command completed");
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "git command failed");
            }
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControlProbe for GitCli {
    fn exists(&self, project: &Path) -> bool {
        project.join(".git").exists()
    }

    fn current_branch(&self, project: &Path) -> String {
        if !self.exists(project) {
            return String::new();
        }
        self.run(project, &["branch", "--show-current"])
            .unwrap_or_else(|e| {
                tracing::debug!(project = %project.display(), error = %e, "Branch probe failed");
                String::new()
            })
    }

    fn tags(&self, project: &Path) -> Vec<String> {
        if !self.exists(project) {
            return Vec::new();
        }
        let out = self.run(project, &["tag"]).unwrap_or_else(|e| {
            tracing::debug!(project = %project.display(), error = %e, "Tag listing failed");
            String::new()
        });
        sort_tags(out.split_whitespace().map(str::to_owned).collect())
    }

    fn current_tag(&self, project: &Path) -> String {
        if !self.exists(project) {
            return String::new();
        }
        match self.run(project, &["describe", "--exact-match", "--tags"]) {
            Ok(tag) if !tag.is_empty() => tag,
            _ => LATEST.to_owned(),
        }
    }

    fn latest_commit(&self, project: &Path) -> Result<String, VcsError> {
        if !self.exists(project) {
            return Err(VcsError::NotARepository(project.to_path_buf()));
        }
        let hash = self.run(project, &["log", "--branches", "-1", "--pretty=format:%H"])?;
        if hash.is_empty() {
            return Err(VcsError::NoCommits(project.to_path_buf()));
        }
        Ok(hash)
    }

    fn checkout(&self, project: &Path, target: &str) {
        // A directory without .git would make git act on an enclosing repository.
        if !self.exists(project) {
            tracing::debug!(project = %project.display(), "Skipping checkout outside a repository");
            return;
        }
        if target.is_empty() || target.starts_with('-') {
            tracing::warn!(project = %project.display(), checkout_target = target, "Refusing checkout target");
            return;
        }
        self.run_best_effort(project, &["checkout", target]);
    }

    fn pull(&self, project: &Path) {
        if !self.exists(project) {
            tracing::debug!(project = %project.display(), "Skipping pull outside a repository");
            return;
        }
        self.run_best_effort(project, &["pull"]);
    }

    fn submodule_update_recursive(&self, workspace: &Path) {
        self.run_best_effort(workspace, &["submodule", "update", "--recursive", "--remote"]);
    }
}
