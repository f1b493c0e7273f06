//! Process-wide project index holder and git mutations.
//!
//! # Thread Safety
//!
//! `Site` is designed for concurrent access:
//! - `projects()` returns `Arc<ProjectIndex>` with minimal locking (just Arc clone)
//! - `reload()` builds a new index outside the snapshot lock and publishes it
//!   by replacing the `Arc`, so readers see either the old or the new index
//! - reloads are serialized by a mutex
//! - checkout and pull hold a per-project lock, submodule update a
//!   workspace-wide lock, until the following reload has been published

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use gitdocs_vcs::VersionControlProbe;
use serde::Serialize;

use crate::page::{self, MarkdownDownload, PageError, PageRender, PageSource};
use crate::project::{ProjectToc, build_index};

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Configuration for [`Site`].
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Directory containing one subdirectory per project.
    pub repos_dir: PathBuf,
    /// Directory in which submodule updates run.
    pub workspace_dir: PathBuf,
}

/// Immutable snapshot of all project entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProjectIndex {
    projects: Vec<ProjectToc>,
}

impl ProjectIndex {
    /// Create an index from entries.
    #[must_use]
    pub fn new(projects: Vec<ProjectToc>) -> Self {
        Self { projects }
    }

    /// Entries in directory enumeration order.
    #[must_use]
    pub fn projects(&self) -> &[ProjectToc] {
        &self.projects
    }

    /// Find a project by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProjectToc> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Number of projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether no project was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Documentation site over a repositories root.
pub struct Site {
    config: SiteConfig,
    probe: Arc<dyn VersionControlProbe>,
    /// Mutex for serializing reload operations.
    reload_lock: Mutex<()>,
    /// Current index snapshot (atomically swappable).
    current: RwLock<Arc<ProjectIndex>>,
    /// Advisory locks for git mutations, keyed by project name.
    project_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Lock for mutations spanning the whole workspace.
    workspace_lock: Mutex<()>,
}

impl Site {
    /// Create a site with an empty index. Call [`reload`](Self::reload) to
    /// build the first snapshot.
    #[must_use]
    pub fn new(config: SiteConfig, probe: Arc<dyn VersionControlProbe>) -> Self {
        Self {
            config,
            probe,
            reload_lock: Mutex::new(()),
            current: RwLock::new(Arc::new(ProjectIndex::default())),
            project_locks: Mutex::new(HashMap::new()),
            workspace_lock: Mutex::new(()),
        }
    }

    /// Repositories root.
    #[must_use]
    pub fn repos_dir(&self) -> &Path {
        &self.config.repos_dir
    }

    /// Current index snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn projects(&self) -> Arc<ProjectIndex> {
        self.current.read().unwrap().clone()
    }

    /// Rebuild the index from the filesystem and publish it.
    ///
    /// If the repositories root cannot be listed, an empty index is published.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn reload(&self) -> Arc<ProjectIndex> {
        let start = Instant::now();
        let _guard = self.reload_lock.lock().unwrap();

        let index = match build_index(&self.config.repos_dir, self.probe.as_ref()) {
            Ok(projects) => ProjectIndex::new(projects),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build project index");
                ProjectIndex::default()
            }
        };

        let index = Arc::new(index);
        *self.current.write().unwrap() = Arc::clone(&index);

        tracing::info!(
            project_count = index.len(),
            elapsed_ms = elapsed_ms(start),
            "Project index reloaded"
        );

        index
    }

    /// Check out `reference` in `project` and reload.
    ///
    /// `latest` resolves to the most recent commit; if that fails, nothing is
    /// checked out. An unknown project only reloads.
    pub fn checkout(&self, project: &str, reference: &str) {
        let Some(dir) = self.existing_project_dir(project) else {
            return;
        };
        let lock = self.project_lock(project);
        let _guard = lock.lock().unwrap();

        match self.probe.checkout_ref(&dir, reference) {
            Some(target) => {
                tracing::info!(project, reference, checkout_target = %target, "Checked out");
            }
            None => tracing::info!(project, reference, "Nothing to check out"),
        }
        self.reload();
    }

    /// Pull `project` and reload.
    pub fn pull(&self, project: &str) {
        let Some(dir) = self.existing_project_dir(project) else {
            return;
        };
        let lock = self.project_lock(project);
        let _guard = lock.lock().unwrap();

        self.probe.pull(&dir);
        self.reload();
    }

    /// Update submodules of the workspace recursively and reload.
    ///
    /// # Panics
    ///
    /// Panics if the workspace lock is poisoned.
    pub fn update_submodules(&self) {
        let _guard = self.workspace_lock.lock().unwrap();
        self.probe.submodule_update_recursive(&self.config.workspace_dir);
        self.reload();
    }

    /// Current branch of `project`, empty when unknown.
    #[must_use]
    pub fn current_branch(&self, project: &str) -> String {
        self.project_dir(project)
            .map(|dir| self.probe.current_branch(&dir))
            .unwrap_or_default()
    }

    /// Render a page. See [`page::render_page`].
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the file is missing, unreadable or not text.
    pub fn render_page(&self, source: PageSource<'_>) -> Result<PageRender, PageError> {
        page::render_page(&self.config.repos_dir, source)
    }

    /// Render a page or an error page. `None` means not found.
    #[must_use]
    pub fn render_page_or_error(&self, source: PageSource<'_>) -> Option<PageRender> {
        page::render_page_or_error(&self.config.repos_dir, source)
    }

    /// Existing regular file for a request path.
    #[must_use]
    pub fn resolve_file(&self, request_path: &str) -> Option<PathBuf> {
        page::resolve_request_path(&self.config.repos_dir, request_path)
            .filter(|path| path.is_file())
    }

    /// Raw markdown of a project file with front matter.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if the file is missing or unreadable.
    pub fn download_markdown(
        &self,
        project: &str,
        subpath: &str,
        download_name: &str,
    ) -> Result<MarkdownDownload, PageError> {
        page::download_markdown(&self.config.repos_dir, project, subpath, download_name)
    }

    /// Directory of a project, rejecting names that are not a single path segment.
    fn project_dir(&self, project: &str) -> Option<PathBuf> {
        let valid = !project.is_empty()
            && project != "."
            && project != ".."
            && !project.contains(['/', '\\']);
        if !valid {
            tracing::debug!(project, "Rejecting project name");
            return None;
        }
        Some(self.config.repos_dir.join(project))
    }

    /// Project directory for a mutation. Unknown projects reload without
    /// touching git and never get a lock entry.
    fn existing_project_dir(&self, project: &str) -> Option<PathBuf> {
        let dir = self.project_dir(project)?;
        if dir.is_dir() {
            Some(dir)
        } else {
            tracing::debug!(project, "No such project");
            self.reload();
            None
        }
    }

    fn project_lock(&self, project: &str) -> Arc<Mutex<()>> {
        let mut locks = self.project_locks.lock().unwrap();
        Arc::clone(locks.entry(project.to_owned()).or_default())
    }
}
