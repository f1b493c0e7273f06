//! Project table of contents built from the repositories root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gitdocs_fs::{FileFilter, ScanError, list_files};
use gitdocs_renderer::MarkdownRenderer;
use gitdocs_vcs::VersionControlProbe;
use serde::Serialize;

/// Markdown files, excluding anything under `.git`.
const MARKDOWN_PATTERN: &str = r"\.md$";
const GIT_DIR_PATTERN: &str = r"\.git$";

/// Navigable reference to a page or a heading anchor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Display text.
    pub text: String,
    /// Page path (`/project/page.md`) or anchor (`#slug`).
    pub href: String,
}

/// Table of contents entry for one project directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectToc {
    /// Directory name under the repositories root.
    pub name: String,
    /// Canonical project path, `/name`.
    pub href: String,
    /// Markdown pages other than the project README.
    pub pages: Vec<Link>,
    /// `latest` followed by git tags in descending order; empty outside git.
    pub tags: Vec<String>,
    /// Tag at HEAD, `latest`, or empty outside git.
    pub current_tag: String,
}

/// Error building the project index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Repositories root cannot be listed.
    #[error("Failed to list repositories in {}: {source}", path.display())]
    ReadRoot {
        /// Repositories root.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Page filter could not be compiled.
    #[error(transparent)]
    Filter(#[from] ScanError),
}

/// Build the table of contents for every directory directly under `repos_root`.
///
/// Entries follow directory enumeration order. A project whose files cannot
/// be scanned is kept with no pages.
///
/// # Errors
///
/// Returns [`IndexError::ReadRoot`] if `repos_root` cannot be listed.
pub fn build_index(
    repos_root: &Path,
    probe: &dyn VersionControlProbe,
) -> Result<Vec<ProjectToc>, IndexError> {
    let read_root = |source| IndexError::ReadRoot {
        path: repos_root.to_path_buf(),
        source,
    };

    let filter = FileFilter::new(MARKDOWN_PATTERN, GIT_DIR_PATTERN)?;
    let mut renderer = MarkdownRenderer::new();
    let mut projects = Vec::new();

    for entry in fs::read_dir(repos_root).map_err(read_root)? {
        let entry = entry.map_err(read_root)?;
        let project_dir = entry.path();
        if !project_dir.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let pages = match list_files(&project_dir, &filter) {
            Ok(files) => collect_pages(repos_root, &project_dir, files, &mut renderer),
            Err(e) => {
                tracing::debug!(project = %name, error = %e, "Skipping page scan");
                Vec::new()
            }
        };

        projects.push(ProjectToc {
            href: format!("/{name}"),
            pages,
            tags: probe.tags(&project_dir),
            current_tag: probe.current_tag(&project_dir),
            name,
        });
    }

    Ok(projects)
}

fn collect_pages(
    repos_root: &Path,
    project_dir: &Path,
    files: Vec<PathBuf>,
    renderer: &mut MarkdownRenderer,
) -> Vec<Link> {
    let readme = project_dir.join("README.md");
    files
        .into_iter()
        .filter(|file| *file != readme)
        .map(|file| Link {
            text: page_title(&file, renderer),
            href: href_for(repos_root, &file),
        })
        .collect()
}

/// First H1 of the page, or its file name if it has none or cannot be read.
fn page_title(path: &Path, renderer: &mut MarkdownRenderer) -> String {
    let title = fs::read(path)
        .ok()
        .and_then(|bytes| renderer.render_bytes(&bytes).ok())
        .and_then(|result| result.extract_title().ok().map(str::to_owned));

    title.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    })
}

/// URL path of `file` relative to the repositories root.
pub(crate) fn href_for(repos_root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(repos_root).unwrap_or(file);
    let mut href = String::new();
    for component in relative.components() {
        href.push('/');
        href.push_str(&component.as_os_str().to_string_lossy());
    }
    href
}
