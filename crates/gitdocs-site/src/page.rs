//! Page rendering for request paths and synthetic pages.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use gitdocs_renderer::{MarkdownRenderer, RenderError, TocEntry};

use crate::project::Link;

/// Title of a synthetic page without an H1.
pub const UNTITLED: &str = "Untitled";

/// Markdown to render.
#[derive(Clone, Copy, Debug)]
pub enum PageSource<'a> {
    /// Literal markdown for home, error and status pages.
    Markdown(&'a str),
    /// Request path of a file under the repositories root, e.g. `/docs/guide.md`.
    File(&'a str),
}

/// Rendered page ready for the template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRender {
    /// First H1, file name, or [`UNTITLED`].
    pub title: String,
    /// Rendered HTML with heading ids.
    pub html: String,
    /// Short table of contents.
    pub headings: Vec<Link>,
}

/// Error rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Requested file does not exist under the repositories root.
    #[error("Page not found: {0}")]
    NotFound(String),
    /// File exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// File could not be rendered.
    #[error("Failed to render {}: {source}", path.display())]
    Render {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: RenderError,
    },
}

/// Raw markdown prepared for download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownDownload {
    /// Attachment file name.
    pub file_name: String,
    /// Front matter followed by the file contents.
    pub body: Vec<u8>,
}

/// Map a request path onto a path under `repos_root`.
///
/// Returns `None` for paths that would leave the root (`..`) or that contain
/// non-normal components. Existence is not checked.
#[must_use]
pub fn resolve_request_path(repos_root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    let mut resolved = repos_root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Render a page.
///
/// Synthetic markdown is titled [`UNTITLED`] and files by their base name,
/// unless the document has an H1.
///
/// # Errors
///
/// Returns [`PageError::NotFound`] if a file source does not resolve to an
/// existing file, [`PageError::Io`] if it cannot be read and
/// [`PageError::Render`] if it is not valid markdown text.
pub fn render_page(repos_root: &Path, source: PageSource<'_>) -> Result<PageRender, PageError> {
    let mut renderer = MarkdownRenderer::new();

    let (default_title, result) = match source {
        PageSource::Markdown(markdown) => (UNTITLED.to_owned(), renderer.render_markdown(markdown)),
        PageSource::File(request_path) => {
            let path = existing_file(repos_root, request_path)?;
            let bytes = fs::read(&path).map_err(|source| PageError::Io {
                path: path.clone(),
                source,
            })?;
            let result = renderer
                .render_bytes(&bytes)
                .map_err(|source| PageError::Render {
                    path: path.clone(),
                    source,
                })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (file_name, result)
        }
    };

    let title = result
        .extract_title()
        .map_or(default_title, str::to_owned);

    Ok(PageRender {
        title,
        headings: short_toc(&result.headings),
        html: result.html,
    })
}

/// Render a page, turning read and render failures into an error page.
///
/// Returns `None` only when the file does not exist, so that the caller can
/// fall through to its not-found handling.
#[must_use]
pub fn render_page_or_error(repos_root: &Path, source: PageSource<'_>) -> Option<PageRender> {
    match render_page(repos_root, source) {
        Ok(page) => Some(page),
        Err(PageError::NotFound(_)) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Page render failed");
            let markdown = error_markdown("Error", &e.to_string());
            render_page(repos_root, PageSource::Markdown(&markdown)).ok()
        }
    }
}

/// Markdown of an error or status page.
///
/// ```
/// use gitdocs_site::error_markdown;
///
/// assert_eq!(error_markdown("404 Not Found", "`/x`"), "# 404 Not Found\n> `/x`");
/// ```
#[must_use]
pub fn error_markdown(heading: &str, message: &str) -> String {
    format!("# {heading}\n> {message}")
}

/// Headings for the page outline: all H1s, or all H2s when there are fewer
/// than two H1s.
#[must_use]
pub fn short_toc(headings: &[TocEntry]) -> Vec<Link> {
    let h1_count = headings.iter().filter(|h| h.level == 1).count();
    let level = if h1_count < 2 { 2 } else { 1 };
    headings
        .iter()
        .filter(|h| h.level == level)
        .map(|h| Link {
            text: h.title.clone(),
            href: format!("#{}", h.id),
        })
        .collect()
}

/// Read a project markdown file for download, prefixed with front matter
/// naming its project and path.
///
/// # Errors
///
/// Returns [`PageError::NotFound`] if the file does not exist and
/// [`PageError::Io`] if it cannot be read.
pub fn download_markdown(
    repos_root: &Path,
    project: &str,
    subpath: &str,
    download_name: &str,
) -> Result<MarkdownDownload, PageError> {
    let request_path = format!("/{project}/{}", subpath.trim_start_matches('/'));
    let path = existing_file(repos_root, &request_path)?;
    let contents = fs::read(&path).map_err(|source| PageError::Io {
        path: path.clone(),
        source,
    })?;

    let mut body =
        format!("---\nproject: {project:?}\nfile:    {subpath:?}\n---\n\n").into_bytes();
    body.extend_from_slice(&contents);

    Ok(MarkdownDownload {
        file_name: format!("{project}_{}", download_name.replace(' ', "_")),
        body,
    })
}

fn existing_file(repos_root: &Path, request_path: &str) -> Result<PathBuf, PageError> {
    resolve_request_path(repos_root, request_path)
        .filter(|path| path.is_file())
        .ok_or_else(|| PageError::NotFound(request_path.to_owned()))
}
