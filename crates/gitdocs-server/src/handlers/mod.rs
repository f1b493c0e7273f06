//! HTTP request handlers.

pub(crate) mod api;
pub(crate) mod git;
pub(crate) mod home;
pub(crate) mod projects;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use gitdocs_site::{PageRender, PageSource};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::ServerError;
use crate::state::AppState;
use crate::template::{self, PageData};

/// Run blocking filesystem or git work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ServerError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await?)
}

/// Render literal markdown as a full page.
///
/// `path` is the decoded request path, used to highlight the current project.
pub(crate) async fn markdown_page(
    state: Arc<AppState>,
    path: String,
    markdown: String,
    status: StatusCode,
) -> Result<Response, ServerError> {
    let html = run_blocking(move || {
        state
            .site
            .render_page_or_error(PageSource::Markdown(&markdown))
            .map(|page| page_html(&state, &page, &path, None))
    })
    .await?;

    // Literal markdown never hits the filesystem, so a page is always produced
    Ok((status, Html(html.unwrap_or_default())).into_response())
}

/// Render a markdown file under the repositories root as a full page.
///
/// Returns `None` if the file does not exist. `raw_path` is the request path
/// as sent by the client and becomes the base of the download link.
pub(crate) async fn file_page(
    state: Arc<AppState>,
    path: String,
    raw_path: String,
) -> Result<Option<Response>, ServerError> {
    let html = run_blocking(move || {
        state
            .site
            .render_page_or_error(PageSource::File(&path))
            .map(|page| {
                let download = download_link(&raw_path, &page.title);
                page_html(&state, &page, &path, Some(&download))
            })
    })
    .await?;

    Ok(html.map(|html| Html(html).into_response()))
}

/// Wrap a rendered page in the site template.
fn page_html(
    state: &AppState,
    page: &PageRender,
    path: &str,
    download_link: Option<&str>,
) -> String {
    let index = state.site.projects();
    let project = current_project(path);
    let branch = if index.get(project).is_some() {
        state.site.current_branch(project)
    } else {
        String::new()
    };

    template::render_page(&PageData {
        branding: &state.branding,
        title: &page.title,
        html_content: &page.html,
        headings: &page.headings,
        projects: index.projects(),
        current_href: path,
        current_project: project,
        current_branch: &branch,
        version: &state.version,
        download_link,
    })
}

/// First segment of a request path.
fn current_project(path: &str) -> &str {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
}

/// `<path>?download=<title>.md`
fn download_link(raw_path: &str, title: &str) -> String {
    format!(
        "{raw_path}?download={}.md",
        utf8_percent_encode(title, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_project() {
        assert_eq!(current_project("/docs/guide.md"), "docs");
        assert_eq!(current_project("/docs"), "docs");
        assert_eq!(current_project("/"), "");
        assert_eq!(current_project(""), "");
    }

    #[test]
    fn test_download_link() {
        assert_eq!(
            download_link("/docs/guide.md", "Guide"),
            "/docs/guide.md?download=Guide.md"
        );
        assert_eq!(
            download_link("/my%20docs/a.md", "Setup & Run"),
            "/my%20docs/a.md?download=Setup%20%26%20Run.md"
        );
    }
}
