//! Error types for the HTTP server.
//!
//! Errors are shown to the user as a regular page titled with the status code
//! and reason, e.g. `500 Internal Server Error`.

use axum::http::StatusCode;
use axum::http::header::InvalidHeaderValue;
use axum::response::{Html, IntoResponse, Response};
use gitdocs_renderer::{MarkdownRenderer, escape_html};
use gitdocs_site::{PageError, error_markdown};
use tokio::task::JoinError;

use crate::state::Branding;
use crate::template::{self, PageData};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Page lookup or read failed.
    #[error(transparent)]
    Page(#[from] PageError),

    /// Response header could not be built.
    #[error("Invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// Blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] JoinError),
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Page(PageError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Page(_) | Self::Header(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Html(status_page(status, &self.to_string()))).into_response()
    }
}

/// Standalone page for a status code, without project navigation.
fn status_page(status: StatusCode, message: &str) -> String {
    let heading = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let markdown = error_markdown(&heading, &escape_html(message));
    let result = MarkdownRenderer::new().render_markdown(&markdown);

    template::render_page(&PageData {
        branding: &Branding::default(),
        title: &heading,
        html_content: &result.html,
        headings: &[],
        projects: &[],
        current_href: "",
        current_project: "",
        current_branch: "",
        version: "",
        download_link: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let error = ServerError::from(PageError::NotFound("/docs/x.md".to_owned()));
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_io_error_status() {
        let error = ServerError::from(PageError::Io {
            path: "/repos/docs/x.md".into(),
            source: std::io::Error::other("disk on fire"),
        });
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_page_content() {
        let html = status_page(StatusCode::NOT_FOUND, "Page not found: <x>");

        assert!(html.contains("<title>404 Not Found</title>"));
        assert!(html.contains("<h1 id=\"404-not-found\">404 Not Found</h1>"));
        assert!(html.contains("Page not found: &lt;x&gt;"));
        assert!(!html.contains("<x>"));
    }
}
