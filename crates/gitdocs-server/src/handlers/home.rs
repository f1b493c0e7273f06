//! Home and error pages.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use gitdocs_renderer::escape_html;
use gitdocs_site::error_markdown;
use serde::Deserialize;

use crate::error::ServerError;
use crate::handlers::{markdown_page, run_blocking};
use crate::state::AppState;

/// Fallback message of `/error` without a message.
const UNKNOWN_ERROR: &str = "unknown error";

/// Query parameters of GET /error.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorQuery {
    message: Option<String>,
}

/// Handle GET /.
pub(crate) async fn get_home(State(state): State<Arc<AppState>>) -> Result<Response, ServerError> {
    let readme_path = state.readme_path.clone();
    let markdown = run_blocking(move || home_markdown(&readme_path)).await?;
    markdown_page(state, "/".to_owned(), markdown, StatusCode::OK).await
}

/// Handle GET /error?message=.
pub(crate) async fn get_error(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ErrorQuery>,
) -> Result<Response, ServerError> {
    let message = query
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
    let markdown = error_markdown("Error", &escape_html(&message));
    markdown_page(state, "/error".to_owned(), markdown, StatusCode::OK).await
}

/// Home page markdown: the readme, or a bare index heading.
fn home_markdown(readme_path: &Path) -> String {
    if !readme_path.exists() {
        return "# Index".to_owned();
    }
    match std::fs::read_to_string(readme_path) {
        Ok(markdown) => markdown,
        Err(e) => {
            tracing::warn!(path = %readme_path.display(), error = %e, "Failed to read home page");
            error_markdown("Index", &e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_home_markdown_reads_readme() {
        let temp_dir = tempfile::tempdir().unwrap();
        let readme = temp_dir.path().join("README.md");
        std::fs::write(&readme, "# Welcome").unwrap();

        assert_eq!(home_markdown(&readme), "# Welcome");
    }

    #[test]
    fn test_home_markdown_missing_readme() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(home_markdown(&temp_dir.path().join("README.md")), "# Index");
    }

    #[test]
    fn test_home_markdown_unreadable_readme() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file
        let markdown = home_markdown(temp_dir.path());
        assert!(markdown.starts_with("# Index\n> "));
    }
}
