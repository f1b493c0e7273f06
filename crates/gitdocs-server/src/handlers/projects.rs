//! Project pages, raw files and markdown downloads.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Redirect, Response};
use gitdocs_renderer::escape_html;
use gitdocs_site::{MarkdownDownload, error_markdown};
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::ServerError;
use crate::handlers::{file_page, markdown_page, run_blocking};
use crate::state::AppState;
use crate::template::path_segment;

/// Query parameters of project file requests.
#[derive(Debug, Deserialize)]
pub(crate) struct FileQuery {
    /// Attachment name; a non-empty value turns a markdown page into a download.
    download: Option<String>,
}

/// Handle GET /{project} and GET /{project}/.
pub(crate) async fn redirect_to_readme(Path(project): Path<String>) -> Redirect {
    Redirect::to(&format!("/{}/README.md", path_segment(&project)))
}

/// Handle GET /{project}/{*path}.
///
/// Markdown files are rendered (or downloaded with `?download=`), other files
/// are served as-is. A missing `README.md` gets a placeholder page.
pub(crate) async fn get_project_file(
    State(state): State<Arc<AppState>>,
    Path((project, path)): Path<(String, String)>,
    Query(query): Query<FileQuery>,
    request: Request,
) -> Result<Response, ServerError> {
    let request_path = format!("/{project}/{path}");
    let Some(file) = state.site.resolve_file(&request_path) else {
        return missing_file(state, &project, &path, request_path).await;
    };

    if !is_markdown(&path) {
        let Ok(response) = ServeFile::new(file).oneshot(request).await;
        return Ok(response.map(Body::new));
    }

    if let Some(name) = query.download.filter(|name| !name.is_empty()) {
        let site = Arc::clone(&state.site);
        let download =
            run_blocking(move || site.download_markdown(&project, &path, &name)).await??;
        return attachment(download);
    }

    let raw_path = request.uri().path().to_owned();
    match file_page(Arc::clone(&state), request_path.clone(), raw_path).await? {
        Some(response) => Ok(response),
        // Removed between lookup and render
        None => missing_file(state, &project, &path, request_path).await,
    }
}

/// Fallback for unmatched routes.
pub(crate) async fn not_found(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ServerError> {
    let path = percent_decode_str(uri.path()).decode_utf8_lossy().into_owned();
    not_found_page(state, path).await
}

async fn missing_file(
    state: Arc<AppState>,
    project: &str,
    path: &str,
    request_path: String,
) -> Result<Response, ServerError> {
    if path == "README.md" {
        let markdown = error_markdown(
            &escape_html(project),
            "README.md does not exist for this project!",
        );
        return markdown_page(state, request_path, markdown, StatusCode::OK).await;
    }
    not_found_page(state, request_path).await
}

async fn not_found_page(state: Arc<AppState>, path: String) -> Result<Response, ServerError> {
    let markdown = format!("# 404 Not Found\n\n{}", shown_path(&path));
    markdown_page(state, path, markdown, StatusCode::NOT_FOUND).await
}

/// Request path as a raw HTML block, so markdown in the path stays inert.
fn shown_path(path: &str) -> String {
    let escaped = escape_html(path).replace(['\r', '\n'], " ");
    format!("<p><code>{escaped}</code></p>")
}

fn is_markdown(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".md")
}

/// Markdown download response.
fn attachment(download: MarkdownDownload) -> Result<Response, ServerError> {
    let disposition = HeaderValue::try_from(content_disposition(&download.file_name))?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/markdown; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.body,
    )
        .into_response())
}

/// `Content-Disposition` value, with an RFC 5987 name for non-ASCII file names.
fn content_disposition(file_name: &str) -> String {
    let plain = file_name
        .chars()
        .all(|c| (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ');
    if plain {
        format!("attachment; filename=\"{file_name}\"")
    } else {
        format!(
            "attachment; filename*=UTF-8''{}",
            utf8_percent_encode(file_name, NON_ALPHANUMERIC)
        )
    }
}
