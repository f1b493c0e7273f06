//! Git mutation endpoints.
//!
//! Each mutation runs the git command, rebuilds the project index and then
//! redirects, so the next request observes the new index.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Redirect;

use crate::error::ServerError;
use crate::handlers::run_blocking;
use crate::state::AppState;
use crate::template::path_segment;

/// Handle GET /git/checkout/{project}/{commit}.
///
/// `latest` checks out the most recent commit.
pub(crate) async fn checkout(
    State(state): State<Arc<AppState>>,
    Path((project, commit)): Path<(String, String)>,
) -> Result<Redirect, ServerError> {
    let site = Arc::clone(&state.site);
    let name = project.clone();
    run_blocking(move || site.checkout(&name, &commit)).await?;
    Ok(redirect_to_project(&project))
}

/// Handle GET /git/pull/{project}.
pub(crate) async fn pull(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
) -> Result<Redirect, ServerError> {
    let site = Arc::clone(&state.site);
    let name = project.clone();
    run_blocking(move || site.pull(&name)).await?;
    Ok(redirect_to_project(&project))
}

/// Handle GET /git/submodule/update.
pub(crate) async fn update_submodules(
    State(state): State<Arc<AppState>>,
) -> Result<Redirect, ServerError> {
    let site = Arc::clone(&state.site);
    run_blocking(move || site.update_submodules()).await?;
    Ok(Redirect::to("/"))
}

fn redirect_to_project(project: &str) -> Redirect {
    Redirect::to(&format!("/{}", path_segment(project)))
}
