//! Project index API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use gitdocs_site::ProjectIndex;

use crate::state::AppState;

/// Handle GET /api/projects.
///
/// Returns the current index snapshot as a JSON array of projects.
pub(crate) async fn get_projects(State(state): State<Arc<AppState>>) -> Json<ProjectIndex> {
    let index = state.site.projects();
    Json(ProjectIndex::clone(&index))
}
