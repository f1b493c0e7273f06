//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers;
use crate::middleware::security::with_security_headers;
use crate::state::AppState;

/// Routes, fallback page, security headers and request tracing over `state`.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let level = if state.verbose {
        Level::INFO
    } else {
        Level::DEBUG
    };

    let git_routes = Router::new()
        .route("/git/checkout/{project}/{commit}", get(handlers::git::checkout))
        .route("/git/pull/{project}", get(handlers::git::pull))
        .route("/git/submodule/update", get(handlers::git::update_submodules));

    let project_routes = Router::new()
        .route("/{project}", get(handlers::projects::redirect_to_readme))
        .route("/{project}/", get(handlers::projects::redirect_to_readme))
        .route("/{project}/{*path}", get(handlers::projects::get_project_file));

    let router = Router::new()
        .route("/", get(handlers::home::get_home))
        .route("/error", get(handlers::home::get_error))
        .route("/api/projects", get(handlers::api::get_projects))
        .merge(git_routes)
        .merge(project_routes)
        .fallback(handlers::projects::not_found);

    with_security_headers(router)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(level))
                .on_response(DefaultOnResponse::new().level(level)),
        )
        .with_state(state)
}
