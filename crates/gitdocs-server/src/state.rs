//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use gitdocs_site::Site;

/// Site-wide branding shown on every page.
#[derive(Clone, Debug, Default)]
pub(crate) struct Branding {
    /// Global title in the page header.
    pub(crate) title: String,
    /// Logo URL, empty when unset.
    pub(crate) logo: String,
    /// Favicon URL, empty when unset.
    pub(crate) favicon: String,
}

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Project index and page rendering.
    pub(crate) site: Arc<Site>,
    /// Header and favicon settings.
    pub(crate) branding: Branding,
    /// Markdown file rendered as the home page.
    pub(crate) readme_path: PathBuf,
    /// Log requests at `info` instead of `debug`.
    pub(crate) verbose: bool,
    /// Application version shown in the footer.
    pub(crate) version: String,
}
