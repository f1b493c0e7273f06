//! HTTP server for gitdocs.
//!
//! This crate provides the axum server in front of [`gitdocs_site::Site`]:
//! - rendered documentation pages for every project under the repositories root
//! - raw project files and markdown downloads
//! - git mutation endpoints (checkout, pull, submodule update) that rebuild the
//!   project index before redirecting
//! - the project index as JSON
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use gitdocs_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         repos_dir: PathBuf::from("repos"),
//!         version: "0.1.0".to_owned(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (gitdocs-server)
//!                        │
//!                        ├─► page routes ──spawn_blocking──► Site (index + render)
//!                        │                                      │
//!                        ├─► /git/* ──────spawn_blocking──► Site ──► git CLI
//!                        │
//!                        └─► raw files (tower-http ServeFile)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod template;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use gitdocs_site::{Site, SiteConfig};
use gitdocs_vcs::GitCli;
use state::{AppState, Branding};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory containing one subdirectory per project.
    pub repos_dir: PathBuf,
    /// Directory in which submodule updates run.
    pub workspace_dir: PathBuf,
    /// Markdown file rendered as the home page.
    pub readme_path: PathBuf,
    /// Global title shown in the page header.
    pub title: String,
    /// Logo URL (empty hides the logo).
    pub logo: String,
    /// Favicon URL (empty omits the link).
    pub favicon: String,
    /// Git executable.
    pub git_program: String,
    /// Log every request at `info` level.
    pub verbose: bool,
    /// Application version shown in the page footer.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            repos_dir: PathBuf::from("repos"),
            workspace_dir: PathBuf::from("."),
            readme_path: PathBuf::from("public/README.md"),
            title: String::new(),
            logo: String::new(),
            favicon: String::new(),
            git_program: "git".to_owned(),
            verbose: false,
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// Builds the initial project index, then serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let site_config = SiteConfig {
        repos_dir: config.repos_dir.clone(),
        workspace_dir: config.workspace_dir.clone(),
    };
    let git = Arc::new(GitCli::with_program(&config.git_program));
    let site = Arc::new(Site::new(site_config, git));

    // Initial index build shells out to git for every project
    let index = {
        let site = Arc::clone(&site);
        tokio::task::spawn_blocking(move || site.reload()).await?
    };
    tracing::info!(
        repos_dir = %config.repos_dir.display(),
        project_count = index.len(),
        "Projects loaded"
    );

    let state = Arc::new(AppState {
        site,
        branding: Branding {
            title: config.title.clone(),
            logo: config.logo.clone(),
            favicon: config.favicon.clone(),
        },
        readme_path: config.readme_path.clone(),
        verbose: config.verbose,
        version: config.version.clone(),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from gitdocs config.
///
/// The configuration directory doubles as the workspace for submodule updates.
#[must_use]
pub fn server_config_from_config(
    config: &gitdocs_config::Config,
    version: String,
    verbose: bool,
) -> ServerConfig {
    let site = &config.site_resolved;
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        repos_dir: site.repos_dir.clone(),
        workspace_dir: config.base_dir.clone(),
        readme_path: site.readme.clone(),
        title: site.title.clone(),
        logo: site.logo.clone(),
        favicon: site.favicon.clone(),
        git_program: config.git.program.clone(),
        verbose,
        version,
    }
}
