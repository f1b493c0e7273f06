//! `gitdocs serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use gitdocs_config::{CliSettings, Config};
use gitdocs_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover gitdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, env = "GITDOCS_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "GITDOCS_PORT")]
    port: Option<u16>,

    /// Directory containing one subdirectory per project (overrides config).
    #[arg(short, long)]
    repos_dir: Option<PathBuf>,

    /// Enable verbose output (request and index rebuild logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            repos_dir: self.repos_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let site = &config.site_resolved;
        if !site.repos_dir.is_dir() {
            return Err(CliError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Repositories directory not found: {}", site.repos_dir.display()),
            )));
        }

        output.highlight(&format!("Docs running on http://{}", display_address(&config)));
        output.info(&format!("Repositories: {}", site.repos_dir.display()));
        if site.readme.is_file() {
            output.info(&format!("Home page: {}", site.readme.display()));
        } else {
            output.info("Home page: none (showing project index only)");
        }
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }

        let server_config = server_config_from_config(&config, version.to_owned(), self.verbose);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Address to show the user; a wildcard host is shown as loopback.
fn display_address(config: &Config) -> String {
    match config.server.host.as_str() {
        "0.0.0.0" => format!(
            "127.0.0.1:{} (listening on 0.0.0.0)",
            config.server.port
        ),
        _ => config.bind_address(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_with_host(host: &str) -> Config {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("gitdocs.toml");
        std::fs::write(&config_path, "[server]\nport = 4000\n").unwrap();
        let settings = CliSettings {
            host: Some(host.to_owned()),
            port: None,
            repos_dir: None,
        };
        Config::load(Some(&config_path), Some(&settings)).unwrap()
    }

    #[test]
    fn test_display_address() {
        assert_eq!(display_address(&config_with_host("localhost")), "localhost:4000");
        assert_eq!(
            display_address(&config_with_host("0.0.0.0")),
            "127.0.0.1:4000 (listening on 0.0.0.0)"
        );
    }
}
