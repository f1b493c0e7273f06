//! gitdocs CLI - documentation server for a directory of git repositories.
//!
//! Provides commands for:
//! - `serve`: Start the documentation server
//! - `index`: Print the project index

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{IndexArgs, ServeArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// gitdocs - browse the documentation of many git repositories.
#[derive(Parser)]
#[command(name = "gitdocs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the documentation server.
    Serve(ServeArgs),
    /// Print the project index.
    Index(IndexArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Serve(args) => match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(args.execute(VERSION)),
            Err(e) => Err(e.into()),
        },
        Commands::Index(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "gitdocs",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--repos-dir",
            "docs",
            "--verbose",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Serve(args) if args.verbose));
    }

    #[test]
    fn test_parse_index_json() {
        let cli = Cli::try_parse_from(["gitdocs", "index", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Index(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["gitdocs", "serve", "--port", "99999"]).is_err());
    }
}
