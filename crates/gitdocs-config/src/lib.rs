//! Configuration for gitdocs.
//!
//! Settings come from a `gitdocs.toml` file, looked up in the working
//! directory and then in each parent, and may be overridden from the command
//! line with [`CliSettings`]. Every key is optional:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [site]
//! title = "Engineering Docs"
//! logo = "/assets/logo.svg"
//! readme = "public/README.md"
//! repos_dir = "repos"
//!
//! [git]
//! program = "git"
//! ```
//!
//! `readme` and `repos_dir` are relative to the directory holding the file,
//! which is also the workspace for submodule updates.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Name of the file searched for when no path is given.
pub const CONFIG_FILENAME: &str = "gitdocs.toml";

const DEFAULT_README: &str = "public/README.md";
const DEFAULT_REPOS_DIR: &str = "repos";

/// Command-line overrides. `None` keeps the file value.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// `--host`
    pub host: Option<String>,
    /// `--port`
    pub port: Option<u16>,
    /// `--repos-dir`, relative to the working directory.
    pub repos_dir: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Explicit config path does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Config file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid TOML or has wrong value types.
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// `[server]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// `[git]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Git executable, a name on `PATH` or a path.
    pub program: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_owned(),
        }
    }
}

/// `[site]` section with paths resolved against the config directory.
#[derive(Clone, Debug, Default)]
pub struct SiteConfig {
    /// Global title in the page header.
    pub title: String,
    /// Logo URL; empty hides the logo.
    pub logo: String,
    /// Favicon URL; empty omits the link.
    pub favicon: String,
    /// Markdown file rendered on the home page.
    pub readme: PathBuf,
    /// Directory containing one subdirectory per project.
    pub repos_dir: PathBuf,
}

/// Resolved configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// `[server]` values.
    pub server: ServerConfig,
    /// `[site]` values with absolute paths.
    pub site_resolved: SiteConfig,
    /// `[git]` values.
    pub git: GitConfig,
    /// Directory relative paths were resolved against.
    pub base_dir: PathBuf,
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
}

/// File layout as written by the user.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerConfig,
    site: SiteSection,
    git: GitConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SiteSection {
    title: String,
    logo: String,
    favicon: String,
    readme: Option<PathBuf>,
    repos_dir: Option<PathBuf>,
}

impl Config {
    /// Load the configuration and apply command-line overrides.
    ///
    /// With `config_path`, that file must exist. Without it, `gitdocs.toml` is
    /// searched from the working directory upwards, and defaults relative to
    /// the working directory are used when none is found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit file is missing, a file cannot
    /// be read or parsed, or the final values are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };

        let mut config = match path {
            Some(path) => Self::read(&path)?,
            None => Self::with_base_dir(&std::env::current_dir().unwrap_or_default()),
        };
        if let Some(settings) = cli_settings {
            config.apply_overrides(settings);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first invalid key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Validation(format!("{key} {reason}")))
        };

        if self.server.host.trim().is_empty() {
            return invalid("server.host", "cannot be empty");
        }
        // Port 0 would bind a random port
        if self.server.port == 0 {
            return invalid("server.port", "cannot be 0");
        }
        if self.git.program.trim().is_empty() {
            return invalid("git.program", "cannot be empty");
        }
        Ok(())
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Defaults with paths under `base_dir`.
    fn with_base_dir(base_dir: &Path) -> Self {
        Self::resolve(ConfigFile::default(), base_dir, None)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(&std::fs::read_to_string(path)?)?;
        let base_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        Ok(Self::resolve(file, base_dir, Some(path.to_path_buf())))
    }

    fn resolve(file: ConfigFile, base_dir: &Path, config_path: Option<PathBuf>) -> Self {
        let ConfigFile { server, site, git } = file;
        let under_base = |path: Option<PathBuf>, default: &str| {
            base_dir.join(path.unwrap_or_else(|| PathBuf::from(default)))
        };

        Self {
            server,
            site_resolved: SiteConfig {
                title: site.title,
                logo: site.logo,
                favicon: site.favicon,
                readme: under_base(site.readme, DEFAULT_README),
                repos_dir: under_base(site.repos_dir, DEFAULT_REPOS_DIR),
            },
            git,
            base_dir: base_dir.to_path_buf(),
            config_path,
        }
    }

    fn apply_overrides(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(repos_dir) = &settings.repos_dir {
            self.site_resolved.repos_dir.clone_from(repos_dir);
        }
    }

    /// Nearest `gitdocs.toml` in `start` or its ancestors.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml: &str, base_dir: &str) -> Config {
        let file: ConfigFile = toml::from_str(toml).unwrap();
        Config::resolve(file, Path::new(base_dir), None)
    }

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_defaults() {
        let config = Config::with_base_dir(Path::new("/test"));

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.git.program, "git");
        assert_eq!(config.site_resolved.repos_dir, PathBuf::from("/test/repos"));
        assert_eq!(
            config.site_resolved.readme,
            PathBuf::from("/test/public/README.md")
        );
        assert_eq!(config.site_resolved.title, "");
        assert_eq!(config.base_dir, PathBuf::from("/test"));
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse("", "/test");
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_server_section() {
        let config = parse("[server]\nhost = \"0.0.0.0\"\nport = 9000\n", "/test");
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_site_paths_are_relative_to_base() {
        let config = parse(
            r#"
[site]
title = "Engineering Docs"
logo = "/assets/logo.svg"
favicon = "/assets/favicon.ico"
readme = "home.md"
repos_dir = "../checkouts"
"#,
            "/project",
        );

        assert_eq!(config.site_resolved.title, "Engineering Docs");
        assert_eq!(config.site_resolved.logo, "/assets/logo.svg");
        assert_eq!(config.site_resolved.favicon, "/assets/favicon.ico");
        assert_eq!(config.site_resolved.readme, PathBuf::from("/project/home.md"));
        assert_eq!(
            config.site_resolved.repos_dir,
            PathBuf::from("/project/../checkouts")
        );
    }

    #[test]
    fn test_absolute_repos_dir_is_kept() {
        let config = parse("[site]\nrepos_dir = \"/srv/repos\"\n", "/project");
        assert_eq!(config.site_resolved.repos_dir, PathBuf::from("/srv/repos"));
    }

    #[test]
    fn test_wrong_value_type_is_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("[server]\nport = \"eighty\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::with_base_dir(Path::new("/test"));

        config.apply_overrides(&CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(8080),
            repos_dir: Some(PathBuf::from("/custom/repos")),
        });

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            config.site_resolved.repos_dir,
            PathBuf::from("/custom/repos")
        );
        assert_eq!(
            config.site_resolved.readme,
            PathBuf::from("/test/public/README.md")
        );
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = Config::with_base_dir(Path::new("/test"));
        config.apply_overrides(&CliSettings::default());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.site_resolved.repos_dir, PathBuf::from("/test/repos"));
    }

    #[test]
    fn test_validate_rejects_blank_host() {
        let mut config = Config::with_base_dir(Path::new("/test"));
        config.server.host = "  ".to_owned();

        let err = config.validate().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: server.host cannot be empty"
        );
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let mut config = Config::with_base_dir(Path::new("/test"));
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_rejects_empty_git_program() {
        let mut config = Config::with_base_dir(Path::new("/test"));
        config.git.program = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("git.program"));
    }

    #[test]
    fn test_load_explicit_file() {
        let (temp_dir, path) =
            write_config("[server]\nport = 4000\n\n[site]\nrepos_dir = \"projects\"\n");

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(
            config.site_resolved.repos_dir,
            temp_dir.path().join("projects")
        );
        assert_eq!(config.base_dir, temp_dir.path());
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&temp_dir.path().join("missing.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let (_temp_dir, path) = write_config("[server\nport = ");
        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_validates_file_values() {
        let (_temp_dir, path) = write_config("[server]\nport = 0\n");
        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_validates_overrides() {
        let (_temp_dir, path) = write_config("");
        let overrides = CliSettings {
            port: Some(0),
            ..CliSettings::default()
        };
        let result = Config::load(Some(&path), Some(&overrides));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_discover_in_parent_directory() {
        let (temp_dir, path) = write_config("");
        let nested = temp_dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(&nested), Some(path));
    }

    #[test]
    fn test_discover_stops_at_nearest() {
        let (temp_dir, _outer) = write_config("");
        let inner_dir = temp_dir.path().join("inner");
        std::fs::create_dir_all(inner_dir.join("deeper")).unwrap();
        let inner = inner_dir.join(CONFIG_FILENAME);
        std::fs::write(&inner, "").unwrap();

        assert_eq!(Config::discover_from(&inner_dir.join("deeper")), Some(inner));
    }
}
