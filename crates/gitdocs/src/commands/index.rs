//! `gitdocs index` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use gitdocs_config::{CliSettings, Config};
use gitdocs_site::{ProjectIndex, ProjectToc, build_index};
use gitdocs_vcs::{GitCli, VersionControlProbe};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the index command.
#[derive(Args)]
pub(crate) struct IndexArgs {
    /// Path to configuration file (default: auto-discover gitdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing one subdirectory per project (overrides config).
    #[arg(short, long)]
    repos_dir: Option<PathBuf>,

    /// Print the index as JSON, in the format of `/api/projects`.
    #[arg(long)]
    json: bool,

    /// Also list the pages of each project.
    #[arg(long, conflicts_with = "json")]
    pages: bool,
}

impl IndexArgs {
    /// Execute the index command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the repositories directory
    /// cannot be listed.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            host: None,
            port: None,
            repos_dir: self.repos_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let git = GitCli::with_program(&config.git.program);
        let projects = sorted_projects(&config.site_resolved.repos_dir, &git)?;

        if self.json {
            let index = ProjectIndex::new(projects);
            output.result(&serde_json::to_string_pretty(&index)?);
            return Ok(());
        }

        for project in &projects {
            output.result(&summary_line(project));
            if self.pages {
                for page in &project.pages {
                    output.result_dim(&format!("  {}  {}", page.href, page.text));
                }
            }
        }
        output.info(&format!(
            "{} projects in {}",
            projects.len(),
            config.site_resolved.repos_dir.display()
        ));
        Ok(())
    }
}

/// Project entries sorted by name for stable output.
fn sorted_projects(
    repos_dir: &Path,
    probe: &dyn VersionControlProbe,
) -> Result<Vec<ProjectToc>, CliError> {
    let mut projects = build_index(repos_dir, probe)?;
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(
        repos_dir = %repos_dir.display(),
        project_count = projects.len(),
        "Indexed projects"
    );
    Ok(projects)
}

/// `name  tag  N pages`; the tag column is `-` outside git.
fn summary_line(project: &ProjectToc) -> String {
    let tag = if project.current_tag.is_empty() {
        "-"
    } else {
        project.current_tag.as_str()
    };
    let noun = if project.pages.len() == 1 { "page" } else { "pages" };
    format!("{}\t{tag}\t{} {noun}", project.name, project.pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitdocs_site::Link;
    use gitdocs_vcs::{MockProbe, MockRepo};
    use pretty_assertions::assert_eq;

    fn project(current_tag: &str, pages: usize) -> ProjectToc {
        ProjectToc {
            name: "docs".to_owned(),
            href: "/docs".to_owned(),
            pages: (0..pages)
                .map(|i| Link {
                    text: format!("Page {i}"),
                    href: format!("/docs/{i}.md"),
                })
                .collect(),
            tags: Vec::new(),
            current_tag: current_tag.to_owned(),
        }
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(summary_line(&project("", 0)), "docs\t-\t0 pages");
        assert_eq!(summary_line(&project("latest", 1)), "docs\tlatest\t1 page");
        assert_eq!(summary_line(&project("v2", 3)), "docs\tv2\t3 pages");
    }

    #[test]
    fn test_sorted_projects_with_git_metadata() {
        let temp_dir = tempfile::tempdir().unwrap();
        let repos = temp_dir.path();
        for (file, content) in [
            ("zeta/README.md", "# Zeta"),
            ("alpha/guide.md", "# Guide"),
            ("alpha/README.md", "# Alpha"),
        ] {
            let path = repos.join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        let probe = MockProbe::new().with_repo(
            repos.join("zeta"),
            MockRepo {
                tags: vec!["v1".to_owned()],
                head_tag: Some("v1".to_owned()),
                ..MockRepo::default()
            },
        );

        let projects = sorted_projects(repos, &probe).unwrap();

        let lines: Vec<_> = projects.iter().map(summary_line).collect();
        assert_eq!(lines, vec!["alpha\t-\t1 page", "zeta\tv1\t0 pages"]);
        assert_eq!(projects[1].tags, vec!["latest", "v1"]);
    }

    #[test]
    fn test_sorted_projects_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = sorted_projects(&temp_dir.path().join("missing"), &MockProbe::new());
        assert!(matches!(result, Err(CliError::Index(_))));
    }
}
