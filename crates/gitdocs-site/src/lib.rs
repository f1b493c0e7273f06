//! Project index and page rendering for gitdocs.
//!
//! The repositories root holds one directory per project. This crate turns it
//! into:
//!
//! - a [`ProjectIndex`] of [`ProjectToc`] entries (pages, tags, current tag),
//!   rebuilt wholesale by [`Site::reload`] and published as an `Arc` snapshot
//! - [`PageRender`] results for request paths or literal markdown, with a
//!   short outline and a title
//!
//! Git mutations go through [`Site`], which serializes them per project and
//! reloads the index before returning.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use gitdocs_site::{PageSource, Site, SiteConfig};
//! use gitdocs_vcs::GitCli;
//!
//! let config = SiteConfig {
//!     repos_dir: PathBuf::from("repos"),
//!     workspace_dir: PathBuf::from("."),
//! };
//! let site = Site::new(config, Arc::new(GitCli::new()));
//! site.reload();
//!
//! for project in site.projects().projects() {
//!     println!("{} ({} pages)", project.name, project.pages.len());
//! }
//! let page = site.render_page(PageSource::File("/handbook/guide.md"));
//! ```

mod page;
mod project;
mod site;

pub use page::{
    MarkdownDownload, PageError, PageRender, PageSource, UNTITLED, download_markdown,
    error_markdown, render_page, render_page_or_error, resolve_request_path, short_toc,
};
pub use project::{IndexError, Link, ProjectToc, build_index};
pub use site::{ProjectIndex, Site, SiteConfig};
