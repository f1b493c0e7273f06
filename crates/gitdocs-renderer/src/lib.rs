//! Markdown renderer for gitdocs.
//!
//! Converts CommonMark with GitHub extensions (tables, strikethrough, task
//! lists) into HTML fragments ready to embed into a page template:
//!
//! - every heading gets a deterministic slug `id`, duplicates are suffixed
//!   (`faq`, `faq-1`, `faq-2`)
//! - the first H1 is captured as the document title
//! - all headings are collected in document order
//! - raw HTML is passed through unchanged
//! - soft line breaks are rendered as `<br />` when hard wraps are enabled
//!
//! Rendering is a pure function of the input text. File loading belongs to
//! the caller; [`MarkdownRenderer::render_bytes`] turns non-UTF-8 input into a
//! [`RenderError`] instead of aborting.
//!
//! # Example
//!
//! ```
//! use gitdocs_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render_markdown("# Guide\n\n## Install");
//! assert_eq!(result.extract_title().unwrap(), "Guide");
//! assert_eq!(result.headings[1].id, "install");
//! ```

mod error;
mod renderer;
mod state;

pub use error::RenderError;
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
