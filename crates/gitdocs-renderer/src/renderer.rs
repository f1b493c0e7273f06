//! Event-driven markdown to HTML renderer.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::error::RenderError;
use crate::state::{Capture, HeadingState, TableLayout, TocEntry, escape_html};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML fragment.
    pub html: String,
    /// Text of the first H1 heading.
    pub title: Option<String>,
    /// All headings in document order, with their assigned ids.
    pub headings: Vec<TocEntry>,
}

impl RenderResult {
    /// Text of the first H1 heading.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoHeading`] if the document has no H1 or the
    /// first H1 is empty.
    pub fn extract_title(&self) -> Result<&str, RenderError> {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => Ok(title),
            _ => Err(RenderError::NoHeading),
        }
    }
}

/// Markdown to HTML renderer.
///
/// Produces XHTML-style void elements (`<br />`, `<hr />`, `<img ... />`) and
/// passes raw HTML through unchanged. A renderer instance is reusable; each
/// call to [`render`](Self::render) starts from a clean slate.
pub struct MarkdownRenderer {
    output: String,
    capture: Option<Capture>,
    table: TableLayout,
    heading: HeadingState,
    hard_wraps: bool,
}

impl MarkdownRenderer {
    /// Create a new renderer with hard wraps enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            capture: None,
            table: TableLayout::default(),
            heading: HeadingState::default(),
            hard_wraps: true,
        }
    }

    /// Enable or disable rendering soft line breaks as `<br />`.
    #[must_use]
    pub fn with_hard_wraps(mut self, enabled: bool) -> Self {
        self.hard_wraps = enabled;
        self
    }

    /// Parser options: tables, strikethrough and task lists.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Render markdown text.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        self.render(self.create_parser(markdown))
    }

    /// Render markdown read from a file or another byte source.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidUtf8`] if `source` is not valid UTF-8.
    pub fn render_bytes(&mut self, source: &[u8]) -> Result<RenderResult, RenderError> {
        let markdown = std::str::from_utf8(source)?;
        Ok(self.render_markdown(markdown))
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        self.output.clear();
        self.capture = None;
        self.heading = HeadingState::default();

        for event in events {
            self.process_event(event);
        }

        RenderResult {
            html: std::mem::take(&mut self.output),
            title: self.heading.take_title(),
            headings: self.heading.take_headings(),
        }
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br />\n"),
            Event::Rule => self.output.push_str("<hr />\n"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked {
                    r#"<input checked="" disabled="" type="checkbox" /> "#
                } else {
                    r#"<input disabled="" type="checkbox" /> "#
                });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the id is known
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>\n"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned)
                        .filter(|l| !l.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                self.capture = Some(Capture::code(lang));
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>\n"),
                Some(n) => writeln!(self.output, "<ol start=\"{n}\">").unwrap(),
                None => self.output.push_str("<ul>\n"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table = TableLayout::new(alignments);
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.row(true);
                self.output.push_str("<thead>\n<tr>");
            }
            Tag::TableRow => {
                self.table.row(false);
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let (tag, align) = (self.table.cell_tag(), self.table.align_attr());
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let link_tag = if title.is_empty() {
                    format!(r#"<a href="{}">"#, escape_html(&dest_url))
                } else {
                    format!(
                        r#"<a href="{}" title="{}">"#,
                        escape_html(&dest_url),
                        escape_html(&title)
                    )
                };
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.capture = Some(Capture::image(dest_url.into_string(), title.into_string()));
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    writeln!(
                        self.output,
                        "<h{level} id=\"{id}\">{}</h{level}>",
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>\n"),
            TagEnd::CodeBlock => {
                if let Some(Capture::Code { language, text }) = self.capture.take() {
                    self.output.push_str("<pre><code");
                    if let Some(language) = language {
                        write!(self.output, " class=\"language-{}\"", escape_html(&language))
                            .unwrap();
                    }
                    writeln!(self.output, ">{}</code></pre>", escape_html(&text)).unwrap();
                }
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody>\n</table>\n"),
            TagEnd::TableHead => self.output.push_str("</tr>\n</thead>\n<tbody>\n"),
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                write!(self.output, "</{}>", self.table.cell_tag()).unwrap();
                self.table.next_column();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some(Capture::Image { src, title, alt }) = self.capture.take() {
                    let mut img = format!(
                        r#"<img src="{}" alt="{}""#,
                        escape_html(&src),
                        escape_html(&alt)
                    );
                    if !title.is_empty() {
                        write!(img, r#" title="{}""#, escape_html(&title)).unwrap();
                    }
                    img.push_str(" />");
                    self.push_inline(&img);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(capture) = &mut self.capture {
            capture.push(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(capture) = &mut self.capture {
            capture.push(code);
        } else if self.heading.is_active() {
            self.heading.push_text(code);
            write!(
                self.heading.html_buffer(),
                "<code>{}</code>",
                escape_html(code)
            )
            .unwrap();
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn soft_break(&mut self) {
        if let Some(capture) = &mut self.capture {
            capture.push(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html(" ");
        } else if self.hard_wraps {
            self.output.push_str("<br />\n");
        } else {
            self.output.push('\n');
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> RenderResult {
        MarkdownRenderer::new().render_markdown(markdown)
    }

    #[test]
    fn test_basic_paragraph() {
        let result = render("Hello, world!");
        assert_eq!(result.html, "<p>Hello, world!</p>\n");
    }

    #[test]
    fn test_heading_with_id() {
        let result = render("## Section Title");
        assert_eq!(result.html, "<h2 id=\"section-title\">Section Title</h2>\n");
        assert_eq!(
            result.headings,
            vec![TocEntry {
                level: 2,
                title: "Section Title".to_owned(),
                id: "section-title".to_owned(),
            }]
        );
    }

    #[test]
    fn test_every_heading_level_gets_id() {
        let result = render("# A\n## B\n### C\n#### D\n##### E\n###### F");
        for (level, id) in (1..=6).zip(["a", "b", "c", "d", "e", "f"]) {
            assert!(result.html.contains(&format!("<h{level} id=\"{id}\">")));
        }
        assert_eq!(result.headings.len(), 6);
    }

    #[test]
    fn test_title_is_first_h1() {
        let result = render("## Intro\n\n# My Title\n\nSome content\n\n# Other");
        assert_eq!(result.title.as_deref(), Some("My Title"));
        assert_eq!(result.extract_title().unwrap(), "My Title");
        // H1 is still rendered
        assert!(result.html.contains("<h1 id=\"my-title\">My Title</h1>"));
    }

    #[test]
    fn test_extract_title_without_h1() {
        let result = render("## Only a section\n\nText");
        assert!(matches!(result.extract_title(), Err(RenderError::NoHeading)));

        let result = render("plain text");
        assert!(matches!(result.extract_title(), Err(RenderError::NoHeading)));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let result = render("## FAQ\n\n## FAQ\n\n## FAQ");
        let ids: Vec<_> = result.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
    }

    #[test]
    fn test_suffixed_heading_does_not_reuse_id() {
        let result = render("## FAQ\n\n## FAQ\n\n## FAQ 1");
        let ids: Vec<_> = result.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-1-1"]);
        assert!(result.html.contains("<h2 id=\"faq-1-1\">FAQ 1</h2>"));
    }

    #[test]
    fn test_image_alt_is_not_heading_text() {
        let result = render("# ![Logo](l.png) Guide");
        assert_eq!(result.title.as_deref(), Some("Guide"));
        assert!(result.html.contains(
            "<h1 id=\"guide\"><img src=\"l.png\" alt=\"Logo\" /> Guide</h1>"
        ));
    }

    #[test]
    fn test_heading_with_inline_formatting() {
        let result = render("## Install `npm` *now*");
        assert!(result.html.contains(
            "<h2 id=\"install-npm-now\">Install <code>npm</code> <em>now</em></h2>"
        ));
        assert_eq!(result.headings[0].title, "Install npm now");
    }

    #[test]
    fn test_soft_break_renders_hard_wrap() {
        let result = render("first line\nsecond line");
        assert_eq!(result.html, "<p>first line<br />\nsecond line</p>\n");
    }

    #[test]
    fn test_soft_break_without_hard_wraps() {
        let result = MarkdownRenderer::new()
            .with_hard_wraps(false)
            .render_markdown("first line\nsecond line");
        assert_eq!(result.html, "<p>first line\nsecond line</p>\n");
    }

    #[test]
    fn test_raw_html_passthrough() {
        let result = render("<div class=\"note\">raw</div>\n\ntext with <kbd>Ctrl</kbd>");
        assert!(result.html.contains("<div class=\"note\">raw</div>"));
        assert!(result.html.contains("<kbd>Ctrl</kbd>"));
    }

    #[test]
    fn test_code_block() {
        let result = render("```rust\nfn main() {}\n```");
        assert_eq!(
            result.html,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_escapes_content() {
        let result = render("```\n<b>&</b>\n```");
        assert_eq!(
            result.html,
            "<pre><code>&lt;b&gt;&amp;&lt;/b&gt;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_code_block_does_not_create_heading() {
        let result = render("```\n# not a heading\n```");
        assert!(result.headings.is_empty());
        assert!(result.title.is_none());
    }

    #[test]
    fn test_image_is_self_closing() {
        let result = render("![Alt text](image.png \"Title\")");
        assert_eq!(
            result.html,
            "<p><img src=\"image.png\" alt=\"Alt text\" title=\"Title\" /></p>\n"
        );
    }

    #[test]
    fn test_rule_is_self_closing() {
        let result = render("above\n\n---\n\nbelow");
        assert!(result.html.contains("<hr />"));
    }

    #[test]
    fn test_link() {
        let result = render("[Guide](/docs/guide.md)");
        assert_eq!(result.html, "<p><a href=\"/docs/guide.md\">Guide</a></p>\n");
    }

    #[test]
    fn test_table() {
        let result = render("| A | B |\n|:--|--:|\n| 1 | 2 |");
        assert!(result.html.contains("<table>"));
        assert!(result.html.contains("<th style=\"text-align:left\">A</th>"));
        assert!(result.html.contains("<td style=\"text-align:right\">2</td>"));
        assert!(result.html.contains("</tbody>\n</table>"));
    }

    #[test]
    fn test_strikethrough_and_emphasis() {
        let result = render("~~deleted~~ *italic* **bold**");
        assert!(result.html.contains("<del>deleted</del>"));
        assert!(result.html.contains("<em>italic</em>"));
        assert!(result.html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_lists() {
        let result = render("- Item 1\n- Item 2");
        assert_eq!(result.html, "<ul>\n<li>Item 1</li>\n<li>Item 2</li>\n</ul>\n");

        let result = render("3. Third\n4. Fourth");
        assert!(result.html.starts_with("<ol start=\"3\">"));
    }

    #[test]
    fn test_task_list() {
        let result = render("- [ ] Unchecked\n- [x] Checked");
        assert!(result.html.contains(r#"<input disabled="" type="checkbox" /> Unchecked"#));
        assert!(
            result
                .html
                .contains(r#"<input checked="" disabled="" type="checkbox" /> Checked"#)
        );
    }

    #[test]
    fn test_render_bytes_invalid_utf8() {
        let mut renderer = MarkdownRenderer::new();
        let result = renderer.render_bytes(&[b'#', b' ', 0xff, 0xfe]);
        assert!(matches!(result, Err(RenderError::InvalidUtf8(_))));
    }

    #[test]
    fn test_render_bytes_valid() {
        let mut renderer = MarkdownRenderer::new();
        let result = renderer.render_bytes("# Título".as_bytes()).unwrap();
        assert_eq!(result.extract_title().unwrap(), "Título");
        assert_eq!(result.headings[0].id, "título");
    }

    #[test]
    fn test_renderer_is_reusable() {
        let mut renderer = MarkdownRenderer::default();
        let first = renderer.render_markdown("# One\n## FAQ");
        let second = renderer.render_markdown("## FAQ");
        assert_eq!(first.headings.len(), 2);
        // Id counters do not leak between documents
        assert_eq!(second.headings[0].id, "faq");
        assert!(second.title.is_none());
    }

    #[test]
    fn test_plain_text_is_stable() {
        let once = render("just words");
        assert_eq!(once.html, "<p>just words</p>\n");
    }
}
