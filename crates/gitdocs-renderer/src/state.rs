//! State tracked while walking markdown events.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::Alignment;

/// Text collected verbatim instead of being written to the output.
pub(crate) enum Capture {
    /// Fenced or indented code block.
    Code { language: Option<String>, text: String },
    /// Image alt text; the tag is written once the alt text is complete.
    Image { src: String, title: String, alt: String },
}

impl Capture {
    pub fn code(language: Option<String>) -> Self {
        Self::Code {
            language,
            text: String::new(),
        }
    }

    pub fn image(src: String, title: String) -> Self {
        Self::Image {
            src,
            title,
            alt: String::new(),
        }
    }

    pub fn push(&mut self, chunk: &str) {
        match self {
            Self::Code { text, .. } => text.push_str(chunk),
            Self::Image { alt, .. } => alt.push_str(chunk),
        }
    }
}

/// Column alignments of the table being rendered.
#[derive(Default)]
pub(crate) struct TableLayout {
    alignments: Vec<Alignment>,
    column: usize,
    header: bool,
}

impl TableLayout {
    pub fn new(alignments: Vec<Alignment>) -> Self {
        Self {
            alignments,
            column: 0,
            header: false,
        }
    }

    /// Start the header row (`header`) or a body row.
    pub fn row(&mut self, header: bool) {
        self.header = header;
        self.column = 0;
    }

    pub fn next_column(&mut self) {
        self.column += 1;
    }

    pub fn cell_tag(&self) -> &'static str {
        if self.header { "th" } else { "td" }
    }

    pub fn align_attr(&self) -> &'static str {
        match self.alignments.get(self.column) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Heading collected from a rendered document.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading plain text.
    pub title: String,
    /// Anchor id assigned to the heading element.
    pub id: String,
}

/// State for tracking headings, ids and the document title.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Plain text of the first H1.
    title: Option<String>,
    /// Level of the heading being processed.
    current_level: Option<u8>,
    /// Plain text of the current heading (for slug and heading list).
    text: String,
    /// HTML of the current heading (with inline formatting).
    html: String,
    headings: Vec<TocEntry>,
    id_counts: HashMap<String, usize>,
    issued_ids: HashSet<String>,
}

impl HeadingState {
    pub fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete the current heading and return (level, id, html).
    pub fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let title = text.trim().to_owned();
        let id = self.generate_id(&title);

        if level == 1 && self.title.is_none() {
            self.title = Some(title.clone());
        }

        self.headings.push(TocEntry {
            level,
            title,
            id: id.clone(),
        });

        Some((level, id, html))
    }

    /// Generate an id not issued before in this document.
    ///
    /// Repeats of a slug get `-1`, `-2`, ... skipping suffixed ids that an
    /// earlier heading already took, e.g. `## FAQ 1` before the second `## FAQ`.
    fn generate_id(&mut self, text: &str) -> String {
        let mut base_id = slugify(text);
        if base_id.is_empty() {
            base_id = "section".to_owned();
        }
        let count = self.id_counts.entry(base_id.clone()).or_default();
        let id = loop {
            let candidate = match *count {
                0 => base_id.clone(),
                n => format!("{base_id}-{n}"),
            };
            *count += 1;
            if !self.issued_ids.contains(&candidate) {
                break candidate;
            }
        };
        self.issued_ids.insert(id.clone());
        id
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub fn html_buffer(&mut self) -> &mut String {
        &mut self.html
    }

    pub fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub fn take_headings(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.headings)
    }
}

/// Convert heading text to a URL fragment identifier.
///
/// Letters and digits (any script) are kept and lowercased, apostrophes are
/// dropped, and every other run of characters becomes a single dash. Leading
/// and trailing dashes are trimmed.
///
/// ```
/// use gitdocs_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started!"), "getting-started");
/// assert_eq!(slugify("What's New?"), "whats-new");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.extend(c.to_lowercase());
        } else if c != '\'' && c != '\u{2019}' {
            pending_dash = true;
        }
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("kebab-case"), "kebab-case");
        assert_eq!(slugify("snake_case"), "snake-case");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
        assert_eq!(slugify("v1.2"), "v1-2");
    }

    #[test]
    fn test_slugify_keeps_unicode_letters() {
        assert_eq!(slugify("Über Änderungen"), "über-änderungen");
        assert_eq!(slugify("Документация"), "документация");
    }

    #[test]
    fn test_slugify_punctuation_only() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_heading_state_duplicate_ids() {
        let mut state = HeadingState::default();
        for _ in 0..3 {
            state.start_heading(2);
            state.push_text("FAQ");
            state.complete_heading();
        }
        let ids: Vec<_> = state.take_headings().into_iter().map(|h| h.id).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
    }

    #[test]
    fn test_heading_state_suffix_skips_taken_ids() {
        let mut state = HeadingState::default();
        for text in ["FAQ", "FAQ 1", "FAQ", "FAQ", "FAQ-1"] {
            state.start_heading(2);
            state.push_text(text);
            state.complete_heading();
        }
        let ids: Vec<_> = state.take_headings().into_iter().map(|h| h.id).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2", "faq-3", "faq-1-1"]);
    }

    #[test]
    fn test_heading_state_empty_text_gets_fallback_id() {
        let mut state = HeadingState::default();
        state.start_heading(2);
        state.push_text("?!");
        let (_, id, _) = state.complete_heading().unwrap();
        assert_eq!(id, "section");
    }

    #[test]
    fn test_heading_state_title_is_first_h1() {
        let mut state = HeadingState::default();
        for (level, text) in [(2, "Intro"), (1, "First"), (1, "Second")] {
            state.start_heading(level);
            state.push_text(text);
            state.complete_heading();
        }
        assert_eq!(state.take_title(), Some("First".to_owned()));
    }

    #[test]
    fn test_table_layout_alignment() {
        let mut table = TableLayout::new(vec![Alignment::Left, Alignment::None, Alignment::Right]);
        table.row(true);
        assert_eq!(table.cell_tag(), "th");
        assert_eq!(table.align_attr(), r#" style="text-align:left""#);
        table.next_column();
        assert_eq!(table.align_attr(), "");
        table.next_column();
        assert_eq!(table.align_attr(), r#" style="text-align:right""#);
        table.next_column();
        assert_eq!(table.align_attr(), "");

        table.row(false);
        assert_eq!(table.cell_tag(), "td");
        assert_eq!(table.align_attr(), r#" style="text-align:left""#);
    }

    #[test]
    fn test_capture_collects_text() {
        let mut capture = Capture::image("a.png".to_owned(), String::new());
        capture.push("diagram ");
        capture.push("v2");
        assert!(matches!(capture, Capture::Image { ref alt, .. } if alt == "diagram v2"));
    }
}
