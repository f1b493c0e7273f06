//! HTML page template.
//!
//! Every HTML response is a full page: header with the site branding, the
//! cross-project navigation, the rendered document, its outline and a footer.

use std::fmt::Write;

use gitdocs_renderer::escape_html as escape;
use gitdocs_site::{Link, ProjectToc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::state::Branding;

/// Characters escaped in a single URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const STYLE: &str = "\
body { margin: 0; font-family: system-ui, sans-serif; color: #1f2937; }
a { color: #1d4ed8; text-decoration: none; }
a:hover { text-decoration: underline; }
.header { display: flex; align-items: center; gap: 0.75rem; padding: 0.75rem 1.5rem; border-bottom: 1px solid #e5e7eb; }
.header img { height: 2rem; }
.brand { font-size: 1.25rem; font-weight: 600; color: inherit; }
.layout { display: flex; align-items: flex-start; }
.sidebar { width: 280px; flex-shrink: 0; padding: 1rem; border-right: 1px solid #e5e7eb; }
.sidebar ul { list-style: none; margin: 0; padding: 0; }
.project { margin-bottom: 1rem; }
.project-name { font-weight: 600; }
.branch { margin-left: 0.5rem; font-size: 0.75rem; color: #6b7280; }
.tags li, .git-actions { display: inline-block; margin-right: 0.5rem; font-size: 0.75rem; }
.tags .current { font-weight: 600; color: #111827; }
.pages { margin-left: 0.75rem !important; }
.active { font-weight: 600; color: #111827; }
.content { flex: 1; min-width: 0; padding: 1rem 2rem; }
.toc { width: 220px; flex-shrink: 0; padding: 1rem; font-size: 0.875rem; }
.footer { display: flex; justify-content: space-between; padding: 0.75rem 1.5rem; border-top: 1px solid #e5e7eb; font-size: 0.75rem; color: #6b7280; }
";

/// All data needed to render a page.
pub(crate) struct PageData<'a> {
    pub(crate) branding: &'a Branding,
    pub(crate) title: &'a str,
    pub(crate) html_content: &'a str,
    pub(crate) headings: &'a [Link],
    pub(crate) projects: &'a [ProjectToc],
    /// Decoded request path, compared against page hrefs.
    pub(crate) current_href: &'a str,
    pub(crate) current_project: &'a str,
    /// Branch of the current project, empty when unknown.
    pub(crate) current_branch: &'a str,
    pub(crate) version: &'a str,
    pub(crate) download_link: Option<&'a str>,
}

/// Percent-encode a value for use as one URL path segment.
pub(crate) fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Percent-encode every segment of a slash-separated path.
pub(crate) fn path_href(path: &str) -> String {
    path.split('/').map(path_segment).collect::<Vec<_>>().join("/")
}

/// Render a complete HTML page.
pub(crate) fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(8192 + page.html_content.len());

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if page.branding.title.is_empty() {
        let _ = writeln!(html, "<title>{}</title>", escape(page.title));
    } else {
        let _ = writeln!(
            html,
            "<title>{} | {}</title>",
            escape(page.title),
            escape(&page.branding.title)
        );
    }
    if !page.branding.favicon.is_empty() {
        let _ = writeln!(
            html,
            "<link rel=\"icon\" href=\"{}\">",
            escape(&page.branding.favicon)
        );
    }
    let _ = writeln!(html, "<style>\n{STYLE}</style>");
    html.push_str("</head>\n<body>\n");

    render_header(&mut html, page.branding);

    html.push_str("<div class=\"layout\">\n");
    render_sidebar(&mut html, page);

    html.push_str("<main class=\"content\">\n<article>\n");
    html.push_str(page.html_content);
    html.push_str("</article>\n</main>\n");

    render_toc(&mut html, page.headings);
    html.push_str("</div>\n");

    render_footer(&mut html, page);
    html.push_str("</body>\n</html>\n");
    html
}

fn render_header(html: &mut String, branding: &Branding) {
    html.push_str("<header class=\"header\">\n<a href=\"/\" class=\"brand\">");
    if !branding.logo.is_empty() {
        let _ = write!(
            html,
            "<img src=\"{}\" alt=\"{}\">",
            escape(&branding.logo),
            escape(&branding.title)
        );
    }
    if !branding.title.is_empty() {
        let _ = write!(html, "<span>{}</span>", escape(&branding.title));
    }
    html.push_str("</a>\n</header>\n");
}

/// Cross-project navigation with git controls.
fn render_sidebar(html: &mut String, page: &PageData<'_>) {
    html.push_str("<aside class=\"sidebar\">\n<nav>\n<ul class=\"projects\">\n");

    for project in page.projects {
        let is_current = project.name == page.current_project;
        let _ = writeln!(
            html,
            "<li class=\"project{}\">",
            if is_current { " current" } else { "" }
        );

        let _ = write!(
            html,
            "<a href=\"{}\" class=\"project-name\">{}</a>",
            escape(&path_href(&project.href)),
            escape(&project.name)
        );
        if is_current && !page.current_branch.is_empty() {
            let _ = write!(
                html,
                "<span class=\"branch\">{}</span>",
                escape(page.current_branch)
            );
        }
        html.push('\n');

        if !project.tags.is_empty() {
            render_git_controls(html, project);
        }

        if !project.pages.is_empty() {
            html.push_str("<ul class=\"pages\">\n");
            for link in &project.pages {
                let class = if link.href == page.current_href {
                    " class=\"active\""
                } else {
                    ""
                };
                let _ = writeln!(
                    html,
                    "<li><a href=\"{}\"{class}>{}</a></li>",
                    escape(&path_href(&link.href)),
                    escape(&link.text)
                );
            }
            html.push_str("</ul>\n");
        }

        html.push_str("</li>\n");
    }

    html.push_str("</ul>\n");
    html.push_str("<a href=\"/git/submodule/update\" class=\"git-actions\">Update submodules</a>\n");
    html.push_str("</nav>\n</aside>\n");
}

/// Tag selector and pull link of a git project.
fn render_git_controls(html: &mut String, project: &ProjectToc) {
    let name = path_segment(&project.name);

    html.push_str("<ul class=\"tags\">\n");
    for tag in &project.tags {
        let class = if *tag == project.current_tag {
            " class=\"current\""
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "<li><a href=\"/git/checkout/{}/{}\"{class}>{}</a></li>",
            escape(&name),
            escape(&path_segment(tag)),
            escape(tag)
        );
    }
    html.push_str("</ul>\n");
    let _ = writeln!(
        html,
        "<a href=\"/git/pull/{}\" class=\"git-actions\">Pull</a>",
        escape(&name)
    );
}

/// Outline of the current page.
fn render_toc(html: &mut String, headings: &[Link]) {
    if headings.is_empty() {
        return;
    }
    html.push_str("<aside class=\"toc\">\n<p>On this page</p>\n<ul>\n");
    for heading in headings {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            escape(&heading.href),
            escape(&heading.text)
        );
    }
    html.push_str("</ul>\n</aside>\n");
}

fn render_footer(html: &mut String, page: &PageData<'_>) {
    html.push_str("<footer class=\"footer\">\n");
    match page.download_link {
        Some(link) => {
            let _ = writeln!(
                html,
                "<a href=\"{}\" class=\"download\">Download markdown</a>",
                escape(link)
            );
        }
        None => html.push_str("<span></span>\n"),
    }
    if !page.version.is_empty() {
        let _ = writeln!(html, "<span class=\"version\">{}</span>", escape(page.version));
    }
    html.push_str("</footer>\n");
}
