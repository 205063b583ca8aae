use chrono::{DateTime, Utc};
use pulldown_cmark::{html, Parser};
use serde::Serialize;
use std::fmt::Write as _;

use super::{summary_text, DisplayMode, OutputFormat, Page, RenderError, RenderOptions};
use crate::feed::FeedEntry;
use crate::filter::{highlight_escaped, KeywordMatchers, KeywordSet, MatchMode};
use crate::util::strip_html;

/// Message shown when a successful fetch leaves nothing after filtering.
pub const NO_MATCHES_MESSAGE: &str = "No articles matched the specified keywords.";

/// Everything a print-mode document describes.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub keywords: &'a KeywordSet,
    pub mode: MatchMode,
    /// Entries in the feed before filtering.
    pub fetched: usize,
    pub page: Page<'a>,
}

/// Render `report` in `format`.
pub fn render_document(
    format: OutputFormat,
    report: &Report<'_>,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Markdown => Ok(render_markdown(report, options)),
        OutputFormat::Html => Ok(render_html(report, options)),
        OutputFormat::Json => render_json(report, options),
    }
}

/// Markdown document with keyword occurrences wrapped in emphasis spans.
///
/// Each entry is a level-3 heading linking to the paper, an italic author
/// line when authors are known, the summary as the display mode wants it,
/// and a `---` divider.
pub fn render_markdown(report: &Report<'_>, options: &RenderOptions) -> String {
    let matchers = KeywordMatchers::new(report.keywords);
    let color = options.highlight_color.as_str();
    let page = &report.page;
    let mut out = String::new();

    let _ = write!(out, "## Keywords\n\n{}\n\n", escape_markdown(&report.keywords.to_string()));
    out.push_str("## Filtered Articles\n\n");

    if page.total_entries == 0 {
        let _ = writeln!(out, "{NO_MATCHES_MESSAGE}");
        return out;
    }

    let _ = write!(
        out,
        "*{} of {} entries matched ({}). Page {} of {}.*\n\n",
        page.total_entries,
        report.fetched,
        report.mode.label(),
        page.number,
        page.total_pages
    );

    for entry in page.entries {
        let title = strip_html(&entry.title);
        let _ = write!(
            out,
            "### [{}]({})\n\n",
            highlight_escaped(&title, &matchers, color, escape_markdown),
            escape_link(&entry.link)
        );

        if let Some(byline) = byline(entry) {
            let _ = write!(out, "*{}*\n\n", escape_markdown(&byline));
        }

        if let Some(summary) = summary_text(entry, options.display, options.card_summary_width) {
            if !summary.is_empty() {
                let _ = write!(
                    out,
                    "{}\n\n",
                    highlight_escaped(&summary, &matchers, color, escape_markdown)
                );
            }
        }

        out.push_str("---\n\n");
    }

    out
}

/// The Markdown document converted to a standalone HTML page.
pub fn render_html(report: &Report<'_>, options: &RenderOptions) -> String {
    let markdown = render_markdown(report, options);
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, Parser::new(&markdown));

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>feedsift</title>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

#[derive(Serialize)]
struct JsonReport<'a> {
    keywords: &'a [String],
    mode: MatchMode,
    display: DisplayMode,
    fetched: usize,
    matched: usize,
    page: usize,
    total_pages: usize,
    entries: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    title: String,
    link: &'a str,
    authors: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

/// Machine-readable page of results. Text is plain, without emphasis markup.
pub fn render_json(report: &Report<'_>, options: &RenderOptions) -> Result<String, RenderError> {
    let entries = report
        .page
        .entries
        .iter()
        .map(|entry| JsonEntry {
            title: strip_html(&entry.title),
            link: &entry.link,
            authors: &entry.authors,
            published: entry.published,
            summary: summary_text(entry, options.display, options.card_summary_width),
        })
        .collect();

    let doc = JsonReport {
        keywords: report.keywords.as_slice(),
        mode: report.mode,
        display: options.display,
        fetched: report.fetched,
        matched: report.page.total_entries,
        page: report.page.number,
        total_pages: report.page.total_pages,
        entries,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn byline(entry: &FeedEntry) -> Option<String> {
    let date = entry.published.map(|d| d.format("%Y-%m-%d").to_string());
    match (entry.author_line(), date) {
        (Some(authors), Some(date)) => Some(format!("{authors} ({date})")),
        (Some(authors), None) => Some(authors),
        (None, Some(date)) => Some(date),
        (None, None) => None,
    }
}

/// Backslash-escape the characters that would otherwise start Markdown
/// syntax or raw HTML inside feed text.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '[' | ']' | '<' | '>' | '#' | '!') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_link(link: &str) -> String {
    link.replace(' ', "%20").replace('(', "%28").replace(')', "%29")
}
