//! Results panel: the current page of matched entries with keyword
//! occurrences styled by the theme's `highlight` role.

use crate::app::{App, FetchOutcome};
use crate::feed::FeedEntry;
use crate::filter::{highlight_spans, HighlightSpan, KeywordMatchers};
use crate::render::{summary_text, NO_MATCHES_MESSAGE};
use crate::util::{strip_control_chars, strip_html};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

use super::loop_runner::SPINNER_FRAMES;

const SPINNER: [&str; SPINNER_FRAMES] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the results panel.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style(if app.editing { "panel_border" } else { "panel_border_focused" }))
        .title(panel_title(app));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.loading {
        let frame = SPINNER[app.spinner_frame % SPINNER_FRAMES];
        let notice = Paragraph::new(format!("{} Fetching {} ...", frame, app.feed_url))
            .style(app.style("notice"))
            .wrap(Wrap { trim: true });
        f.render_widget(notice, inner);
        return;
    }

    let page = match &app.outcome {
        None => {
            let notice = Paragraph::new(
                "Press / to enter keywords (comma-separated), Enter to fetch. ? shows all keys.",
            )
            .style(app.style("notice"))
            .wrap(Wrap { trim: true });
            f.render_widget(notice, inner);
            return;
        }
        Some(FetchOutcome::Failed(error)) => {
            let notice = Paragraph::new(format!("Fetch failed: {}", strip_control_chars(error)))
                .style(app.style("status_error"))
                .wrap(Wrap { trim: true });
            f.render_widget(notice, inner);
            return;
        }
        Some(FetchOutcome::Loaded { .. }) => match app.current_page() {
            Some(page) if !page.entries.is_empty() => page,
            _ => {
                let notice = Paragraph::new(NO_MATCHES_MESSAGE).style(app.style("notice"));
                f.render_widget(notice, inner);
                return;
            }
        },
    };

    let width = inner.width as usize;
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut selected_range = 0..0;

    for (i, entry) in page.entries.iter().enumerate() {
        let start = lines.len();
        lines.extend(entry_lines(app, entry, i == app.selected, width));
        if i == app.selected {
            selected_range = start..lines.len();
        }
        lines.push(Line::styled("─".repeat(width), app.style("divider")));
    }

    let scroll = scroll_for(selected_range, inner.height as usize);
    let paragraph = Paragraph::new(lines).scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, inner);
}

fn panel_title(app: &App) -> String {
    match (&app.outcome, app.current_page()) {
        (Some(FetchOutcome::Loaded { fetched, .. }), Some(page)) if page.total_entries > 0 => format!(
            " Results: {} of {} ({}) | {} | Page {}/{} ",
            page.total_entries,
            fetched,
            app.active_mode.label(),
            app.render_options.display,
            page.number,
            page.total_pages
        ),
        _ => format!(" Results | {} ", app.render_options.display),
    }
}

/// First visible line so that the selected entry is on screen, top-aligned
/// when it does not fit.
fn scroll_for(selected: Range<usize>, height: usize) -> usize {
    if height == 0 || selected.end <= height {
        0
    } else {
        (selected.end - height).min(selected.start)
    }
}

/// Title, byline and summary lines for one entry.
fn entry_lines(app: &App, entry: &FeedEntry, selected: bool, width: usize) -> Vec<Line<'static>> {
    let matchers = &app.active_matchers;
    let highlight = app.style("highlight");
    let mut title_style = app.style("entry_title");
    if selected {
        title_style = title_style.patch(app.style("entry_selected"));
    }

    let title = strip_control_chars(&strip_html(&entry.title)).into_owned();
    let mut lines = styled_lines(&title, matchers, width, title_style, title_style.patch(highlight));

    let date = entry.published.map(|d| d.format("%Y-%m-%d").to_string());
    let byline = match (entry.author_line(), date) {
        (Some(authors), Some(date)) => Some(format!("{} ({})", authors, date)),
        (authors, date) => authors.or(date),
    };
    if let Some(byline) = byline {
        let byline = strip_control_chars(&byline).into_owned();
        lines.extend(
            wrap_ranges(&byline, width)
                .into_iter()
                .map(|r| Line::styled(byline[r].to_string(), app.style("entry_meta"))),
        );
    }

    let options = &app.render_options;
    if let Some(summary) = summary_text(entry, options.display, options.card_summary_width) {
        let summary = strip_control_chars(&summary).into_owned();
        let base = app.style("entry_summary");
        lines.extend(styled_lines(&summary, matchers, width, base, base.patch(highlight)));
    }

    lines
}

/// Wrap `text` to `width` columns and style keyword occurrences.
fn styled_lines(
    text: &str,
    matchers: &KeywordMatchers,
    width: usize,
    base: Style,
    emphasis: Style,
) -> Vec<Line<'static>> {
    let spans = highlight_spans(text, matchers);
    wrap_ranges(text, width)
        .into_iter()
        .map(|range| line_with_highlights(text, range, &spans, base, emphasis))
        .collect()
}

/// One wrapped line, split into plain and emphasized spans.
fn line_with_highlights(
    text: &str,
    line: Range<usize>,
    highlights: &[HighlightSpan],
    base: Style,
    emphasis: Style,
) -> Line<'static> {
    let mut spans = Vec::new();
    let mut pos = line.start;

    for h in highlights.iter().filter(|h| h.start < line.end && h.end > line.start) {
        let start = h.start.max(line.start);
        let end = h.end.min(line.end);
        if start > pos {
            spans.push(Span::styled(text[pos..start].to_string(), base));
        }
        spans.push(Span::styled(text[start..end].to_string(), emphasis));
        pos = end;
    }
    if pos < line.end {
        spans.push(Span::styled(text[pos..line.end].to_string(), base));
    }

    Line::from(spans)
}

/// Greedy word wrap. Returns byte ranges of `text`, one per line; words
/// wider than `width` are split at character boundaries.
fn wrap_ranges(text: &str, width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    // (start, end, columns) of the line being built
    let mut current: Option<(usize, usize, usize)> = None;

    for word in words(text) {
        let word_width = columns(&text[word.clone()]);

        if let Some((start, end, cols)) = current {
            if cols + 1 + word_width <= width {
                current = Some((start, word.end, cols + 1 + word_width));
                continue;
            }
            lines.push(start..end);
        }

        let mut start = word.start;
        while columns(&text[start..word.end]) > width {
            let cut = start + split_at_columns(&text[start..word.end], width);
            lines.push(start..cut);
            start = cut;
        }
        current = Some((start, word.end, columns(&text[start..word.end])));
    }

    if let Some((start, end, _)) = current {
        lines.push(start..end);
    }
    lines
}

/// Byte ranges of the whitespace-separated words of `text`.
fn words(text: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                out.push(s..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push(s..text.len());
    }
    out
}

fn columns(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Byte length of the longest prefix of `s` that fits in `width` columns,
/// never less than one character.
fn split_at_columns(s: &str, width: usize) -> usize {
    let mut used = 0;
    for (i, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > width && i > 0 {
            return i;
        }
        used += w;
    }
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::KeywordSet;
    use ratatui::style::{Color, Modifier};

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_wrap_ranges_greedy() {
        let text = "Metallicity gradients in dwarf galaxy";
        let lines: Vec<&str> = wrap_ranges(text, 15).into_iter().map(|r| &text[r]).collect();
        assert_eq!(lines, ["Metallicity", "gradients in", "dwarf galaxy"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let text = "abcdefghij xy";
        let lines: Vec<&str> = wrap_ranges(text, 4).into_iter().map(|r| &text[r]).collect();
        assert_eq!(lines, ["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_wrap_wide_chars() {
        let text = "銀河系銀河";
        let lines: Vec<&str> = wrap_ranges(text, 4).into_iter().map(|r| &text[r]).collect();
        assert_eq!(lines, ["銀河", "系銀", "河"]);
    }

    #[test]
    fn test_wrap_empty_text() {
        assert!(wrap_ranges("", 10).is_empty());
        assert!(wrap_ranges("   ", 10).is_empty());
    }

    #[test]
    fn test_styled_lines_mark_keywords() {
        let matchers = KeywordMatchers::new(&KeywordSet::parse("agn"));
        let base = Style::default();
        let emphasis = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
        let lines = styled_lines("AGN feedback in MAGNETAR hosts", &matchers, 80, base, emphasis);

        assert_eq!(lines.len(), 1);
        let spans = &lines[0].spans;
        assert_eq!(spans[0].content, "AGN");
        assert_eq!(spans[0].style, emphasis);
        assert_eq!(spans[1].content, " feedback in MAGNETAR hosts");
        assert_eq!(spans[1].style, base);
    }

    #[test]
    fn test_highlight_split_across_wrapped_lines() {
        let matchers = KeywordMatchers::new(&KeywordSet::parse("dwarf galaxy"));
        let emphasis = Style::default().fg(Color::Red);
        let lines = styled_lines("A dwarf galaxy", &matchers, 8, Style::default(), emphasis);

        assert_eq!(lines.iter().map(text_of).collect::<Vec<_>>(), ["A dwarf", "galaxy"]);
        assert_eq!(lines[0].spans[1].content, "dwarf");
        assert_eq!(lines[0].spans[1].style, emphasis);
        assert_eq!(lines[1].spans[0].content, "galaxy");
        assert_eq!(lines[1].spans[0].style, emphasis);
    }

    #[test]
    fn test_scroll_keeps_selection_visible() {
        assert_eq!(scroll_for(0..3, 10), 0);
        assert_eq!(scroll_for(8..12, 10), 2);
        // Taller than the viewport: top-aligned
        assert_eq!(scroll_for(5..30, 10), 5);
    }
}
