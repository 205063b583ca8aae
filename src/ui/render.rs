//! Render functions for the TUI.
//!
//! Lays out the keyword panel, the results panel and the status bar, and
//! draws the help overlay on top when it is open.

use crate::app::App;
use crate::util::{display_width, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{help, results, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
///
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // At truly minimal dimensions nothing meaningful fits
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_keyword_panel(f, app, chunks[0]);
    results::render(f, app, chunks[1]);
    status::render(f, app, chunks[2]);

    if app.show_help {
        help::render(f, app);
    }
}

/// Keyword field on the first line, the parsed keyword list and selectors
/// on the second.
fn render_keyword_panel(f: &mut Frame, app: &App, area: Rect) {
    let border = if app.editing {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" Keywords | Match: {} ", app.match_mode.label()));

    let inner_width = area.width.saturating_sub(2) as usize;

    let input = strip_control_chars(&app.keyword_input);
    let input_line = if app.editing {
        // Keep the cursor end of the field visible
        let visible = tail_to_width(&input, inner_width.saturating_sub(3));
        Line::from(vec![
            Span::styled("> ", app.style("input_editing")),
            Span::styled(visible.to_string(), app.style("input_editing")),
            Span::styled("_", app.style("input_editing")),
        ])
    } else if input.is_empty() {
        Line::styled("(no keywords, press / to edit)", app.style("entry_meta"))
    } else {
        Line::styled(
            truncate_to_width(&input, inner_width).into_owned(),
            app.style("input"),
        )
    };

    let keywords = app.parsed_keywords();
    let mut chips = Vec::with_capacity(keywords.len() * 2);
    for keyword in keywords.iter() {
        chips.push(Span::styled(
            format!("[{}]", strip_control_chars(keyword)),
            app.style("keyword"),
        ));
        chips.push(Span::raw(" "));
    }
    if chips.is_empty() {
        chips.push(Span::styled("no keywords", app.style("entry_meta")));
    }

    let paragraph = Paragraph::new(vec![input_line, Line::from(chips)]).block(block);
    f.render_widget(paragraph, area);
}

/// The longest suffix of `s` that fits in `width` columns.
fn tail_to_width(s: &str, width: usize) -> &str {
    if display_width(s) <= width {
        return s;
    }
    let mut start = s.len();
    for (i, _) in s.char_indices().rev() {
        if display_width(&s[i..]) > width {
            break;
        }
        start = i;
    }
    &s[start..]
}
