//! Help overlay: the live keybinding table followed by a short note on
//! keyword syntax. Overrides from the configuration file are reflected.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

const SECTIONS: [(Context, &str); 2] = [
    (Context::Global, "Results"),
    (Context::Editing, "Keyword field"),
];

/// One line of the help table before styling.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HelpRow {
    Heading(String),
    Binding { key: String, description: String },
    Note(String),
    Blank,
}

/// Bindings grouped by context, then the keyword syntax notes.
fn help_rows(app: &App) -> Vec<HelpRow> {
    let bindings = app.keybindings.all_bindings();
    let mut rows = Vec::with_capacity(bindings.len() + 12);

    for (context, heading) in &SECTIONS {
        let mut section = bindings
            .iter()
            .filter(|(c, ..)| c == context)
            .map(|(_, key, _, description)| HelpRow::Binding {
                key: key.clone(),
                description: description.to_string(),
            })
            .peekable();
        if section.peek().is_none() {
            continue;
        }
        rows.push(HelpRow::Heading(heading.to_string()));
        rows.extend(section);
        rows.push(HelpRow::Blank);
    }

    rows.push(HelpRow::Heading("Keywords".to_string()));
    rows.push(HelpRow::Note("Separate keywords with commas: galaxy, AGN, dwarf galaxy".into()));
    rows.push(HelpRow::Note("Whole words only, case-insensitive: AGN does not match MAGNETAR".into()));
    rows.push(HelpRow::Note(format!(
        "Current mode {}: {}",
        app.match_mode.label(),
        match app.match_mode {
            crate::filter::MatchMode::Any => "an entry needs one keyword",
            crate::filter::MatchMode::All => "an entry needs every keyword",
        }
    )));
    rows
}

fn to_table_row(row: HelpRow, app: &App) -> Row<'static> {
    match row {
        HelpRow::Heading(title) => Row::new(vec![
            Line::from(Span::styled(
                format!("-- {} --", title),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ])
        .style(app.style("keyword")),
        HelpRow::Binding { key, description } => Row::new(vec![format!("  {}", key), description]),
        HelpRow::Note(text) => {
            Row::new(vec![Line::from(""), Line::styled(text, app.style("entry_meta"))])
        }
        HelpRow::Blank => Row::new(vec![String::new(), String::new()]),
    }
}

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let rows = help_rows(app);
    // Two border lines and the header
    let visible_height = overlay.height.saturating_sub(3) as usize;
    let max_scroll = rows.len().saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);

    let title = if max_scroll > 0 {
        format!(" Help ({}/{}) ", scroll + 1, max_scroll + 1)
    } else {
        " Help (? to close) ".to_string()
    };

    let visible: Vec<Row> = rows
        .into_iter()
        .skip(scroll)
        .take(visible_height)
        .map(|row| to_table_row(row, app))
        .collect();

    let table = Table::new(visible, [Constraint::Length(14), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
                .bottom_margin(1),
        )
        .style(app.style("entry_summary"));
    f.render_widget(table, overlay);

    if scroll < max_scroll {
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height.saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        let hint = Span::styled(" j/k to scroll, ? or Esc to close ", app.style("entry_meta"));
        f.render_widget(Paragraph::new(Line::from(hint)), hint_area);
    }
}

/// Rectangle covering the given percentage of `area`, centered.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
