//! Input handling for the TUI.
//!
//! Keys are routed to the help overlay when it is open, to the keyword field
//! while it is being edited, and to the results view otherwise.

use crate::app::{App, AppEvent};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{open_selected, spawn_fetch};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Help overlay captures all keys while visible
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    // Terminals report `T` as Char('T') + SHIFT; bindings are stored
    // without SHIFT for printable keys.
    let modifiers = if matches!(code, KeyCode::Char(_)) {
        modifiers.difference(KeyModifiers::SHIFT)
    } else {
        modifiers
    };

    if app.editing {
        return Ok(handle_editing_input(app, code, modifiers, event_tx));
    }

    Ok(handle_browse_input(app, code, modifiers, event_tx))
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input while the keyword field has focus.
///
/// Bound editing keys run their action; any other printable key is typed
/// into the field.
fn handle_editing_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Editing) {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::CommitKeywords) => {
            app.commit_edit();
            start_fetch(app, event_tx);
        }
        Some(KbAction::CancelEdit) => app.cancel_edit(),
        Some(KbAction::ClearKeywords) => app.clear_input(),
        Some(_) => {}
        None => match code {
            KeyCode::Backspace => app.pop_input(),
            KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                app.push_input(c);
            }
            _ => {}
        },
    }
    Action::Continue
}

/// Handle input in the results view.
fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Global) {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::NextPage) => {
            if !app.next_page() {
                app.set_status("Already on the last page");
            }
        }
        Some(KbAction::PrevPage) => {
            if !app.prev_page() {
                app.set_status("Already on the first page");
            }
        }
        Some(KbAction::Fetch) => start_fetch(app, event_tx),
        Some(KbAction::EditKeywords) => app.begin_edit(),
        Some(KbAction::ToggleMatchMode) => {
            let mode = app.toggle_match_mode();
            app.set_status(format!("Match mode: {} (fetch to apply)", mode.label()));
        }
        Some(KbAction::CycleDisplayMode) => {
            let display = app.cycle_display_mode();
            app.set_status(format!("Display: {}", display));
        }
        Some(KbAction::OpenInBrowser) => open_selected(app),
        Some(KbAction::CycleTheme) => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        Some(KbAction::Back) => {
            app.status_message = None;
        }
        Some(KbAction::CommitKeywords | KbAction::CancelEdit | KbAction::ClearKeywords) | None => {}
    }
    Action::Continue
}

/// Fetch with the keywords in the field, or warn if there are none.
fn start_fetch(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(request) = app.begin_fetch() {
        tracing::info!(
            feed = %request.url,
            keywords = %request.keywords,
            mode = %request.mode,
            "Fetching feed"
        );
        spawn_fetch(app, request, event_tx);
    }
}
