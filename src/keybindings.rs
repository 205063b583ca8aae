//! Keybinding registry: maps key events to actions, with config overrides.
//!
//! Bindings are looked up per [`Context`]. While the keyword field is being
//! edited, keys with no binding in [`Context::Editing`] are typed into the
//! field instead.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NextPage,
    PrevPage,
    Fetch,
    EditKeywords,
    CommitKeywords,
    CancelEdit,
    ClearKeywords,
    ToggleMatchMode,
    CycleDisplayMode,
    OpenInBrowser,
    CycleTheme,
    ShowHelp,
    Back,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Select next entry",
            Self::NavUp => "Select previous entry",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::Fetch => "Fetch and filter articles",
            Self::EditKeywords => "Edit keywords",
            Self::CommitKeywords => "Apply keywords and fetch",
            Self::CancelEdit => "Discard keyword edits",
            Self::ClearKeywords => "Clear keyword field",
            Self::ToggleMatchMode => "Toggle ANY / ALL matching",
            Self::CycleDisplayMode => "Cycle display mode",
            Self::OpenInBrowser => "Open entry in browser",
            Self::CycleTheme => "Cycle theme",
            Self::ShowHelp => "Show help",
            Self::Back => "Dismiss help / status",
        }
    }
}

/// Dispatch context, which determines the active bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Browsing results.
    Global,
    /// Typing in the keyword field.
    Editing,
}

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Accepts single characters ("q", "/"), named keys ("Enter", "Esc",
/// "Tab", arrows, "PageDown", "Backspace", "Space"), "Ctrl+x" and "F1"
/// through "F12".
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| KeySpec::ctrl(c));
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "backspace" => Some(KeyCode::Backspace),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| KeySpec::plain(KeyCode::Char(c)))
}

/// Format a KeySpec for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, name)
}

/// Default bindings and user overrides, looked up in O(1).
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Every binding in registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action::*;
        use KeyCode::*;

        let global = [
            (KeySpec::plain(Char('q')), Quit),
            (KeySpec::ctrl('c'), Quit),
            (KeySpec::plain(Char('j')), NavDown),
            (KeySpec::plain(Down), NavDown),
            (KeySpec::plain(Char('k')), NavUp),
            (KeySpec::plain(Up), NavUp),
            (KeySpec::plain(Char('n')), NextPage),
            (KeySpec::plain(Right), NextPage),
            (KeySpec::plain(PageDown), NextPage),
            (KeySpec::plain(Char('p')), PrevPage),
            (KeySpec::plain(Left), PrevPage),
            (KeySpec::plain(PageUp), PrevPage),
            (KeySpec::plain(Char('f')), Fetch),
            (KeySpec::plain(Char('r')), Fetch),
            (KeySpec::plain(Char('/')), EditKeywords),
            (KeySpec::plain(Char('i')), EditKeywords),
            (KeySpec::plain(Char('m')), ToggleMatchMode),
            (KeySpec::plain(Char('v')), CycleDisplayMode),
            (KeySpec::plain(Char('o')), OpenInBrowser),
            (KeySpec::plain(Enter), OpenInBrowser),
            (KeySpec::plain(Char('T')), CycleTheme),
            (KeySpec::plain(Char('?')), ShowHelp),
            (KeySpec::plain(Esc), Back),
        ];
        for (key, action) in global {
            self.bind(Context::Global, key, action);
        }

        let editing = [
            (KeySpec::plain(Enter), CommitKeywords),
            (KeySpec::plain(Esc), CancelEdit),
            (KeySpec::ctrl('u'), ClearKeywords),
            (KeySpec::ctrl('c'), Quit),
        ];
        for (key, action) in editing {
            self.bind(Context::Editing, key, action);
        }
    }

    /// Apply user overrides from the config `[keybindings]` table.
    ///
    /// Keys are action names ("quit", "next_page"), values are key strings
    /// ("q", "Ctrl+d", "F5"). An override replaces every default key of the
    /// action, in each context the action was bound in. Returns one warning
    /// per entry that could not be applied.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Action bound to a key in `context`.
    ///
    /// Contexts do not fall back to each other: in [`Context::Editing`] only
    /// the editing bindings apply, so typed characters never trigger browse
    /// actions.
    pub fn action_for_key(&self, code: KeyCode, modifiers: KeyModifiers, context: Context) -> Option<Action> {
        self.lookup.get(&(context, KeySpec::new(code, modifiers))).copied()
    }

    /// Every binding as (context, key label, action, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name from config.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "next_page" | "nextpage" => Some(Action::NextPage),
        "prev_page" | "prevpage" | "previous_page" => Some(Action::PrevPage),
        "fetch" | "refresh" => Some(Action::Fetch),
        "edit_keywords" | "edit" => Some(Action::EditKeywords),
        "commit_keywords" | "apply" => Some(Action::CommitKeywords),
        "cancel_edit" | "cancel" => Some(Action::CancelEdit),
        "clear_keywords" | "clear" => Some(Action::ClearKeywords),
        "toggle_match_mode" | "match_mode" => Some(Action::ToggleMatchMode),
        "cycle_display_mode" | "display_mode" => Some(Action::CycleDisplayMode),
        "open_in_browser" | "open" => Some(Action::OpenInBrowser),
        "cycle_theme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "help" => Some(Action::ShowHelp),
        "back" => Some(Action::Back),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(reg: &KeybindingRegistry, code: KeyCode, ctx: Context) -> Option<Action> {
        reg.action_for_key(code, KeyModifiers::NONE, ctx)
    }

    #[test]
    fn test_default_browse_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Global), Some(Action::Quit));
        assert_eq!(lookup(&reg, KeyCode::Char('m'), Context::Global), Some(Action::ToggleMatchMode));
        assert_eq!(lookup(&reg, KeyCode::Char('v'), Context::Global), Some(Action::CycleDisplayMode));
        assert_eq!(lookup(&reg, KeyCode::Char('o'), Context::Global), Some(Action::OpenInBrowser));
        assert_eq!(lookup(&reg, KeyCode::Char('n'), Context::Global), Some(Action::NextPage));
        assert_eq!(lookup(&reg, KeyCode::Left, Context::Global), Some(Action::PrevPage));
        assert_eq!(lookup(&reg, KeyCode::Char('/'), Context::Global), Some(Action::EditKeywords));
    }

    #[test]
    fn test_editing_does_not_fall_back_to_browse_keys() {
        let reg = KeybindingRegistry::new();
        // Typed characters belong to the keyword field
        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Editing), None);
        assert_eq!(lookup(&reg, KeyCode::Char('m'), Context::Editing), None);
        assert_eq!(lookup(&reg, KeyCode::Enter, Context::Editing), Some(Action::CommitKeywords));
        assert_eq!(lookup(&reg, KeyCode::Esc, Context::Editing), Some(Action::CancelEdit));
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL, Context::Editing),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, KeyCode::F(12), Context::Global), None);
    }

    #[test]
    fn test_apply_overrides_replaces_all_default_keys() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("next_page".to_string(), "l".to_string())]);

        assert!(reg.apply_overrides(&overrides).is_empty());
        assert_eq!(lookup(&reg, KeyCode::Char('l'), Context::Global), Some(Action::NextPage));
        assert_eq!(lookup(&reg, KeyCode::Char('n'), Context::Global), None);
        assert_eq!(lookup(&reg, KeyCode::Right, Context::Global), None);
    }

    #[test]
    fn test_override_keeps_every_context() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([("quit".to_string(), "Ctrl+q".to_string())]);
        assert!(reg.apply_overrides(&overrides).is_empty());

        for ctx in [Context::Global, Context::Editing] {
            assert_eq!(
                reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, ctx),
                Some(Action::Quit)
            );
        }
        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Global), None);
    }

    #[test]
    fn test_apply_overrides_warnings() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([
            ("mark_all_read".to_string(), "a".to_string()),
            ("quit".to_string(), "Ctrl+Alt+Q".to_string()),
        ]);
        let mut warnings = reg.apply_overrides(&overrides);
        warnings.sort();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Cannot parse key"));
        assert!(warnings[1].contains("Unknown action"));
        // Failed override leaves the default in place
        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Global), Some(Action::Quit));
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("PageDown"), Some(KeySpec::plain(KeyCode::PageDown)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::plain(KeyCode::Char(' '))));
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("?"), Some(KeySpec::plain(KeyCode::Char('?'))));
        assert_eq!(parse_key_string("é"), Some(KeySpec::plain(KeyCode::Char('é'))));
        assert_eq!(parse_key_string("qq"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char('m'))), "m");
        assert_eq!(format_key(&KeySpec::ctrl('u')), "Ctrl+u");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char(' '))), "Space");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::PageDown)), "PageDown");
    }

    #[test]
    fn test_all_bindings_cover_every_action() {
        let reg = KeybindingRegistry::new();
        let bound: Vec<Action> = reg.all_bindings().into_iter().map(|(_, _, a, _)| a).collect();
        for action in [
            Action::Quit,
            Action::Fetch,
            Action::ToggleMatchMode,
            Action::CycleDisplayMode,
            Action::CommitKeywords,
            Action::ShowHelp,
        ] {
            assert!(bound.contains(&action), "{action:?} has no default key");
        }
    }
}
