//! Theme system for the TUI.
//!
//! `ThemeVariant` selects a Dark or Light `ColorPalette` of semantic roles;
//! `StyleMap` resolves role names to concrete ratatui styles at render time.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;
use std::str::FromStr;

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Keyword field --
    pub input: Style,
    pub input_editing: Style,
    pub keyword: Style,

    // -- Results --
    pub entry_title: Style,
    pub entry_selected: Style,
    pub entry_meta: Style,
    pub entry_summary: Style,
    pub highlight: Style,
    pub divider: Style,
    pub notice: Style,

    // -- Chrome --
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub status_bar: Style,
    pub status_error: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            input: Style::default(),
            input_editing: Style::default().fg(Color::Yellow),
            keyword: Style::default().fg(Color::Cyan),

            entry_title: Style::default().add_modifier(Modifier::BOLD),
            entry_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            entry_meta: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            entry_summary: Style::default(),
            highlight: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            divider: Style::default().fg(Color::DarkGray),
            notice: Style::default().fg(Color::Yellow),

            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        Self {
            input: Style::default().fg(Color::Black),
            input_editing: Style::default().fg(Color::Blue),
            keyword: Style::default().fg(Color::Blue),

            entry_title: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            entry_selected: Style::default().bg(Color::Blue).fg(Color::White),
            entry_meta: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            entry_summary: Style::default().fg(Color::Black),
            highlight: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            divider: Style::default().fg(Color::Gray),
            notice: Style::default().fg(Color::Magenta),

            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }

    /// Replace the highlight foreground with a configured color token.
    ///
    /// Accepts whatever ratatui parses (`red`, `lightblue`, `#ff8800`, an
    /// ANSI index). Anything else keeps the palette color.
    pub fn with_highlight_color(mut self, token: &str) -> Self {
        match Color::from_str(token) {
            Ok(color) => self.highlight = self.highlight.fg(color),
            Err(_) => {
                tracing::debug!(color = %token, "Highlight color has no terminal equivalent, keeping theme color");
            }
        }
        self
    }
}

/// All role names, in declaration order.
const ROLE_NAMES: [&str; 14] = [
    "input",
    "input_editing",
    "keyword",
    "entry_title",
    "entry_selected",
    "entry_meta",
    "entry_summary",
    "highlight",
    "divider",
    "notice",
    "panel_border",
    "panel_border_focused",
    "status_bar",
    "status_error",
];

/// String-keyed style lookup built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 14] = [
            p.input,
            p.input_editing,
            p.keyword,
            p.entry_title,
            p.entry_selected,
            p.entry_meta,
            p.entry_summary,
            p.highlight,
            p.divider,
            p.notice,
            p.panel_border,
            p.panel_border_focused,
            p.status_bar,
            p.status_error,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Style for `role`, or `Style::default()` for an unknown role.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_role_is_bold_red_by_default() {
        for variant in [ThemeVariant::Dark, ThemeVariant::Light] {
            let palette = variant.palette();
            assert_eq!(palette.highlight.fg, Some(Color::Red));
            assert!(palette.highlight.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn highlight_color_override() {
        let palette = ThemeVariant::Dark.palette().with_highlight_color("#ff8800");
        assert_eq!(palette.highlight.fg, Some(Color::Rgb(0xff, 0x88, 0x00)));
        assert!(palette.highlight.add_modifier.contains(Modifier::BOLD));

        let palette = ThemeVariant::Dark.palette().with_highlight_color("blue");
        assert_eq!(palette.highlight.fg, Some(Color::Blue));
    }

    #[test]
    fn unparseable_highlight_color_keeps_palette() {
        let palette = ThemeVariant::Light.palette().with_highlight_color("rebeccapurple");
        assert_eq!(palette.highlight.fg, Some(Color::Red));
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.entry_selected, light.entry_selected);
        assert_ne!(dark.status_bar, light.status_bar);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("dark"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("LIGHT"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
    }

    #[test]
    fn style_map_resolves_roles() {
        let palette = ThemeVariant::Dark.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("highlight"), palette.highlight);
        assert_eq!(sm.resolve("status_bar"), palette.status_bar);
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn style_map_has_every_role() {
        let sm = StyleMap::from_palette(&ThemeVariant::Dark.palette());
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
        for name in ROLE_NAMES {
            assert!(sm.map.contains_key(name), "Role '{}' missing from StyleMap", name);
        }
    }
}
