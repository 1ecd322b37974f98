//! Theme definitions for pkgport
//!
//! Provides three built-in themes: Gruvbox, Nord, and Plain.
//! Each theme defines the handful of colors the line-based UI uses.

use crate::config::ThemeName;
use crossterm::style::{Attribute, Color, ContentStyle, Stylize};
use std::fmt::Display;

/// Complete theme with all required colors
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg_dim: Option<Color>,
    pub accent: Option<Color>,
    pub success: Option<Color>,
    pub warning: Option<Color>,
    pub error: Option<Color>,
}

impl Theme {
    /// Create a theme from a theme name
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Gruvbox => Self::gruvbox(),
            ThemeName::Nord => Self::nord(),
            ThemeName::Plain => Self::plain(),
        }
    }

    /// Gruvbox dark theme (default)
    pub fn gruvbox() -> Self {
        Self {
            fg_dim: Some(Color::Rgb { r: 146, g: 131, b: 116 }),  // #928374
            accent: Some(Color::Rgb { r: 254, g: 128, b: 25 }),   // #fe8019
            success: Some(Color::Rgb { r: 184, g: 187, b: 38 }),  // #b8bb26
            warning: Some(Color::Rgb { r: 250, g: 189, b: 47 }),  // #fabd2f
            error: Some(Color::Rgb { r: 251, g: 73, b: 52 }),     // #fb4934
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            fg_dim: Some(Color::Rgb { r: 76, g: 86, b: 106 }),    // #4c566a
            accent: Some(Color::Rgb { r: 136, g: 192, b: 208 }),  // #88c0d0
            success: Some(Color::Rgb { r: 163, g: 190, b: 140 }), // #a3be8c
            warning: Some(Color::Rgb { r: 235, g: 203, b: 139 }), // #ebcb8b
            error: Some(Color::Rgb { r: 191, g: 97, b: 106 }),    // #bf616a
        }
    }

    /// No escape codes at all; used for `--no-color`, pipes and tests
    pub fn plain() -> Self {
        Self {
            fg_dim: None,
            accent: None,
            success: None,
            warning: None,
            error: None,
        }
    }

    fn paint(color: Option<Color>, bold: bool, text: impl Display) -> String {
        let Some(color) = color else {
            return text.to_string();
        };
        let mut style = ContentStyle::new().with(color);
        if bold {
            style = style.attribute(Attribute::Bold);
        }
        style.apply(text).to_string()
    }

    /// Title/header style
    pub fn title(&self, text: impl Display) -> String {
        Self::paint(self.accent, true, text)
    }

    /// Dimmed text style
    pub fn dim(&self, text: impl Display) -> String {
        Self::paint(self.fg_dim, false, text)
    }

    pub fn accent(&self, text: impl Display) -> String {
        Self::paint(self.accent, false, text)
    }

    /// Success message style
    pub fn success(&self, text: impl Display) -> String {
        Self::paint(self.success, false, text)
    }

    /// Warning message style
    pub fn warning(&self, text: impl Display) -> String {
        Self::paint(self.warning, false, text)
    }

    /// Error message style
    pub fn error(&self, text: impl Display) -> String {
        Self::paint(self.error, true, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        let gruvbox = Theme::from_name(ThemeName::Gruvbox);
        assert_eq!(gruvbox.accent, Some(Color::Rgb { r: 254, g: 128, b: 25 }));

        let nord = Theme::from_name(ThemeName::Nord);
        assert_eq!(nord.accent, Some(Color::Rgb { r: 136, g: 192, b: 208 }));

        let plain = Theme::from_name(ThemeName::Plain);
        assert_eq!(plain.accent, None);
    }

    #[test]
    fn test_plain_theme_emits_no_escapes() {
        let theme = Theme::plain();
        assert_eq!(theme.title("Import"), "Import");
        assert_eq!(theme.error(42), "42");
    }

    #[test]
    fn test_colored_themes_wrap_text() {
        for name in ThemeName::all() {
            if *name == ThemeName::Plain {
                continue;
            }
            let painted = Theme::from_name(*name).success("ok");
            assert!(painted.contains("ok"));
            assert!(painted.contains('\u{1b}'));
        }
    }
}
