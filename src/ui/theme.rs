//! Theme definitions for mindscape
//!
//! Built-in themes: Gruvbox, Nord, Dracula, and Paper (light).
//! One theme instance, applied globally.

use crate::config::ThemeName;
use crate::types::ColorTag;
use ratatui::style::{Color, Modifier, Style};

/// Complete theme with all required colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,

    // Accent colors
    pub accent: Color,
    pub accent_dim: Color,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    // UI element colors
    pub border: Color,
    pub border_focused: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
}

impl Theme {
    /// Create a theme from a theme name
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Gruvbox => Self::gruvbox(),
            ThemeName::Nord => Self::nord(),
            ThemeName::Dracula => Self::dracula(),
            ThemeName::Paper => Self::paper(),
        }
    }

    /// Gruvbox dark theme (default)
    pub fn gruvbox() -> Self {
        Self {
            bg: Color::Rgb(40, 40, 40),
            fg: Color::Rgb(235, 219, 178),
            fg_dim: Color::Rgb(146, 131, 116),
            accent: Color::Rgb(254, 128, 25),
            accent_dim: Color::Rgb(214, 93, 14),
            success: Color::Rgb(184, 187, 38),
            warning: Color::Rgb(250, 189, 47),
            error: Color::Rgb(251, 73, 52),
            border: Color::Rgb(80, 73, 69),
            border_focused: Color::Rgb(168, 153, 132),
            selection_bg: Color::Rgb(80, 73, 69),
            selection_fg: Color::Rgb(235, 219, 178),
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(236, 239, 244),
            fg_dim: Color::Rgb(76, 86, 106),
            accent: Color::Rgb(136, 192, 208),
            accent_dim: Color::Rgb(94, 129, 172),
            success: Color::Rgb(163, 190, 140),
            warning: Color::Rgb(235, 203, 139),
            error: Color::Rgb(191, 97, 106),
            border: Color::Rgb(59, 66, 82),
            border_focused: Color::Rgb(136, 192, 208),
            selection_bg: Color::Rgb(76, 86, 106),
            selection_fg: Color::Rgb(236, 239, 244),
        }
    }

    /// Dracula theme
    pub fn dracula() -> Self {
        Self {
            bg: Color::Rgb(40, 42, 54),
            fg: Color::Rgb(248, 248, 242),
            fg_dim: Color::Rgb(98, 114, 164),      // comment
            accent: Color::Rgb(189, 147, 249),     // purple
            accent_dim: Color::Rgb(139, 233, 253), // cyan
            success: Color::Rgb(80, 250, 123),     // green
            warning: Color::Rgb(241, 250, 140),    // yellow
            error: Color::Rgb(255, 85, 85),        // red
            border: Color::Rgb(68, 71, 90),        // current line
            border_focused: Color::Rgb(189, 147, 249),
            selection_bg: Color::Rgb(68, 71, 90),
            selection_fg: Color::Rgb(248, 248, 242),
        }
    }

    /// Paper theme (light, matches the PNG export background)
    pub fn paper() -> Self {
        Self {
            bg: Color::Rgb(243, 244, 246),
            fg: Color::Rgb(31, 41, 55),
            fg_dim: Color::Rgb(107, 114, 128),
            accent: Color::Rgb(236, 72, 153),     // palette pink
            accent_dim: Color::Rgb(219, 39, 119),
            success: Color::Rgb(22, 163, 74),
            warning: Color::Rgb(202, 138, 4),
            error: Color::Rgb(220, 38, 38),
            border: Color::Rgb(209, 213, 219),
            border_focused: Color::Rgb(236, 72, 153),
            selection_bg: Color::Rgb(229, 231, 235),
            selection_fg: Color::Rgb(31, 41, 55),
        }
    }

    // === STYLE HELPERS ===

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.selection_fg)
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border).bg(self.bg)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused).bg(self.bg)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success).bg(self.bg)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning).bg(self.bg)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error).bg(self.bg)
    }

    pub fn block_style(&self) -> Style {
        Style::default().bg(self.bg)
    }
}

/// Terminal color for a node's palette tag
pub fn node_color(tag: ColorTag) -> Color {
    let (r, g, b) = tag.rgb();
    Color::Rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_name() {
        let gruvbox = Theme::from_name(ThemeName::Gruvbox);
        assert_eq!(gruvbox.bg, Color::Rgb(40, 40, 40));

        let paper = Theme::from_name(ThemeName::Paper);
        assert_eq!(paper.bg, Color::Rgb(243, 244, 246));
    }

    #[test]
    fn test_node_color_maps_palette_hex() {
        assert_eq!(node_color(ColorTag::Pink), Color::Rgb(236, 72, 153));
        assert_eq!(node_color(ColorTag::Gray), Color::Rgb(209, 213, 219));
    }
}
