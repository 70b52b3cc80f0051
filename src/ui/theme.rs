// Theme support for the TUI
//
// Color palettes selected by the `theme` config key. "auto" uses the
// terminal's ANSI palette, named themes use true color (RGB).

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

/// Color palette for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    // Chrome
    pub title: Color,
    pub border: Color,
    pub border_focused: Color,
    pub border_type: BorderType,
    pub highlight: Color,
    pub selection_bg: Color,
    pub status_bar: Color,

    // Pane state
    pub dirty: Color,
    pub locked: Color,
    pub action_key: Color,

    // Messages
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Theme {
    /// Names accepted by [`Theme::by_name`]
    pub const NAMES: [&'static str; 5] = ["auto", "dark", "light", "nord", "gruvbox"];

    /// Load theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dark" => Self::dark(),
            "light" => Self::light(),
            "nord" => Self::nord(),
            "gruvbox" => Self::gruvbox(),
            _ => Self::auto(), // "auto" or unknown
        }
    }

    /// Auto theme - uses terminal's ANSI palette
    pub fn auto() -> Self {
        Self {
            name: "auto".to_string(),
            background: Color::Reset,
            foreground: Color::Reset,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::White,
            border_focused: Color::Cyan,
            border_type: BorderType::Plain,
            highlight: Color::Yellow,
            selection_bg: Color::DarkGray,
            status_bar: Color::Green,
            dirty: Color::Yellow,
            locked: Color::Red,
            action_key: Color::Cyan,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color::Rgb(0x1e, 0x1e, 0x2e),
            foreground: Color::Rgb(0xcd, 0xd6, 0xf4),
            muted: Color::Rgb(0x6c, 0x70, 0x86),
            title: Color::Rgb(0x89, 0xb4, 0xfa),         // blue
            border: Color::Rgb(0x45, 0x47, 0x5a),
            border_focused: Color::Rgb(0x89, 0xdc, 0xeb), // sky
            border_type: BorderType::Rounded,
            highlight: Color::Rgb(0xf9, 0xe2, 0xaf),     // yellow
            selection_bg: Color::Rgb(0x31, 0x32, 0x44),
            status_bar: Color::Rgb(0xa6, 0xe3, 0xa1),    // green
            dirty: Color::Rgb(0xfa, 0xb3, 0x87),         // peach
            locked: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
            action_key: Color::Rgb(0x94, 0xe2, 0xd5),    // teal
            error: Color::Rgb(0xf3, 0x8b, 0xa8),
            warning: Color::Rgb(0xf9, 0xe2, 0xaf),
            info: Color::Rgb(0x89, 0xb4, 0xfa),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color::Rgb(0xef, 0xf1, 0xf5),
            foreground: Color::Rgb(0x4c, 0x4f, 0x69),
            muted: Color::Rgb(0x9c, 0xa0, 0xb0),
            title: Color::Rgb(0x1e, 0x66, 0xf5),
            border: Color::Rgb(0xbc, 0xc0, 0xcc),
            border_focused: Color::Rgb(0x04, 0xa5, 0xe5),
            border_type: BorderType::Rounded,
            highlight: Color::Rgb(0xdf, 0x8e, 0x1d),
            selection_bg: Color::Rgb(0xcc, 0xd0, 0xda),
            status_bar: Color::Rgb(0x40, 0xa0, 0x2b),
            dirty: Color::Rgb(0xfe, 0x64, 0x0b),
            locked: Color::Rgb(0xd2, 0x0f, 0x39),
            action_key: Color::Rgb(0x17, 0x92, 0x99),
            error: Color::Rgb(0xd2, 0x0f, 0x39),
            warning: Color::Rgb(0xdf, 0x8e, 0x1d),
            info: Color::Rgb(0x1e, 0x66, 0xf5),
        }
    }

    /// Nord theme - https://nordtheme.com
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            background: Color::Rgb(0x2e, 0x34, 0x40),
            foreground: Color::Rgb(0xd8, 0xde, 0xe9),
            muted: Color::Rgb(0x4c, 0x56, 0x6a),          // polar night
            title: Color::Rgb(0x88, 0xc0, 0xd0),          // frost cyan
            border: Color::Rgb(0x4c, 0x56, 0x6a),
            border_focused: Color::Rgb(0x88, 0xc0, 0xd0),
            border_type: BorderType::Plain,
            highlight: Color::Rgb(0xeb, 0xcb, 0x8b),      // aurora yellow
            selection_bg: Color::Rgb(0x43, 0x4c, 0x5e),
            status_bar: Color::Rgb(0xa3, 0xbe, 0x8c),     // aurora green
            dirty: Color::Rgb(0xd0, 0x87, 0x70),          // aurora orange
            locked: Color::Rgb(0xbf, 0x61, 0x6a),         // aurora red
            action_key: Color::Rgb(0x8f, 0xbc, 0xbb),     // frost teal
            error: Color::Rgb(0xbf, 0x61, 0x6a),
            warning: Color::Rgb(0xeb, 0xcb, 0x8b),
            info: Color::Rgb(0x81, 0xa1, 0xc1),
        }
    }

    /// Gruvbox theme - https://github.com/morhetz/gruvbox
    pub fn gruvbox() -> Self {
        Self {
            name: "gruvbox".to_string(),
            background: Color::Rgb(0x28, 0x28, 0x28),
            foreground: Color::Rgb(0xeb, 0xdb, 0xb2),
            muted: Color::Rgb(0x92, 0x83, 0x74),          // gray
            title: Color::Rgb(0x83, 0xa5, 0x98),          // aqua
            border: Color::Rgb(0x92, 0x83, 0x74),
            border_focused: Color::Rgb(0x83, 0xa5, 0x98),
            border_type: BorderType::Plain,
            highlight: Color::Rgb(0xfa, 0xbd, 0x2f),      // yellow
            selection_bg: Color::Rgb(0x3c, 0x38, 0x36),
            status_bar: Color::Rgb(0xb8, 0xbb, 0x26),     // green
            dirty: Color::Rgb(0xfe, 0x80, 0x19),          // orange
            locked: Color::Rgb(0xfb, 0x49, 0x34),         // red
            action_key: Color::Rgb(0x8e, 0xc0, 0x7c),
            error: Color::Rgb(0xfb, 0x49, 0x34),
            warning: Color::Rgb(0xfa, 0xbd, 0x2f),
            info: Color::Rgb(0x83, 0xa5, 0x98),
        }
    }

    /// Border color for a region based on focus state
    pub fn border_for(&self, focused: bool) -> Color {
        if focused {
            self.border_focused
        } else {
            self.border
        }
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::auto()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_falls_back_to_auto() {
        for name in Theme::NAMES {
            assert_eq!(Theme::by_name(name).name, name);
        }
        assert_eq!(Theme::by_name("DARK").name, "dark");
        assert_eq!(Theme::by_name("no-such-theme").name, "auto");
    }
}
