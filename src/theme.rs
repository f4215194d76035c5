//! Colour palettes and their resolution from the `[theme]` config section.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

/// All runtime colours used by the widgets. Built once at startup by
/// [`resolve_theme`] and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColors {
    // Tree panel
    pub tree_fg: Color,
    pub tree_selected_bg: Color,
    pub tree_selected_fg: Color,
    pub tree_hover_bg: Color,
    pub tree_folder_fg: Color,
    pub tree_file_fg: Color,

    // Note panel
    pub note_fg: Color,
    pub note_title_fg: Color,
    pub note_hint_fg: Color,

    pub status_bg: Color,
    pub status_fg: Color,

    pub border_fg: Color,
    pub border_focused_fg: Color,

    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Not configurable
    pub error_fg: Color,
    pub success_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,

    pub editor_line_nr: Color,
    pub editor_line_nr_current: Color,
    pub editor_cursor_fg: Color,
    pub editor_cursor_bg: Color,
    pub editor_current_line_bg: Color,
}

/// Tokyo Night.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(192, 202, 245),          // #c0caf5
        tree_selected_bg: Color::Rgb(41, 46, 66),    // #292e42
        tree_selected_fg: Color::Rgb(192, 202, 245), // #c0caf5
        tree_hover_bg: Color::Rgb(30, 32, 48),       // #1e2030
        tree_folder_fg: Color::Rgb(122, 162, 247),   // #7aa2f7
        tree_file_fg: Color::Rgb(169, 177, 214),     // #a9b1d6

        note_fg: Color::Rgb(169, 177, 214),
        note_title_fg: Color::Rgb(187, 154, 247), // #bb9af7
        note_hint_fg: Color::Rgb(224, 175, 104),  // #e0af68

        status_bg: Color::Rgb(22, 22, 30), // #16161e
        status_fg: Color::Rgb(169, 177, 214),

        border_fg: Color::Rgb(59, 66, 97),           // #3b4261
        border_focused_fg: Color::Rgb(122, 162, 247), // #7aa2f7

        dialog_bg: Color::Rgb(31, 35, 53), // #1f2335
        dialog_border_fg: Color::Rgb(122, 162, 247),

        error_fg: Color::Rgb(247, 118, 142),   // #f7768e
        success_fg: Color::Rgb(158, 206, 106), // #9ece6a
        accent_fg: Color::Rgb(125, 207, 255),  // #7dcfff
        dim_fg: Color::Rgb(86, 95, 137),       // #565f89

        editor_line_nr: Color::Rgb(59, 66, 97),
        editor_line_nr_current: Color::Rgb(224, 175, 104),
        editor_cursor_fg: Color::Rgb(26, 27, 38), // #1a1b26
        editor_cursor_bg: Color::Rgb(192, 202, 245),
        editor_current_line_bg: Color::Rgb(41, 46, 66),
    }
}

/// Tokyo Night Day.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(55, 96, 191),            // #3760bf
        tree_selected_bg: Color::Rgb(196, 200, 218), // #c4c8da
        tree_selected_fg: Color::Rgb(55, 96, 191),
        tree_hover_bg: Color::Rgb(208, 213, 227), // #d0d5e3
        tree_folder_fg: Color::Rgb(46, 125, 233), // #2e7de9
        tree_file_fg: Color::Rgb(97, 114, 176),   // #6172b0

        note_fg: Color::Rgb(55, 96, 191),
        note_title_fg: Color::Rgb(152, 84, 241), // #9854f1
        note_hint_fg: Color::Rgb(140, 108, 62),  // #8c6c3e

        status_bg: Color::Rgb(225, 226, 231), // #e1e2e7
        status_fg: Color::Rgb(55, 96, 191),

        border_fg: Color::Rgb(168, 174, 203), // #a8aecb
        border_focused_fg: Color::Rgb(46, 125, 233),

        dialog_bg: Color::Rgb(233, 233, 236), // #e9e9ec
        dialog_border_fg: Color::Rgb(46, 125, 233),

        error_fg: Color::Rgb(245, 42, 101),  // #f52a65
        success_fg: Color::Rgb(88, 117, 57), // #587539
        accent_fg: Color::Rgb(0, 113, 151),  // #007197
        dim_fg: Color::Rgb(132, 140, 181),   // #848cb5

        editor_line_nr: Color::Rgb(168, 174, 203),
        editor_line_nr_current: Color::Rgb(140, 108, 62),
        editor_cursor_fg: Color::Rgb(225, 226, 231),
        editor_cursor_bg: Color::Rgb(55, 96, 191),
        editor_current_line_bg: Color::Rgb(208, 213, 227),
    }
}

/// Parse `"#aabbcc"` (the `#` is optional). `None` for anything else.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// `"light"` and `"dark"` pick a palette; `"custom"` starts from dark and
/// applies the hex overrides. Unknown names fall back to dark.
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref().unwrap_or("dark") {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    let overrides: [(&Option<String>, &mut Color); 14] = [
        (&custom.tree_fg, &mut theme.tree_fg),
        (&custom.tree_selected_bg, &mut theme.tree_selected_bg),
        (&custom.tree_selected_fg, &mut theme.tree_selected_fg),
        (&custom.tree_hover_bg, &mut theme.tree_hover_bg),
        (&custom.tree_folder_fg, &mut theme.tree_folder_fg),
        (&custom.tree_file_fg, &mut theme.tree_file_fg),
        (&custom.note_fg, &mut theme.note_fg),
        (&custom.note_title_fg, &mut theme.note_title_fg),
        (&custom.note_hint_fg, &mut theme.note_hint_fg),
        (&custom.status_bg, &mut theme.status_bg),
        (&custom.status_fg, &mut theme.status_fg),
        (&custom.border_fg, &mut theme.border_fg),
        (&custom.dialog_bg, &mut theme.dialog_bg),
        (&custom.dialog_border_fg, &mut theme.dialog_border_fg),
    ];
    for (hex, slot) in overrides {
        if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
            *slot = color;
        }
    }
}
