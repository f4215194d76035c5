use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::components::centered_rect;
use crate::theme::ThemeColors;

struct KeyEntry {
    key: &'static str,
    description: &'static str,
}

struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const fn entry(key: &'static str, description: &'static str) -> KeyEntry {
    KeyEntry { key, description }
}

const TREE_KEYS: &[KeyEntry] = &[
    entry("j / ↓", "Move down"),
    entry("k / ↑", "Move up"),
    entry("Enter / Space / l / h", "Toggle folder, open note"),
    entry("Tab", "Switch to note panel"),
    entry("Mouse click", "Select row (folders toggle)"),
    entry("Mouse wheel", "Move selection"),
];

const NOTE_KEYS: &[KeyEntry] = &[
    entry("Space", "Cycle title / hints / content"),
    entry("← / a", "Previous section"),
    entry("→ / d", "Next section"),
    entry("j / k / PgUp / PgDn", "Scroll"),
    entry("e / Enter", "Edit note"),
    entry("Esc / Ctrl+S", "Save and leave edit mode"),
    entry("Tab / Esc", "Back to tree"),
];

const FILE_KEYS: &[KeyEntry] = &[
    entry("a", "New note"),
    entry("A", "New folder"),
    entry("N", "New top-level folder"),
    entry("d", "Delete selected entry"),
    entry("/ / Ctrl+F", "Search notes"),
];

const GENERAL_KEYS: &[KeyEntry] = &[
    entry("?", "Toggle this help"),
    entry("q / Ctrl+C", "Quit"),
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Tree",
        entries: TREE_KEYS,
    },
    KeyCategory {
        name: "Note",
        entries: NOTE_KEYS,
    },
    KeyCategory {
        name: "Files",
        entries: FILE_KEYS,
    },
    KeyCategory {
        name: "General",
        entries: GENERAL_KEYS,
    },
];

/// Key binding reference overlay.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors) -> Self {
        Self { theme }
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            "notetree key bindings",
            Style::default()
                .fg(self.theme.accent_fg)
                .add_modifier(Modifier::BOLD),
        ))];

        for category in CATEGORIES {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(
                    format!("── {} ", category.name),
                    Style::default()
                        .fg(self.theme.accent_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("─".repeat(30), Style::default().fg(self.theme.dim_fg)),
            ]));
            for entry in category.entries {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {:<24}", entry.key),
                        Style::default()
                            .fg(self.theme.note_hint_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(entry.description, Style::default().fg(self.theme.note_fg)),
                ]));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Press any key to close ",
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (area.width * 70 / 100).min(70);
        let height = (area.height * 85 / 100).min(40);
        let rect = centered_rect(width, height, area);

        Clear.render(rect, buf);
        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.dialog_bg));
        let inner = block.inner(rect);
        block.render(rect, buf);

        for (i, line) in self
            .build_content_lines()
            .iter()
            .take(inner.height as usize)
            .enumerate()
        {
            buf.set_line(
                inner.x + 1,
                inner.y + i as u16,
                line,
                inner.width.saturating_sub(2),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::dark_theme;

    #[test]
    fn all_categories_have_entries() {
        for cat in CATEGORIES {
            assert!(!cat.entries.is_empty(), "category '{}' is empty", cat.name);
        }
    }

    #[test]
    fn overlay_lists_bindings() {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 100, 50);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme).render(area, &mut buf);
        let content: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(content.contains("Help"));
        assert!(content.contains("New top-level folder"));
        assert!(content.contains("Cycle title / hints / content"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme).render(area, &mut buf);
    }
}
