use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Widget},
};

use crate::editor::EditBuffer;
use crate::theme::ThemeColors;

/// Note edit mode: line-number gutter, buffer text, and a block cursor.
pub struct EditorWidget<'a> {
    editor: &'a EditBuffer,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> EditorWidget<'a> {
    pub fn new(editor: &'a EditBuffer, theme: &'a ThemeColors) -> Self {
        Self {
            editor,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for EditorWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let gutter_w = self.editor.gutter_width();
        let code_width = inner.width.saturating_sub(gutter_w);
        if code_width == 0 {
            return;
        }
        let code_x = inner.x + gutter_w;
        let cursor_style = Style::default()
            .fg(self.theme.editor_cursor_fg)
            .bg(self.theme.editor_cursor_bg);

        for row in 0..inner.height {
            let line_idx = self.editor.scroll_offset + row as usize;
            let y = inner.y + row;

            let Some(text) = self.editor.lines.get(line_idx) else {
                buf.set_string(inner.x, y, "~", Style::default().fg(self.theme.dim_fg));
                continue;
            };
            let is_current = line_idx == self.editor.cursor_line;

            let number = format!("{:>width$} ", line_idx + 1, width = (gutter_w - 2) as usize);
            let gutter_style = if is_current {
                Style::default()
                    .fg(self.theme.editor_line_nr_current)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.editor_line_nr)
            };
            buf.set_span(inner.x, y, &Span::styled(number, gutter_style), gutter_w);
            buf.set_string(
                inner.x + gutter_w - 1,
                y,
                "│",
                Style::default().fg(self.theme.dim_fg),
            );

            let line_style = if is_current {
                Style::default()
                    .fg(self.theme.note_fg)
                    .bg(self.theme.editor_current_line_bg)
            } else {
                Style::default().fg(self.theme.note_fg)
            };
            if is_current {
                buf.set_style(Rect::new(code_x, y, code_width, 1), line_style);
            }

            for (col, ch) in text.chars().take(code_width as usize).enumerate() {
                let style = if is_current && col == self.editor.cursor_col {
                    cursor_style
                } else {
                    line_style
                };
                buf.set_string(code_x + col as u16, y, ch.to_string(), style);
            }

            // Cursor past the last char.
            if is_current && self.editor.cursor_col >= text.chars().count() {
                let cursor_x = code_x + self.editor.cursor_col as u16;
                if cursor_x < inner.x + inner.width {
                    buf.set_string(cursor_x, y, " ", cursor_style);
                }
            }
        }
    }
}
