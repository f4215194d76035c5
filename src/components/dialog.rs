use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::{AppMode, DialogKind, DialogState};
use crate::components::centered_rect;
use crate::theme::ThemeColors;

/// Modal overlay for the create prompts and the delete confirmation.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    dialog_state: &'a DialogState,
    theme: &'a ThemeColors,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, dialog_state: &'a DialogState, theme: &'a ThemeColors) -> Self {
        Self {
            mode,
            dialog_state,
            theme,
        }
    }

    /// Clear and draw the dialog box, returning its inner area.
    fn frame(
        &self,
        title: &str,
        size: (u16, u16),
        danger: bool,
        area: Rect,
        buf: &mut Buffer,
    ) -> Rect {
        let rect = centered_rect(size.0, size.1, area);
        Clear.render(rect, buf);

        let border = if danger {
            self.theme.error_fg
        } else {
            self.theme.dialog_border_fg
        };
        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        block.render(rect, buf);
        inner
    }

    fn hint(&self, text: &str, inner: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(
            text.to_string(),
            Style::default()
                .fg(self.theme.dim_fg)
                .add_modifier(Modifier::DIM),
        ));
        buf.set_line(inner.x, inner.y + inner.height - 1, &line, inner.width);
    }

    fn render_input(&self, kind: &DialogKind, area: Rect, buf: &mut Buffer) {
        let width = 50.min(area.width.saturating_sub(4));
        let inner = self.frame(kind.title(), (width, 5), false, area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let input = &self.dialog_state.input;
        let cursor = self.dialog_state.cursor_position;
        let (before, at, after) = match input[cursor..].chars().next() {
            Some(ch) => (
                &input[..cursor],
                &input[cursor..cursor + ch.len_utf8()],
                &input[cursor + ch.len_utf8()..],
            ),
            None => (input.as_str(), " ", ""),
        };

        // Keep the cursor in view on long input.
        let max_width = inner.width as usize;
        let before_chars = before.chars().count();
        let before_shown: String = if before_chars + 1 > max_width {
            before
                .chars()
                .skip(before_chars + 1 - max_width)
                .collect()
        } else {
            before.to_string()
        };

        let input_style = Style::default().fg(self.theme.note_fg);
        let line = Line::from(vec![
            Span::styled(before_shown, input_style),
            Span::styled(
                at,
                Style::default()
                    .fg(self.theme.editor_cursor_fg)
                    .bg(self.theme.editor_cursor_bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(after, input_style),
        ]);
        buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);

        if inner.height > 1 {
            self.hint("[Enter] Confirm  [Esc] Cancel", inner, buf);
        }
    }

    fn render_confirm(&self, kind: &DialogKind, name: &str, area: Rect, buf: &mut Buffer) {
        let width = (name.chars().count() as u16 + 10)
            .max(40)
            .min(area.width.saturating_sub(4));
        let inner = self.frame(kind.title(), (width, 7), true, area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let header = Line::from(Span::styled(
            "Delete this entry and everything in it?",
            Style::default()
                .fg(self.theme.error_fg)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(inner.x, inner.y, &header, inner.width);

        if inner.height > 2 {
            let target = Line::from(Span::styled(
                format!("  • {}", name),
                Style::default().fg(self.theme.note_fg),
            ));
            buf.set_line(inner.x, inner.y + 2, &target, inner.width);
        }
        if inner.height > 3 {
            self.hint("[y] Yes  [n/Esc] Cancel", inner, buf);
        }
    }
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let AppMode::Dialog(kind) = self.mode else {
            return;
        };

        match kind {
            DialogKind::CreateFile { .. }
            | DialogKind::CreateFolder { .. }
            | DialogKind::CreateRootFolder => self.render_input(kind, area, buf),
            DialogKind::DeleteConfirm { name, .. } => self.render_confirm(kind, name, area, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::operations::LocalFs;
    use crate::fs::tree::{FsTree, TreeOptions};
    use crate::theme::dark_theme;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn render(mode: &AppMode, state: &DialogState) -> String {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        DialogWidget::new(mode, state, &theme).render(area, &mut buf);
        buffer_to_string(&buf, area)
    }

    fn root_id() -> (TempDir, crate::fs::tree::NodeId) {
        let dir = TempDir::new().unwrap();
        let tree = FsTree::build(dir.path(), Arc::new(LocalFs), TreeOptions::default()).unwrap();
        let root = tree.root();
        (dir, root)
    }

    #[test]
    fn create_file_dialog_renders_input() {
        let (_dir, parent) = root_id();
        let mode = AppMode::Dialog(DialogKind::CreateFile { parent });
        let state = DialogState {
            input: "groceries".to_string(),
            cursor_position: 9,
        };
        let content = render(&mode, &state);
        assert!(content.contains("New Note"));
        assert!(content.contains("groceries"));
        assert!(content.contains("[Enter] Confirm"));
    }

    #[test]
    fn root_folder_dialog_has_own_title() {
        let content = render(
            &AppMode::Dialog(DialogKind::CreateRootFolder),
            &DialogState::default(),
        );
        assert!(content.contains("New Top-Level Folder"));
    }

    #[test]
    fn delete_dialog_names_target() {
        let (_dir, target) = root_id();
        let mode = AppMode::Dialog(DialogKind::DeleteConfirm {
            target,
            name: "biology".to_string(),
        });
        let content = render(&mode, &DialogState::default());
        assert!(content.contains("Delete Confirmation"));
        assert!(content.contains("• biology"));
        assert!(content.contains("[y] Yes"));
    }

    #[test]
    fn long_input_keeps_cursor_visible() {
        let mode = AppMode::Dialog(DialogKind::CreateRootFolder);
        let input = "x".repeat(70) + "END";
        let state = DialogState {
            cursor_position: input.len(),
            input,
        };
        let content = render(&mode, &state);
        assert!(content.contains("END"));
    }

    #[test]
    fn normal_mode_draws_nothing() {
        let content = render(&AppMode::Normal, &DialogState::default());
        assert!(content.trim().is_empty());
    }

    fn buffer_to_string(buf: &Buffer, area: Rect) -> String {
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }
}
