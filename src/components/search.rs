use std::collections::HashSet;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::SearchState;
use crate::components::centered_rect;
use crate::search::SearchResult;
use crate::theme::ThemeColors;

/// Search overlay: query input, result count, and ranked results with
/// matched characters highlighted.
pub struct SearchWidget<'a> {
    state: &'a SearchState,
    theme: &'a ThemeColors,
}

impl<'a> SearchWidget<'a> {
    pub fn new(state: &'a SearchState, theme: &'a ThemeColors) -> Self {
        Self { state, theme }
    }

    fn result_line(&self, result: &'a SearchResult, selected: bool, max_width: usize) -> Line<'a> {
        let mut spans = Vec::new();
        if selected {
            spans.push(Span::styled(
                "▸ ",
                Style::default()
                    .fg(self.theme.accent_fg)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw("  "));
        }

        let base_style = if selected {
            Style::default().fg(self.theme.tree_selected_fg)
        } else if result.is_folder {
            Style::default().fg(self.theme.tree_folder_fg)
        } else {
            Style::default().fg(self.theme.tree_file_fg)
        };
        let highlight_style = Style::default()
            .fg(self.theme.note_hint_fg)
            .add_modifier(Modifier::BOLD);

        // Group consecutive chars that share a style.
        let matched: HashSet<usize> = result.match_indices.iter().copied().collect();
        let mut used = 2usize;
        let mut run = String::new();
        let mut run_matched = false;
        for (i, ch) in result.display.chars().enumerate() {
            if used >= max_width {
                break;
            }
            let is_match = matched.contains(&i);
            if is_match != run_matched && !run.is_empty() {
                let style = if run_matched { highlight_style } else { base_style };
                spans.push(Span::styled(std::mem::take(&mut run), style));
            }
            run_matched = is_match;
            run.push(ch);
            used += 1;
        }
        if !run.is_empty() {
            let style = if run_matched { highlight_style } else { base_style };
            spans.push(Span::styled(run, style));
        }
        if result.is_folder && used < max_width {
            spans.push(Span::styled("/", base_style));
            used += 1;
        }

        if !result.snippet.is_empty() && used + 3 < max_width {
            spans.push(Span::styled(
                format!("  {}", result.snippet),
                Style::default().fg(self.theme.dim_fg),
            ));
        }
        Line::from(spans)
    }
}

impl<'a> Widget for SearchWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 5 || area.width < 20 {
            return;
        }

        let dialog_width = (area.width * 60 / 100).clamp(30, 90);
        let dialog_height = (area.height * 60 / 100).clamp(8, 30);
        let rect = centered_rect(dialog_width, dialog_height, area);

        Clear.render(rect, buf);

        let block = Block::default()
            .title(" Search Notes ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));

        let inner = block.inner(rect);
        block.render(rect, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        // Row 0: query with cursor
        let query = &self.state.query.input;
        let cursor = self.state.query.cursor_position;
        let (before, at, after) = match query[cursor..].chars().next() {
            Some(ch) => (
                &query[..cursor],
                &query[cursor..cursor + ch.len_utf8()],
                &query[cursor + ch.len_utf8()..],
            ),
            None => (query.as_str(), " ", ""),
        };
        let input_style = Style::default().fg(self.theme.note_fg);
        let input_line = Line::from(vec![
            Span::styled(
                "> ",
                Style::default()
                    .fg(self.theme.accent_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(before, input_style),
            Span::styled(
                at,
                Style::default()
                    .fg(self.theme.editor_cursor_fg)
                    .bg(self.theme.editor_cursor_bg),
            ),
            Span::styled(after, input_style),
        ]);
        buf.set_line(inner.x, inner.y, &input_line, inner.width);

        // Row 1: result count
        if inner.height > 1 {
            let count = self.state.results.len();
            let label = if query.is_empty() {
                "Type to search...".to_string()
            } else {
                format!("{} result{}", count, if count == 1 { "" } else { "s" })
            };
            let sep = Line::from(Span::styled(
                format!("─── {} ", label),
                Style::default().fg(self.theme.dim_fg),
            ));
            buf.set_line(inner.x, inner.y + 1, &sep, inner.width);
        }

        // Rows 2..: results, hint line at the bottom
        let results_top = 2u16;
        let visible = inner.height.saturating_sub(results_top + 1) as usize;
        let scroll = (self.state.selected_index + 1).saturating_sub(visible);

        for (i, result) in self
            .state
            .results
            .iter()
            .enumerate()
            .skip(scroll)
            .take(visible)
        {
            let y = inner.y + results_top + (i - scroll) as u16;
            let line = self.result_line(result, i == self.state.selected_index, inner.width as usize);
            buf.set_line(inner.x, y, &line, inner.width);
        }

        if inner.height > 3 {
            let hint = Line::from(Span::styled(
                "[Enter] Open  [Esc] Close  [↑↓] Navigate",
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM),
            ));
            buf.set_line(inner.x, inner.y + inner.height - 1, &hint, inner.width);
        }
    }
}
