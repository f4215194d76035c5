use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::note::highlight::MarkdownHighlighter;
use crate::note::view::{DisplayMode, NoteDisplay, NoteView};
use crate::theme::ThemeColors;

/// Note panel: section title, the body for the current display mode, and a
/// footer with the mode and section position.
pub struct NoteWidget<'a> {
    note: &'a NoteView,
    highlighter: &'a MarkdownHighlighter,
    theme: &'a ThemeColors,
    word_wrap: bool,
    block: Option<Block<'a>>,
}

impl<'a> NoteWidget<'a> {
    pub fn new(
        note: &'a NoteView,
        highlighter: &'a MarkdownHighlighter,
        theme: &'a ThemeColors,
    ) -> Self {
        Self {
            note,
            highlighter,
            theme,
            word_wrap: true,
            block: None,
        }
    }

    pub fn word_wrap(mut self, wrap: bool) -> Self {
        self.word_wrap = wrap;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn message(&self, text: String, style: Style, area: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(text, style));
        buf.set_line(area.x, area.y, &line, area.width);
    }

    fn body_lines(&self, body: &str) -> Vec<Line<'static>> {
        match self.note.mode() {
            DisplayMode::Content => self.highlighter.highlight(body),
            DisplayMode::Hints => body
                .lines()
                .map(|l| {
                    Line::from(Span::styled(
                        l.to_string(),
                        Style::default().fg(self.theme.note_hint_fg),
                    ))
                })
                .collect(),
            DisplayMode::TitleOnly => vec![Line::from(Span::styled(
                "Space: reveal hints",
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::ITALIC),
            ))],
        }
    }

    fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let mode = format!("[{}]", self.note.mode().label());
        let position = self.note.footer();
        let gap = (area.width as usize).saturating_sub(mode.len() + position.chars().count());
        let line = Line::from(vec![
            Span::styled(mode, Style::default().fg(self.theme.accent_fg)),
            Span::raw(" ".repeat(gap)),
            Span::styled(position, Style::default().fg(self.theme.dim_fg)),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

impl<'a> Widget for NoteWidget<'a> {
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

        let (title, body) = match self.note.display() {
            NoteDisplay::Empty => {
                let style = Style::default().fg(self.theme.dim_fg);
                self.message("Select a note in the tree".into(), style, inner, buf);
                return;
            }
            NoteDisplay::Loading => {
                let style = Style::default().fg(self.theme.dim_fg);
                self.message("loading...".into(), style, inner, buf);
                return;
            }
            NoteDisplay::Error(msg) => {
                let style = Style::default().fg(self.theme.error_fg);
                self.message(format!("Error: {}", msg), style, inner, buf);
                return;
            }
            // The editor widget takes over the panel.
            NoteDisplay::Editing => return,
            NoteDisplay::Section { title, body } => (title, body),
        };

        let title = if title.is_empty() {
            self.note
                .path()
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        } else {
            title.to_string()
        };
        let title_line = Line::from(Span::styled(
            title,
            Style::default()
                .fg(self.theme.note_title_fg)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(inner.x, inner.y, &title_line, inner.width);

        if inner.height < 3 {
            return;
        }
        let footer_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
        self.render_footer(footer_area, buf);

        let body_area = Rect::new(inner.x, inner.y + 2, inner.width, inner.height - 3);
        if body_area.height == 0 {
            return;
        }
        let mut paragraph = Paragraph::new(self.body_lines(&body))
            .style(Style::default().fg(self.theme.note_fg))
            .scroll((self.note.scroll, 0));
        if self.word_wrap {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }
        paragraph.render(body_area, buf);
    }
}
