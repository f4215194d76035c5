use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const TREE_HINTS: &str = " a:note  A:folder  d:del  /:search  ?:help ";
const NOTE_HINTS: &str = " space:mode  ←→:section  e:edit  tab:tree ";
const EDIT_HINTS: &str = " esc/ctrl+s:save ";

/// Which key hints the bar shows on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintSet {
    Tree,
    Note,
    Edit,
}

impl HintSet {
    fn text(self) -> &'static str {
        match self {
            Self::Tree => TREE_HINTS,
            Self::Note => NOTE_HINTS,
            Self::Edit => EDIT_HINTS,
        }
    }
}

/// Status bar: selected path and key hints, or a timed message.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    theme: &'a ThemeColors,
    hints: HintSet,
    status_message: Option<&'a str>,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            theme,
            hints: HintSet::Tree,
            status_message: None,
            is_error: false,
        }
    }

    pub fn hints(mut self, hints: HintSet) -> Self {
        self.hints = hints;
        self
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }
}

/// Keep the tail of `s` within `budget` chars, marking the cut with `...`.
fn truncate_left(s: &str, budget: usize) -> String {
    let len = s.chars().count();
    if len <= budget {
        return s.to_string();
    }
    if budget <= 3 {
        return s.chars().take(budget).collect();
    }
    let tail: String = s.chars().skip(len - (budget - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        let bar_style = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), bar_style);

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                bar_style.fg(self.theme.success_fg)
            };
            let shown: String = msg.chars().take(width).collect();
            let padded = format!("{:<width$}", shown, width = width);
            buf.set_line(area.x, area.y, &Line::from(Span::styled(padded, style)), area.width);
            return;
        }

        let hints = self.hints.text();
        let hints_len = hints.chars().count();
        let path_budget = width.saturating_sub(hints_len + 1);
        let path = truncate_left(self.path_str, path_budget);
        let gap = width
            .saturating_sub(path.chars().count())
            .saturating_sub(hints_len);

        let mut spans = vec![Span::styled(format!(" {}", path), bar_style)];
        if gap > 1 {
            spans.push(Span::styled(" ".repeat(gap - 1), bar_style));
            spans.push(Span::styled(
                hints,
                bar_style.fg(self.theme.dim_fg),
            ));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
