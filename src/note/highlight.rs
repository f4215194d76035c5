use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

/// Theme used when the configured one is unknown.
pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Load a theme from the built-in theme set by name, with fallback.
pub fn load_theme(theme_name: Option<&str>) -> Theme {
    let mut ts = ThemeSet::load_defaults();
    let name = theme_name.unwrap_or(DEFAULT_SYNTAX_THEME);
    ts.themes
        .remove(name)
        .or_else(|| ts.themes.remove(DEFAULT_SYNTAX_THEME))
        .unwrap_or_default()
}

fn syntect_color_to_ratatui(c: syntect::highlighting::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Markdown highlighter for note bodies. Built once; loading the syntax set
/// is the expensive part.
pub struct MarkdownHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
    enabled: bool,
}

impl MarkdownHighlighter {
    pub fn new(theme_name: Option<&str>, enabled: bool) -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_nonewlines(),
            theme: load_theme(theme_name),
            enabled,
        }
    }

    /// Plain-text passthrough, no syntax loading.
    pub fn disabled() -> Self {
        Self {
            syntaxes: SyntaxSet::new(),
            theme: Theme::default(),
            enabled: false,
        }
    }

    /// Style `text` line by line. Lines that fail to highlight fall back
    /// to plain spans.
    pub fn highlight(&self, text: &str) -> Vec<Line<'static>> {
        if !self.enabled {
            return text.lines().map(|l| Line::from(l.to_string())).collect();
        }

        let syntax = self
            .syntaxes
            .find_syntax_by_extension("md")
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        text.lines()
            .map(|line| match highlighter.highlight_line(line, &self.syntaxes) {
                Ok(ranges) => Line::from(
                    ranges
                        .into_iter()
                        .map(|(style, piece)| {
                            Span::styled(
                                piece.to_string(),
                                Style::default().fg(syntect_color_to_ratatui(style.foreground)),
                            )
                        })
                        .collect::<Vec<_>>(),
                ),
                Err(_) => Line::from(line.to_string()),
            })
            .collect()
    }
}
