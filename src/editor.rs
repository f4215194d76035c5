/// Editable text buffer backing the note edit mode.
///
/// Lines are stored without terminators and rejoined with the terminator the
/// seed text used; the cursor column counts chars, not bytes. There is no undo
/// history.
#[derive(Debug, Clone)]
pub struct EditBuffer {
    /// Lines of text in the buffer.
    pub lines: Vec<String>,
    /// Current cursor line (0-indexed).
    pub cursor_line: usize,
    /// Current cursor column in chars (0-indexed).
    pub cursor_col: usize,
    /// Whether the buffer has been modified since it was seeded.
    pub modified: bool,
    /// Vertical scroll offset (line index of topmost visible line).
    pub scroll_offset: usize,
    /// Visible height of the editor area (set during render).
    pub visible_height: usize,
    /// `"\r\n"` when the seed text's first line ended that way, else `"\n"`.
    line_ending: &'static str,
}

/// Spaces inserted by Tab.
const TAB_WIDTH: usize = 4;

impl EditBuffer {
    /// Seed a buffer from raw note text.
    pub fn new(content: &str) -> Self {
        let mut lines: Vec<String> = content.lines().map(String::from).collect();
        // A trailing newline becomes an empty last line so it survives `content()`.
        if content.ends_with('\n') || lines.is_empty() {
            lines.push(String::new());
        }

        Self {
            lines,
            cursor_line: 0,
            cursor_col: 0,
            modified: false,
            scroll_offset: 0,
            visible_height: 24,
            line_ending: detect_line_ending(content),
        }
    }

    /// The buffer as text, lines joined with the seed's line ending.
    pub fn content(&self) -> String {
        self.lines.join(self.line_ending)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Width of the line number gutter (digits + space + separator).
    pub fn gutter_width(&self) -> u16 {
        self.line_count().to_string().len() as u16 + 2
    }

    pub fn current_line_len(&self) -> usize {
        self.lines
            .get(self.cursor_line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    pub fn set_visible_height(&mut self, height: usize) {
        self.visible_height = height;
        self.ensure_cursor_visible();
    }

    fn clamp_cursor(&mut self) {
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len().saturating_sub(1);
        }
        self.cursor_col = self.cursor_col.min(self.current_line_len());
    }

    /// Scroll so the cursor stays inside the view with a small margin.
    pub fn ensure_cursor_visible(&mut self) {
        let margin = 2usize;
        if self.visible_height == 0 {
            return;
        }
        if self.cursor_line < self.scroll_offset + margin {
            self.scroll_offset = self.cursor_line.saturating_sub(margin);
        }
        let bottom = self.scroll_offset + self.visible_height;
        if self.cursor_line >= bottom.saturating_sub(margin) {
            self.scroll_offset = self
                .cursor_line
                .saturating_sub(self.visible_height.saturating_sub(margin + 1));
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────

    pub fn insert_char(&mut self, ch: char) {
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let byte_idx = char_to_byte_index(line, self.cursor_col);
            line.insert(byte_idx, ch);
            self.cursor_col += 1;
            self.modified = true;
        }
    }

    pub fn insert_tab(&mut self) {
        for _ in 0..TAB_WIDTH {
            self.insert_char(' ');
        }
    }

    /// Backspace. At column 0 the line joins the previous one.
    pub fn delete_char_before(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_line];
            let prev = char_to_byte_index(line, self.cursor_col - 1);
            line.remove(prev);
            self.cursor_col -= 1;
            self.modified = true;
        } else if self.cursor_line > 0 {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.lines[self.cursor_line].push_str(&current);
            self.modified = true;
            self.ensure_cursor_visible();
        }
    }

    /// Delete key. At end of line the next line joins this one.
    pub fn delete_char_at(&mut self) {
        if self.cursor_col < self.current_line_len() {
            let line = &mut self.lines[self.cursor_line];
            let idx = char_to_byte_index(line, self.cursor_col);
            line.remove(idx);
            self.modified = true;
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
            self.modified = true;
        }
    }

    /// Split the line at the cursor, carrying its leading whitespace over.
    pub fn insert_newline(&mut self) {
        let Some(line) = self.lines.get(self.cursor_line) else {
            return;
        };
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        let remainder = format!("{}{}", indent, &line[byte_idx..]);

        self.lines[self.cursor_line].truncate(byte_idx);
        self.lines.insert(self.cursor_line + 1, remainder);
        self.cursor_line += 1;
        self.cursor_col = indent.chars().count();
        self.modified = true;
        self.ensure_cursor_visible();
    }

    // ── Navigation ────────────────────────────────────────────────────

    pub fn move_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.ensure_cursor_visible();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    pub fn page_up(&mut self) {
        let jump = self.visible_height.max(1);
        self.cursor_line = self.cursor_line.saturating_sub(jump);
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    pub fn page_down(&mut self) {
        let jump = self.visible_height.max(1);
        self.cursor_line = (self.cursor_line + jump).min(self.lines.len().saturating_sub(1));
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }
}

/// Convert a char-based column index to a byte index in `s`.
fn detect_line_ending(content: &str) -> &'static str {
    match content.find('\n') {
        Some(i) if content[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

fn char_to_byte_index(s: &str, char_col: usize) -> usize {
    s.char_indices()
        .nth(char_col)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty_content() {
        let buf = EditBuffer::new("");
        assert_eq!(buf.lines, vec![""]);
        assert_eq!(buf.cursor_line, 0);
        assert!(!buf.modified);
    }

    #[test]
    fn test_content_round_trips_trailing_newline() {
        assert_eq!(EditBuffer::new("a\nb\n").content(), "a\nb\n");
        assert_eq!(EditBuffer::new("a\nb").content(), "a\nb");
        assert_eq!(EditBuffer::new("").content(), "");
    }

    #[test]
    fn test_crlf_line_endings_are_kept() {
        let mut buf = EditBuffer::new("# A\r\nbody\r\n");
        assert_eq!(buf.lines, vec!["# A", "body", ""]);
        assert_eq!(buf.content(), "# A\r\nbody\r\n");

        buf.cursor_line = 1;
        buf.move_end();
        buf.insert_newline();
        buf.insert_char('x');
        assert_eq!(buf.content(), "# A\r\nbody\r\nx\r\n");
    }

    #[test]
    fn test_insert_char_middle() {
        let mut buf = EditBuffer::new("hllo");
        buf.cursor_col = 1;
        buf.insert_char('e');
        assert_eq!(buf.lines[0], "hello");
        assert_eq!(buf.cursor_col, 2);
        assert!(buf.modified);
    }

    #[test]
    fn test_insert_after_multibyte() {
        let mut buf = EditBuffer::new("café");
        buf.move_end();
        assert_eq!(buf.cursor_col, 4);
        buf.insert_char('!');
        assert_eq!(buf.lines[0], "café!");
        buf.delete_char_before();
        buf.delete_char_before();
        assert_eq!(buf.lines[0], "caf");
    }

    #[test]
    fn test_delete_char_before_at_line_start_joins() {
        let mut buf = EditBuffer::new("héllo\nworld");
        buf.cursor_line = 1;
        buf.delete_char_before();
        assert_eq!(buf.lines, vec!["hélloworld"]);
        assert_eq!(buf.cursor_line, 0);
        assert_eq!(buf.cursor_col, 5);
    }

    #[test]
    fn test_delete_char_at_end_joins() {
        let mut buf = EditBuffer::new("hello\nworld");
        buf.cursor_col = 5;
        buf.delete_char_at();
        assert_eq!(buf.lines, vec!["helloworld"]);
    }

    #[test]
    fn test_delete_at_buffer_edges_is_noop() {
        let mut buf = EditBuffer::new("x");
        buf.delete_char_before();
        buf.move_end();
        buf.delete_char_at();
        assert_eq!(buf.lines, vec!["x"]);
        assert!(!buf.modified);
    }

    #[test]
    fn test_insert_newline_auto_indent() {
        let mut buf = EditBuffer::new("  - item");
        buf.move_end();
        buf.insert_newline();
        assert_eq!(buf.lines, vec!["  - item", "  "]);
        assert_eq!(buf.cursor_line, 1);
        assert_eq!(buf.cursor_col, 2);
    }

    #[test]
    fn test_insert_tab() {
        let mut buf = EditBuffer::new("x");
        buf.insert_tab();
        assert_eq!(buf.lines[0], "    x");
        assert_eq!(buf.cursor_col, 4);
    }

    #[test]
    fn test_navigation_wraps_between_lines() {
        let mut buf = EditBuffer::new("ab\ncd");
        buf.move_end();
        buf.move_right();
        assert_eq!((buf.cursor_line, buf.cursor_col), (1, 0));
        buf.move_left();
        assert_eq!((buf.cursor_line, buf.cursor_col), (0, 2));
    }

    #[test]
    fn test_cursor_clamp_on_line_change() {
        let mut buf = EditBuffer::new("longline\nhi");
        buf.cursor_col = 8;
        buf.move_down();
        assert_eq!(buf.cursor_col, 2);
    }

    #[test]
    fn test_page_up_down() {
        let text = (0..50)
            .map(|i| format!("line{}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let mut buf = EditBuffer::new(&text);
        buf.visible_height = 10;
        buf.page_down();
        assert_eq!(buf.cursor_line, 10);
        buf.page_up();
        assert_eq!(buf.cursor_line, 0);
        for _ in 0..10 {
            buf.page_down();
        }
        assert_eq!(buf.cursor_line, 49);
        assert!(buf.cursor_line < buf.scroll_offset + buf.visible_height);
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("hello", 2), 2);
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("hi", 10), 2);
    }
}
