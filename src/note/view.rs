//! State of the note panel: which note is loaded, its sections, and how the
//! current section is shown.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::editor::EditBuffer;
use crate::error::Result;
use crate::fs::operations::FsGateway;
use crate::note::sections::{parse_sections, Section};

/// How much of the current section is revealed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    TitleOnly,
    Hints,
    Content,
}

impl DisplayMode {
    /// Recall order: title, then hints, then the full content.
    pub fn next(self) -> Self {
        match self {
            Self::TitleOnly => Self::Hints,
            Self::Hints => Self::Content,
            Self::Content => Self::TitleOnly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TitleOnly => "title",
            Self::Hints => "hints",
            Self::Content => "content",
        }
    }
}

/// Outcome of reading (or writing then re-reading) a note off the UI task.
#[derive(Debug)]
pub struct LoadedNote {
    /// The path the read was issued for.
    pub path: PathBuf,
    pub text: Result<String>,
}

/// Read a note. Invalid UTF-8 is replaced rather than rejected.
pub fn read_note(gateway: &dyn FsGateway, path: &Path) -> LoadedNote {
    let text = gateway
        .read_file(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    LoadedNote {
        path: path.to_path_buf(),
        text,
    }
}

/// Write `content` and read it back.
pub fn save_note(gateway: &dyn FsGateway, path: &Path, content: &str) -> LoadedNote {
    match gateway.write_file(path, content.as_bytes()) {
        Ok(()) => read_note(gateway, path),
        Err(e) => LoadedNote {
            path: path.to_path_buf(),
            text: Err(e),
        },
    }
}

/// What the note panel should draw right now.
#[derive(Debug, PartialEq, Eq)]
pub enum NoteDisplay<'a> {
    /// No note has been requested yet.
    Empty,
    Loading,
    Error(&'a str),
    Editing,
    Section { title: &'a str, body: String },
}

/// A pending write of the edit buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct NoteView {
    path: Option<PathBuf>,
    raw: String,
    sections: Vec<Section>,
    index: usize,
    mode: DisplayMode,
    loading: bool,
    error: Option<String>,
    editor: Option<EditBuffer>,
    /// A write of the edit buffer is in flight.
    saving: bool,
    /// Scroll offset of the rendered section body.
    pub scroll: u16,
}

impl NoteView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn editor(&self) -> Option<&EditBuffer> {
        self.editor.as_ref()
    }

    /// The edit buffer, unless it is frozen by a pending save.
    pub fn editor_mut(&mut self) -> Option<&mut EditBuffer> {
        if self.saving {
            return None;
        }
        self.editor.as_mut()
    }

    /// Start loading `path`. Returns `false` when it is already the current
    /// note and `force` is not set, in which case nothing changes.
    pub fn request_load(&mut self, path: &Path, force: bool) -> bool {
        if !force && self.path.as_deref() == Some(path) {
            return false;
        }
        debug!(path = %path.display(), force, "note load requested");
        self.path = Some(path.to_path_buf());
        self.editor = None;
        self.saving = false;
        self.loading = true;
        self.index = 0;
        self.scroll = 0;
        true
    }

    /// Install a finished load or save. Results for a path other than the one
    /// most recently requested are dropped; returns whether it was applied.
    ///
    /// A failed save leaves the view untouched and the buffer in edit mode.
    pub fn apply_loaded(&mut self, loaded: LoadedNote) -> bool {
        if self.path.as_deref() != Some(loaded.path.as_path()) {
            debug!(path = %loaded.path.display(), "discarding stale note load");
            return false;
        }

        if std::mem::take(&mut self.saving) {
            if let Err(e) = &loaded.text {
                warn!(path = %loaded.path.display(), error = %e, "note save failed");
                return true;
            }
            self.editor = None;
        }

        self.loading = false;
        self.index = 0;
        self.scroll = 0;
        self.mode = DisplayMode::TitleOnly;
        match loaded.text {
            Ok(text) => {
                self.sections = parse_sections(&text);
                self.raw = text;
                self.error = None;
            }
            Err(e) => {
                warn!(path = %loaded.path.display(), error = %e, "note load failed");
                self.sections.clear();
                self.raw.clear();
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Forget the current note, e.g. after it was deleted.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        self.scroll = 0;
    }

    pub fn next_section(&mut self) {
        if self.index + 1 < self.sections.len() {
            self.index += 1;
            self.scroll = 0;
        }
    }

    pub fn prev_section(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.scroll = 0;
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (self.scroll as i32 + delta).max(0) as u16;
    }

    /// Enter edit mode with a buffer seeded from the raw note. Needs a
    /// settled, successfully loaded note.
    pub fn enter_edit(&mut self) -> bool {
        if self.path.is_none() || self.loading || self.error.is_some() || self.editor.is_some() {
            return false;
        }
        self.editor = Some(EditBuffer::new(&self.raw));
        true
    }

    /// Leave edit mode. An unmodified buffer is simply dropped. Otherwise
    /// the buffer stays, frozen, until the returned request has been written
    /// and its result passed to [`NoteView::apply_loaded`].
    pub fn finish_edit(&mut self) -> Option<SaveRequest> {
        if self.saving {
            return None;
        }
        let editor = self.editor.as_ref()?;
        if !editor.modified {
            self.editor = None;
            return None;
        }
        let request = SaveRequest {
            path: self.path.clone()?,
            content: editor.content(),
        };
        self.saving = true;
        Some(request)
    }

    /// The section under the cursor. A note whose text yields no sections
    /// shows its raw text as one untitled section.
    pub fn current_section(&self) -> Option<Section> {
        self.path.as_ref()?;
        match self.sections.get(self.index) {
            Some(section) => Some(section.clone()),
            None => Some(Section {
                title: String::new(),
                content: self.raw.clone(),
                hints: Vec::new(),
            }),
        }
    }

    pub fn display(&self) -> NoteDisplay<'_> {
        if self.loading {
            return NoteDisplay::Loading;
        }
        if self.path.is_none() {
            return NoteDisplay::Empty;
        }
        if let Some(err) = &self.error {
            return NoteDisplay::Error(err);
        }
        if self.editor.is_some() {
            return NoteDisplay::Editing;
        }

        let (title, content, hints) = match self.sections.get(self.index) {
            Some(s) => (s.title.as_str(), s.content.as_str(), s.hints.as_slice()),
            None => ("", self.raw.as_str(), &[][..]),
        };
        let body = match self.mode {
            DisplayMode::TitleOnly => String::new(),
            DisplayMode::Content => content.to_string(),
            DisplayMode::Hints if hints.is_empty() => "No hints available.".to_string(),
            DisplayMode::Hints => hints
                .iter()
                .map(|h| format!("- {}", h))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        NoteDisplay::Section { title, body }
    }

    /// Position indicator: `"2/5"`, or `"No sections"`.
    pub fn footer(&self) -> String {
        if self.sections.is_empty() {
            "No sections".to_string()
        } else {
            format!("{}/{}", self.index + 1, self.sections.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::fs::operations::LocalFs;
    use crate::note::sections::NO_TITLE;
    use std::fs;
    use tempfile::TempDir;

    const NOTE: &str = "# One\nfirst **a** and __b__\n\n# Two\nsecond\n\n# Three\nthird **c**\n";

    fn loaded(view: &mut NoteView, path: &Path) {
        assert!(view.request_load(path, false));
        let result = read_note(&LocalFs, path);
        assert!(view.apply_loaded(result));
    }

    fn setup() -> (TempDir, PathBuf, NoteView) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.md");
        fs::write(&path, NOTE).unwrap();
        let mut view = NoteView::new();
        loaded(&mut view, &path);
        (dir, path, view)
    }

    #[test]
    fn empty_view_displays_nothing() {
        let view = NoteView::new();
        assert_eq!(view.display(), NoteDisplay::Empty);
        assert_eq!(view.footer(), "No sections");
        assert!(view.current_section().is_none());
    }

    #[test]
    fn load_parses_sections_and_starts_title_only() {
        let (_dir, _path, view) = setup();
        assert_eq!(view.sections().len(), 3);
        assert_eq!(view.mode(), DisplayMode::TitleOnly);
        assert_eq!(view.footer(), "1/3");
        assert_eq!(
            view.display(),
            NoteDisplay::Section {
                title: "# One",
                body: String::new()
            }
        );
    }

    #[test]
    fn request_same_path_is_noop_unless_forced() {
        let (_dir, path, mut view) = setup();
        view.next_section();
        assert!(!view.request_load(&path, false));
        assert_eq!(view.index(), 1);
        assert!(!view.is_loading());
        assert!(view.request_load(&path, true));
        assert!(view.is_loading());
        assert_eq!(view.display(), NoteDisplay::Loading);
    }

    #[test]
    fn stale_load_is_discarded() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        fs::write(&a, "# A\nalpha").unwrap();
        fs::write(&b, "# B\nbeta").unwrap();

        let mut view = NoteView::new();
        view.request_load(&a, false);
        let late_a = read_note(&LocalFs, &a);
        view.request_load(&b, false);
        assert!(!view.apply_loaded(late_a));
        assert!(view.is_loading());
        assert!(view.apply_loaded(read_note(&LocalFs, &b)));
        assert_eq!(view.sections()[0].title, "# B");
    }

    #[test]
    fn load_error_is_displayed() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.md");
        let mut view = NoteView::new();
        view.request_load(&missing, false);
        view.apply_loaded(read_note(&LocalFs, &missing));
        match view.display() {
            NoteDisplay::Error(msg) => assert!(msg.starts_with("I/O error")),
            other => panic!("unexpected display {:?}", other),
        }
        assert!(!view.enter_edit());
    }

    #[test]
    fn modes_cycle_title_hints_content() {
        let (_dir, _path, mut view) = setup();
        view.cycle_mode();
        assert_eq!(view.mode(), DisplayMode::Hints);
        assert_eq!(
            view.display(),
            NoteDisplay::Section {
                title: "# One",
                body: "- a\n- b".into()
            }
        );
        view.cycle_mode();
        assert_eq!(view.mode(), DisplayMode::Content);
        assert_eq!(
            view.display(),
            NoteDisplay::Section {
                title: "# One",
                body: "first **a** and __b__".into()
            }
        );
        view.cycle_mode();
        assert_eq!(view.mode(), DisplayMode::TitleOnly);
    }

    #[test]
    fn hints_mode_without_hints() {
        let (_dir, _path, mut view) = setup();
        view.next_section();
        view.cycle_mode();
        assert_eq!(
            view.display(),
            NoteDisplay::Section {
                title: "# Two",
                body: "No hints available.".into()
            }
        );
    }

    #[test]
    fn section_navigation_clamps() {
        let (_dir, _path, mut view) = setup();
        view.prev_section();
        assert_eq!(view.index(), 0);
        for _ in 0..5 {
            view.next_section();
        }
        assert_eq!(view.index(), 2);
        assert_eq!(view.footer(), "3/3");
    }

    #[test]
    fn navigation_resets_scroll() {
        let (_dir, _path, mut view) = setup();
        view.scroll_by(5);
        assert_eq!(view.scroll, 5);
        view.next_section();
        assert_eq!(view.scroll, 0);
        view.scroll_by(-3);
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn reload_resets_index() {
        let (_dir, path, mut view) = setup();
        view.next_section();
        view.next_section();
        loaded_forced(&mut view, &path);
        assert_eq!(view.index(), 0);
    }

    fn loaded_forced(view: &mut NoteView, path: &Path) {
        assert!(view.request_load(path, true));
        assert!(view.apply_loaded(read_note(&LocalFs, path)));
    }

    #[test]
    fn edit_then_save_reparses() {
        let (_dir, path, mut view) = setup();
        assert!(view.enter_edit());
        assert_eq!(view.display(), NoteDisplay::Editing);
        {
            let editor = view.editor_mut().unwrap();
            editor.lines = vec!["# Only".into(), "fresh **x**".into()];
            editor.modified = true;
        }
        let request = view.finish_edit().unwrap();
        assert_eq!(request.path, path);
        assert!(view.is_saving());
        assert!(view.is_editing());
        assert!(view.editor_mut().is_none());
        assert!(view.finish_edit().is_none());

        assert!(view.apply_loaded(save_note(&LocalFs, &request.path, &request.content)));
        assert!(!view.is_saving());
        assert!(!view.is_editing());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Only\nfresh **x**");
        assert_eq!(view.sections().len(), 1);
        assert_eq!(view.sections()[0].hints, vec!["x"]);
    }

    #[test]
    fn edit_requires_settled_note() {
        let mut view = NoteView::new();
        assert!(!view.enter_edit());
        assert!(view.finish_edit().is_none());

        let (_dir, path, mut view) = setup();
        view.request_load(&path, true);
        assert!(!view.enter_edit());
    }

    #[test]
    fn heading_only_note_shows_raw_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bare.md");
        fs::write(&path, "# Only\n").unwrap();
        let mut view = NoteView::new();
        loaded(&mut view, &path);
        assert_eq!(view.footer(), "No sections");
        let section = view.current_section().unwrap();
        assert_eq!(section.content, "# Only\n");
    }

    #[test]
    fn blank_note_is_one_untitled_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.md");
        fs::write(&path, "\n\n").unwrap();
        let mut view = NoteView::new();
        loaded(&mut view, &path);
        assert_eq!(view.footer(), "1/1");
        assert_eq!(view.current_section().unwrap().title, NO_TITLE);
    }

    /// Gateway whose writes always fail.
    struct FailingWrites;

    impl FsGateway for FailingWrites {
        fn create_file(&self, _: &Path, _: &[u8]) -> Result<()> {
            Ok(())
        }
        fn create_folder(&self, _: &Path) -> Result<()> {
            Ok(())
        }
        fn delete_recursive(&self, _: &Path) -> Result<()> {
            Ok(())
        }
        fn list_directory(&self, _: &Path) -> Result<Vec<crate::fs::operations::DirEntryInfo>> {
            Ok(Vec::new())
        }
        fn read_file(&self, _: &Path) -> Result<Vec<u8>> {
            Ok(b"unchanged".to_vec())
        }
        fn write_file(&self, _: &Path, _: &[u8]) -> Result<()> {
            Err(AppError::InvalidOperation("disk is read-only".into()))
        }
    }

    #[test]
    fn failed_save_keeps_typed_text_in_edit_mode() {
        let (_dir, path, mut view) = setup();
        view.enter_edit();
        {
            let editor = view.editor_mut().unwrap();
            editor.lines = vec!["typed work".into()];
            editor.modified = true;
        }
        let request = view.finish_edit().unwrap();
        let result = save_note(&FailingWrites, &path, &request.content);
        assert!(matches!(result.text, Err(AppError::InvalidOperation(_))));
        assert!(view.apply_loaded(result));

        assert!(!view.is_saving());
        assert!(view.is_editing());
        assert_eq!(view.display(), NoteDisplay::Editing);
        assert_eq!(view.editor().unwrap().content(), "typed work");
        assert_eq!(view.raw(), NOTE);
        assert_eq!(view.sections().len(), 3);

        // The buffer is live again and a retry goes through.
        view.editor_mut().unwrap().insert_char('!');
        let retry = view.finish_edit().unwrap();
        assert_eq!(retry.content, "!typed work");
        assert!(view.apply_loaded(save_note(&LocalFs, &retry.path, &retry.content)));
        assert!(!view.is_editing());
        assert_eq!(fs::read_to_string(&path).unwrap(), "!typed work");
    }

    #[test]
    fn unmodified_edit_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crlf.md");
        fs::write(&path, "# A\r\nbody\r\n").unwrap();
        let mut view = NoteView::new();
        loaded(&mut view, &path);

        assert!(view.enter_edit());
        assert!(view.finish_edit().is_none());
        assert!(!view.is_editing());
        assert!(!view.is_saving());
        assert_eq!(fs::read(&path).unwrap(), b"# A\r\nbody\r\n");
    }
}
