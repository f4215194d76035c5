use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::event::Event;
use crate::fs::operations::FsGateway;
use crate::fs::tree::{Command, FsTree, NodeId, NodeKind};
use crate::note::highlight::MarkdownHighlighter;
use crate::note::view::{read_note, save_note, LoadedNote, NoteView};
use crate::search::{SearchEngine, SearchResult};
use crate::theme::{resolve_theme, ThemeColors};

/// Which panel receives navigation keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tree,
    Note,
}

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    CreateFile { parent: NodeId },
    CreateFolder { parent: NodeId },
    CreateRootFolder,
    DeleteConfirm { target: NodeId, name: String },
}

impl DialogKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::CreateFile { .. } => " New Note ",
            Self::CreateFolder { .. } => " New Folder ",
            Self::CreateRootFolder => " New Top-Level Folder ",
            Self::DeleteConfirm { .. } => " Delete Confirmation ",
        }
    }
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
    Search,
    Help,
}

/// Single-line text input with a byte-offset cursor on a char boundary.
#[derive(Debug, Default, Clone)]
pub struct DialogState {
    pub input: String,
    pub cursor_position: usize,
}

impl DialogState {
    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
    }

    /// Backspace.
    pub fn delete_char(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
            self.input.remove(self.cursor_position);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(prev) = self.input[..self.cursor_position].chars().next_back() {
            self.cursor_position -= prev.len_utf8();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(next) = self.input[self.cursor_position..].chars().next() {
            self.cursor_position += next.len_utf8();
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input.len();
    }
}

/// State for the search overlay.
#[derive(Debug, Default)]
pub struct SearchState {
    pub query: DialogState,
    pub results: Vec<SearchResult>,
    pub selected_index: usize,
    engine: SearchEngine,
}

impl SearchState {
    fn refresh(&mut self) {
        self.results = self.engine.search(&self.query.input);
        self.selected_index = 0;
    }

    pub fn selected(&self) -> Option<&SearchResult> {
        self.results.get(self.selected_index)
    }
}

/// A timed message for the status bar.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub created: Instant,
}

/// Seconds a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

/// Main application state.
pub struct App {
    pub tree: FsTree,
    pub note: NoteView,
    pub focus: Focus,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub search: SearchState,
    pub status_message: Option<StatusMessage>,
    pub should_quit: bool,
    pub theme: ThemeColors,
    pub highlighter: MarkdownHighlighter,
    pub show_icons: bool,
    pub word_wrap: bool,
    pub tree_width: u16,
    /// Last rendered tree panel area, border included. Used for mouse hits.
    pub tree_area: Rect,
    gateway: Arc<dyn FsGateway>,
    event_tx: Option<UnboundedSender<Event>>,
    last_emitted: Option<NodeId>,
    pending_save: Option<PathBuf>,
}

impl App {
    /// Create a new App rooted at the given path.
    pub fn new(path: &Path, config: &AppConfig, gateway: Arc<dyn FsGateway>) -> Result<Self> {
        let tree = FsTree::build(path, Arc::clone(&gateway), config.tree_options())?;
        let highlighter = if config.highlight_enabled() {
            MarkdownHighlighter::new(Some(config.syntax_theme_name()), true)
        } else {
            MarkdownHighlighter::disabled()
        };
        debug!(
            scheme = config.theme_scheme(),
            highlight = config.highlight_enabled(),
            "app configured"
        );

        Ok(Self {
            tree,
            note: NoteView::new(),
            focus: Focus::Tree,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            search: SearchState::default(),
            status_message: None,
            should_quit: false,
            theme: resolve_theme(&config.theme),
            highlighter,
            show_icons: config.show_icons(),
            word_wrap: config.word_wrap(),
            tree_width: config.tree_width(),
            tree_area: Rect::default(),
            gateway,
            event_tx: None,
            last_emitted: None,
            pending_save: None,
        })
    }

    /// Route note reads and saves through blocking workers that report back
    /// on `tx`. Without a sender they run inline.
    pub fn set_event_sender(&mut self, tx: UnboundedSender<Event>) {
        self.event_tx = Some(tx);
    }

    // ── Tree commands ────────────────────────────────────────────────

    /// Apply a tree command. Failures become an error status and leave the
    /// tree as it was. Returns whether the command succeeded.
    pub fn apply(&mut self, command: Command) -> bool {
        debug!(?command, "applying tree command");
        match self.tree.apply(command) {
            Ok(()) => {
                self.sync_selected_note();
                true
            }
            Err(e) => {
                warn!(error = %e, "tree command failed");
                self.set_error_message(e.to_string());
                false
            }
        }
    }

    /// Load the selected note if the selection moved onto a file since the
    /// last call. Folders never trigger a load.
    pub fn sync_selected_note(&mut self) {
        let selected = self.tree.selected();
        if selected == self.last_emitted {
            return;
        }
        self.last_emitted = selected;

        let Some(node) = selected.and_then(|id| self.tree.node(id)) else {
            return;
        };
        if node.is_folder() {
            return;
        }
        let path = node.path.clone();
        self.load_note(&path, false);
    }

    pub fn load_note(&mut self, path: &Path, force: bool) {
        if !self.note.request_load(path, force) {
            return;
        }
        let gateway = Arc::clone(&self.gateway);
        let path = path.to_path_buf();
        self.dispatch(move || read_note(gateway.as_ref(), &path));
    }

    fn dispatch<F>(&mut self, job: F)
    where
        F: FnOnce() -> LoadedNote + Send + 'static,
    {
        match &self.event_tx {
            Some(tx) => {
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let _ = tx.send(Event::NoteLoaded(job()));
                });
            }
            None => {
                let loaded = job();
                self.handle_note_loaded(loaded);
            }
        }
    }

    /// Install a finished read or save.
    pub fn handle_note_loaded(&mut self, loaded: LoadedNote) {
        let was_save = self.pending_save.as_deref() == Some(loaded.path.as_path());
        if was_save {
            self.pending_save = None;
        }
        let name = file_label(&loaded.path);
        let failure = loaded.text.as_ref().err().map(ToString::to_string);

        if !self.note.apply_loaded(loaded) {
            return;
        }
        match failure {
            Some(msg) if was_save => self.set_error_message(format!("Save failed: {}", msg)),
            Some(msg) => self.set_error_message(msg),
            None if was_save => self.set_status_message(format!("Saved {}", name)),
            None => {}
        }
    }

    // ── Note panel ───────────────────────────────────────────────────

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree if self.note.path().is_some() => Focus::Note,
            _ => Focus::Tree,
        };
    }

    pub fn enter_edit(&mut self) {
        if self.note.enter_edit() {
            self.focus = Focus::Note;
        } else {
            self.set_error_message("No note to edit".to_string());
        }
    }

    /// Leave edit mode. A modified buffer is written and the note reloaded;
    /// if the write fails the editor stays open with the typed text.
    pub fn finish_edit(&mut self) {
        let Some(request) = self.note.finish_edit() else {
            return;
        };
        info!(path = %request.path.display(), bytes = request.content.len(), "saving note");
        self.pending_save = Some(request.path.clone());
        let gateway = Arc::clone(&self.gateway);
        self.dispatch(move || save_note(gateway.as_ref(), &request.path, &request.content));
    }

    // ── Dialogs ──────────────────────────────────────────────────────

    /// Open a dialog of the given kind.
    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog_state = DialogState::default();
        self.mode = AppMode::Dialog(kind);
    }

    /// Prompt for a new note or folder next to the selection.
    pub fn open_create_dialog(&mut self, kind: NodeKind) {
        let parent = self
            .tree
            .selected()
            .and_then(|id| self.tree.target_folder(id))
            .unwrap_or_else(|| self.tree.root());
        self.open_dialog(match kind {
            NodeKind::File => DialogKind::CreateFile { parent },
            NodeKind::Folder => DialogKind::CreateFolder { parent },
        });
    }

    pub fn open_delete_dialog(&mut self) {
        match self.tree.selected() {
            Some(target) => {
                let name = self.tree.display_name(target);
                self.open_dialog(DialogKind::DeleteConfirm { target, name });
            }
            None => self.set_error_message(AppError::NoSelection.to_string()),
        }
    }

    /// Close the current dialog and return to normal mode.
    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
    }

    /// Carry out the open dialog's action.
    pub fn confirm_dialog(&mut self) {
        let AppMode::Dialog(kind) = std::mem::take(&mut self.mode) else {
            return;
        };
        let name = std::mem::take(&mut self.dialog_state).input;

        match kind {
            DialogKind::CreateFile { parent } => self.create(parent, name, NodeKind::File),
            DialogKind::CreateFolder { parent } => self.create(parent, name, NodeKind::Folder),
            DialogKind::CreateRootFolder => {
                let root = self.tree.root();
                self.create(root, name, NodeKind::Folder);
            }
            DialogKind::DeleteConfirm { target, name } => self.delete(target, &name),
        }
    }

    fn create(&mut self, parent: NodeId, name: String, kind: NodeKind) {
        let shown = name.trim().to_string();
        if self.apply(Command::CreateNode { parent, name, kind }) {
            if kind == NodeKind::File {
                self.focus = Focus::Tree;
            }
            self.set_status_message(format!("Created {}", shown));
        }
    }

    fn delete(&mut self, target: NodeId, name: &str) {
        let Some(path) = self.tree.node(target).map(|n| n.path.clone()) else {
            return;
        };
        if !self.apply(Command::DeleteNode(target)) {
            return;
        }
        // The open note may live inside what was just removed.
        if self.note.path().is_some_and(|p| p.starts_with(&path)) {
            self.note.clear();
            self.focus = Focus::Tree;
        }
        self.set_status_message(format!("Deleted {}", name));
    }

    // ── Search ───────────────────────────────────────────────────────

    pub fn open_search(&mut self) {
        let engine = SearchEngine::index(
            self.gateway.as_ref(),
            self.tree.root_path(),
            &self.tree.options().note_extension,
        );
        debug!(entries = engine.len(), "search index built");
        self.search = SearchState {
            engine,
            ..SearchState::default()
        };
        self.mode = AppMode::Search;
    }

    pub fn close_search(&mut self) {
        self.mode = AppMode::Normal;
        self.search = SearchState::default();
    }

    pub fn search_input_char(&mut self, c: char) {
        self.search.query.insert_char(c);
        self.search.refresh();
    }

    pub fn search_delete_char(&mut self) {
        self.search.query.delete_char();
        self.search.refresh();
    }

    pub fn search_select_next(&mut self) {
        if self.search.selected_index + 1 < self.search.results.len() {
            self.search.selected_index += 1;
        }
    }

    pub fn search_select_previous(&mut self) {
        self.search.selected_index = self.search.selected_index.saturating_sub(1);
    }

    /// Reveal the chosen result in the tree and open it.
    pub fn search_confirm(&mut self) {
        let Some(result) = self.search.selected().cloned() else {
            return;
        };
        self.close_search();
        match self.tree.reveal(&result.path) {
            Ok(_) => {
                self.sync_selected_note();
                if !result.is_folder {
                    self.focus = Focus::Note;
                }
            }
            Err(e) => {
                warn!(path = %result.path.display(), error = %e, "search result not in tree");
                self.set_error_message(e.to_string());
            }
        }
    }

    // ── Mouse ────────────────────────────────────────────────────────

    /// Projection line under a terminal cell, if it falls inside the tree
    /// panel's inner area.
    pub fn tree_line_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.tree_area;
        let inside = column > area.x
            && column + 1 < area.x + area.width
            && row > area.y
            && row + 1 < area.y + area.height;
        if !inside {
            return None;
        }
        Some((row - area.y - 1) as usize + self.tree.viewport().0)
    }

    pub fn click_tree(&mut self, column: u16, row: u16) {
        let Some(line) = self.tree_line_at(column, row) else {
            return;
        };
        // Clicks below the last row are not errors.
        if self.tree.view().node_at(line).is_none() {
            return;
        }
        self.focus = Focus::Tree;
        self.apply(Command::SelectAtLine(line));
    }

    pub fn hover_tree(&mut self, column: u16, row: u16) {
        match self.tree_line_at(column, row) {
            Some(line) => {
                self.apply(Command::Hover(line));
            }
            None => self.tree.clear_hover(),
        }
    }

    // ── Status ───────────────────────────────────────────────────────

    pub fn set_status_message(&mut self, text: String) {
        self.status_message = Some(StatusMessage {
            text,
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_error_message(&mut self, text: String) {
        self.status_message = Some(StatusMessage {
            text,
            is_error: true,
            created: Instant::now(),
        });
    }

    /// Clear the status message once it has been shown long enough.
    pub fn clear_expired_status(&mut self) {
        if let Some(msg) = &self.status_message {
            if msg.created.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
            }
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
