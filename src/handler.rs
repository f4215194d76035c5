use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, AppMode, DialogKind, Focus};
use crate::fs::tree::{Command, NodeKind};

/// Lines scrolled by PgUp/PgDn in the note panel.
const NOTE_PAGE: i32 = 10;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        AppMode::Help => app.mode = AppMode::Normal,
        AppMode::Dialog(DialogKind::DeleteConfirm { .. }) => handle_confirm_key(app, key),
        AppMode::Dialog(_) => handle_dialog_key(app, key),
        AppMode::Search => handle_search_key(app, key),
        AppMode::Normal if app.note.is_editing() => handle_editor_key(app, key),
        AppMode::Normal => match app.focus {
            Focus::Tree => handle_tree_key(app, key),
            Focus::Note => handle_note_key(app, key),
        },
    }
}

/// Keys shared by both panels. Returns whether the key was consumed.
fn handle_global_key(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('?') => app.mode = AppMode::Help,
        KeyCode::Char('/') => app.open_search(),
        KeyCode::Char('f') if ctrl => app.open_search(),
        KeyCode::Tab => app.toggle_focus(),
        _ => return false,
    }
    true
}

fn handle_tree_key(app: &mut App, key: KeyEvent) {
    if handle_global_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.apply(Command::MoveDown);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.apply(Command::MoveUp);
        }
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Char('h') => {
            let on_folder = app.tree.selected_node().is_some_and(|n| n.is_folder());
            if on_folder {
                app.apply(Command::ToggleExpand);
            } else if key.code == KeyCode::Enter && app.note.path().is_some() {
                app.focus = Focus::Note;
            }
        }
        KeyCode::Char('a') => app.open_create_dialog(NodeKind::File),
        KeyCode::Char('A') => app.open_create_dialog(NodeKind::Folder),
        KeyCode::Char('N') => app.open_dialog(DialogKind::CreateRootFolder),
        KeyCode::Char('d') | KeyCode::Delete => app.open_delete_dialog(),
        _ => {}
    }
}

fn handle_note_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.focus = Focus::Tree;
        return;
    }
    if handle_global_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char(' ') => app.note.cycle_mode(),
        KeyCode::Left | KeyCode::Char('a') => app.note.prev_section(),
        KeyCode::Right | KeyCode::Char('d') => app.note.next_section(),
        KeyCode::Char('j') | KeyCode::Down => app.note.scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.note.scroll_by(-1),
        KeyCode::PageDown => app.note.scroll_by(NOTE_PAGE),
        KeyCode::PageUp => app.note.scroll_by(-NOTE_PAGE),
        KeyCode::Char('e') | KeyCode::Enter => app.enter_edit(),
        _ => {}
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('s')) {
        app.finish_edit();
        return;
    }
    let Some(editor) = app.note.editor_mut() else {
        return;
    };
    match key.code {
        KeyCode::Char(c) if !ctrl => editor.insert_char(c),
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Tab => editor.insert_tab(),
        KeyCode::Backspace => editor.delete_char_before(),
        KeyCode::Delete => editor.delete_char_at(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        KeyCode::PageUp => editor.page_up(),
        KeyCode::PageDown => editor.page_down(),
        _ => {}
    }
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.confirm_dialog(),
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Backspace => app.dialog_state.delete_char(),
        KeyCode::Left => app.dialog_state.move_cursor_left(),
        KeyCode::Right => app.dialog_state.move_cursor_right(),
        KeyCode::Home => app.dialog_state.cursor_home(),
        KeyCode::End => app.dialog_state.cursor_end(),
        KeyCode::Char(c) => app.dialog_state.insert_char(c),
        _ => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_dialog(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.close_search(),
        KeyCode::Enter => app.search_confirm(),
        KeyCode::Down => app.search_select_next(),
        KeyCode::Up => app.search_select_previous(),
        KeyCode::Char('n') if ctrl => app.search_select_next(),
        KeyCode::Char('p') if ctrl => app.search_select_previous(),
        KeyCode::Backspace => app.search_delete_char(),
        KeyCode::Left => app.search.query.move_cursor_left(),
        KeyCode::Right => app.search.query.move_cursor_right(),
        KeyCode::Char(c) if !ctrl => app.search_input_char(c),
        _ => {}
    }
}

/// Handle a mouse event. Only the tree panel reacts to the pointer.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.mode != AppMode::Normal || app.note.is_editing() {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click_tree(mouse.column, mouse.row),
        MouseEventKind::Moved => app.hover_tree(mouse.column, mouse.row),
        MouseEventKind::ScrollDown if app.tree_line_at(mouse.column, mouse.row).is_some() => {
            app.apply(Command::MoveDown);
        }
        MouseEventKind::ScrollUp if app.tree_line_at(mouse.column, mouse.row).is_some() => {
            app.apply(Command::MoveUp);
        }
        MouseEventKind::ScrollDown => app.note.scroll_by(1),
        MouseEventKind::ScrollUp => app.note.scroll_by(-1),
        _ => {}
    }
}
