use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode, Focus};
use crate::components::dialog::DialogWidget;
use crate::components::editor::EditorWidget;
use crate::components::help::HelpOverlay;
use crate::components::note::NoteWidget;
use crate::components::search::SearchWidget;
use crate::components::status_bar::{HintSet, StatusBarWidget};
use crate::components::tree::TreeWidget;
use crate::theme::ThemeColors;

fn panel_block<'a>(title: String, focused: bool, theme: &ThemeColors) -> Block<'a> {
    let border = if focused {
        theme.border_focused_fg
    } else {
        theme.border_fg
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

/// Split the frame into tree panel, note panel, and status bar.
fn layout(area: Rect, tree_width: u16) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(tree_width), Constraint::Min(10)])
        .split(rows[0]);
    (columns[0], columns[1], rows[1])
}

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let (tree_area, note_area, status_area) = layout(area, app.tree_width);

    // Sizes feed back into state before anything borrows it for drawing.
    app.tree_area = tree_area;
    app.tree.set_height(tree_area.height.saturating_sub(2) as usize);
    if let Some(editor) = app.note.editor_mut() {
        editor.set_visible_height(note_area.height.saturating_sub(2) as usize);
    }

    let root_name = app
        .tree
        .root_path()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| app.tree.root_path().display().to_string());
    let tree_block = panel_block(
        format!(" {} ", root_name),
        app.focus == Focus::Tree,
        &app.theme,
    );
    frame.render_widget(
        TreeWidget::new(&app.tree, &app.theme, app.show_icons).block(tree_block),
        tree_area,
    );

    let note_focused = app.focus == Focus::Note;
    match app.note.editor() {
        Some(editor) => {
            let title = if app.note.is_saving() {
                " Saving... "
            } else if editor.modified {
                " Editing [+] "
            } else {
                " Editing "
            };
            let block = panel_block(title.to_string(), true, &app.theme);
            frame.render_widget(EditorWidget::new(editor, &app.theme).block(block), note_area);
        }
        None => {
            let block = panel_block(" Note ".to_string(), note_focused, &app.theme);
            frame.render_widget(
                NoteWidget::new(&app.note, &app.highlighter, &app.theme)
                    .word_wrap(app.word_wrap)
                    .block(block),
                note_area,
            );
        }
    }

    let path_str = app
        .tree
        .selected_node()
        .map(|n| n.path.display().to_string())
        .unwrap_or_default();
    let hints = if app.note.is_editing() {
        HintSet::Edit
    } else if note_focused {
        HintSet::Note
    } else {
        HintSet::Tree
    };
    let mut status = StatusBarWidget::new(&path_str, &app.theme).hints(hints);
    if let Some(msg) = &app.status_message {
        status = status.status_message(&msg.text, msg.is_error);
    }
    frame.render_widget(status, status_area);

    match app.mode {
        AppMode::Dialog(_) => frame.render_widget(
            DialogWidget::new(&app.mode, &app.dialog_state, &app.theme),
            area,
        ),
        AppMode::Search => frame.render_widget(SearchWidget::new(&app.search, &app.theme), area),
        AppMode::Help => frame.render_widget(HelpOverlay::new(&app.theme), area),
        AppMode::Normal => {}
    }
}
