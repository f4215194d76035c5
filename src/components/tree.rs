use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::flatten::FlatRow;
use crate::fs::tree::{FsTree, NodeId, TreeNode};
use crate::theme::ThemeColors;

/// Tree panel widget. Draws the rows of the flattened projection that fall
/// inside the tree's viewport, with box-drawing guides.
pub struct TreeWidget<'a> {
    tree: &'a FsTree,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(tree: &'a FsTree, theme: &'a ThemeColors, use_icons: bool) -> Self {
        Self {
            tree,
            theme,
            use_icons,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn is_last_child(&self, id: NodeId) -> bool {
        self.tree
            .node(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.tree.node(p))
            .map_or(true, |p| p.children.last() == Some(&id))
    }

    /// Guides for one row: a continuation column per ancestor, then the
    /// row's own connector.
    fn build_prefix(&self, row: &FlatRow) -> String {
        let mut columns = Vec::with_capacity(row.depth + 1);
        columns.push(if self.is_last_child(row.id) {
            "└─ "
        } else {
            "├─ "
        });

        let mut cursor = self.tree.node(row.id).and_then(|n| n.parent);
        while let Some(ancestor) = cursor {
            if ancestor == self.tree.root() {
                break;
            }
            columns.push(if self.is_last_child(ancestor) {
                "   "
            } else {
                "│  "
            });
            cursor = self.tree.node(ancestor).and_then(|n| n.parent);
        }

        columns.iter().rev().copied().collect()
    }

    fn indicator(&self, node: &TreeNode) -> &'static str {
        match (self.use_icons, node.is_folder(), node.expanded) {
            (true, true, true) => "\u{f07c} ",
            (true, true, false) => "\u{f07b} ",
            (true, false, _) => "\u{f48a} ",
            (false, true, true) => "[-] ",
            (false, true, false) => "[+] ",
            (false, false, _) => "",
        }
    }

    fn row_style(&self, id: NodeId, node: &TreeNode) -> Style {
        if self.tree.selected() == Some(id) {
            return Style::default()
                .bg(self.theme.tree_selected_bg)
                .fg(self.theme.tree_selected_fg)
                .add_modifier(Modifier::BOLD);
        }
        let base = if node.is_folder() {
            Style::default()
                .fg(self.theme.tree_folder_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.tree_file_fg)
        };
        if self.tree.hovered() == Some(id) {
            base.bg(self.theme.tree_hover_bg)
        } else {
            base
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        let view = self.tree.view();
        if view.is_empty() {
            let hint = Line::from(Span::styled(
                "(empty) press a or A",
                Style::default().fg(self.theme.dim_fg),
            ));
            buf.set_line(inner_area.x, inner_area.y, &hint, inner_area.width);
            return;
        }

        let (start, end) = self.tree.viewport();
        for row in view.rows() {
            if row.line < start || row.line >= end {
                continue;
            }
            let offset = (row.line - start) as u16;
            if offset >= inner_area.height {
                break;
            }
            let Some(node) = self.tree.node(row.id) else {
                continue;
            };

            let prefix = self.build_prefix(row);
            let style = self.row_style(row.id, node);
            let line = Line::from(vec![
                Span::styled(prefix, Style::default().fg(self.theme.dim_fg)),
                Span::styled(
                    format!("{}{}", self.indicator(node), self.tree.display_name(row.id)),
                    style,
                ),
            ]);

            let y = inner_area.y + offset;
            if self.tree.selected() == Some(row.id) {
                buf.set_style(Rect::new(inner_area.x, y, inner_area.width, 1), style);
            }
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
