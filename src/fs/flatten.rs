//! Flattened, line-addressed projection of the visible part of a tree.
//!
//! A [`FlatView`] is rebuilt from scratch after every structural change and
//! is the only place line numbers and prev/next neighbours live, so nothing
//! can read them from a stale pass.

use std::collections::HashMap;

use crate::fs::tree::{Arena, NodeId, NodeKind};

/// Policy knobs that change line numbering but not ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Leave one blank line before every top-level folder except at line 0.
    pub folder_gap: bool,
}

/// One visible node in the projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub id: NodeId,
    pub line: usize,
    /// Nesting level; children of the root are at depth 0.
    pub depth: usize,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

/// Ordered visible rows plus line and node lookups.
#[derive(Debug, Clone, Default)]
pub struct FlatView {
    rows: Vec<FlatRow>,
    by_line: HashMap<usize, usize>,
    by_node: HashMap<NodeId, usize>,
    total_lines: usize,
}

impl FlatView {
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of display lines, separator lines included.
    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn first(&self) -> Option<NodeId> {
        self.rows.first().map(|r| r.id)
    }

    /// The node drawn at `line`, if any.
    pub fn node_at(&self, line: usize) -> Option<NodeId> {
        self.by_line.get(&line).map(|&i| self.rows[i].id)
    }

    pub fn row_of(&self, id: NodeId) -> Option<&FlatRow> {
        self.by_node.get(&id).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.by_node.contains_key(&id)
    }

    pub fn line_of(&self, id: NodeId) -> Option<usize> {
        self.row_of(id).map(|r| r.line)
    }

    pub fn prev_of(&self, id: NodeId) -> Option<NodeId> {
        self.row_of(id).and_then(|r| r.prev)
    }

    pub fn next_of(&self, id: NodeId) -> Option<NodeId> {
        self.row_of(id).and_then(|r| r.next)
    }

    /// Node identities in display order.
    pub fn order(&self) -> Vec<NodeId> {
        self.rows.iter().map(|r| r.id).collect()
    }
}

/// Pre-order walk from the root's children, descending only into expanded
/// folders, then wire prev/next between consecutive rows.
pub fn flatten(arena: &Arena, root: NodeId, options: FlattenOptions) -> FlatView {
    let mut rows = Vec::new();
    let mut next_line = 0usize;

    if let Some(root_node) = arena.get(root) {
        for &child in &root_node.children {
            visit(arena, child, 0, options, &mut next_line, &mut rows);
        }
    }

    for i in 0..rows.len() {
        let prev = if i > 0 { Some(rows[i - 1].id) } else { None };
        let next = rows.get(i + 1).map(|r| r.id);
        rows[i].prev = prev;
        rows[i].next = next;
    }

    let by_line = rows.iter().enumerate().map(|(i, r)| (r.line, i)).collect();
    let by_node = rows.iter().enumerate().map(|(i, r)| (r.id, i)).collect();

    FlatView {
        rows,
        by_line,
        by_node,
        total_lines: next_line,
    }
}

fn visit(
    arena: &Arena,
    id: NodeId,
    depth: usize,
    options: FlattenOptions,
    next_line: &mut usize,
    rows: &mut Vec<FlatRow>,
) {
    let Some(node) = arena.get(id) else {
        return;
    };

    if options.folder_gap && depth == 0 && node.kind == NodeKind::Folder && *next_line != 0 {
        *next_line += 1;
    }

    rows.push(FlatRow {
        id,
        line: *next_line,
        depth,
        prev: None,
        next: None,
    });
    *next_line += 1;

    if node.kind == NodeKind::Folder && node.expanded {
        for &child in &node.children {
            visit(arena, child, depth + 1, options, next_line, rows);
        }
    }
}
