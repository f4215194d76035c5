use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::fs::flatten::{flatten, FlatView, FlattenOptions};
use crate::fs::operations::FsGateway;

/// Handle to a node stored in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Type of filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

/// A node in the note tree. The path is its identity.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub kind: NodeKind,
    pub path: PathBuf,
    pub children: Vec<NodeId>,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    /// Only meaningful for folders.
    pub expanded: bool,
}

impl TreeNode {
    pub fn file(path: PathBuf, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::File,
            path,
            children: Vec::new(),
            parent,
            expanded: false,
        }
    }

    pub fn folder(path: PathBuf, parent: Option<NodeId>, expanded: bool) -> Self {
        Self {
            kind: NodeKind::Folder,
            path,
            children: Vec::new(),
            parent,
            expanded,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Last path component.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    /// Name shown in the tree: files lose the note extension.
    pub fn display_name(&self, note_extension: &str) -> String {
        let name = self.name();
        if self.kind == NodeKind::File && !note_extension.is_empty() {
            if let Some(stem) = name.strip_suffix(&format!(".{}", note_extension)) {
                if !stem.is_empty() {
                    return stem.to_string();
                }
            }
        }
        name
    }
}

/// Slot storage for tree nodes. Removed slots are never reused, so a stale
/// [`NodeId`] resolves to `None` instead of to another node.
#[derive(Debug, Default, Clone)]
pub struct Arena {
    slots: Vec<Option<TreeNode>>,
}

impl Arena {
    pub fn insert(&mut self, node: TreeNode) -> NodeId {
        self.slots.push(Some(node));
        NodeId(self.slots.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.slots.get(id.0).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.slots.get_mut(id.0).and_then(|s| s.as_mut())
    }

    /// Number of live nodes, root included.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Drop `id` and its whole subtree. Returns how many nodes were removed.
    fn remove_subtree(&mut self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.slots.get_mut(current.0).and_then(Option::take) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|n| (NodeId(i), n)))
    }
}

/// Construction and display policy for a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    /// Folders found while walking start expanded.
    pub expand_on_load: bool,
    /// Blank separator line before top-level folders.
    pub folder_gap: bool,
    /// Extension appended to new files and hidden in display names.
    pub note_extension: String,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            expand_on_load: true,
            folder_gap: false,
            note_extension: "md".to_string(),
        }
    }
}

/// Direction for single-step selection moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Input commands, one per tree operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveUp,
    MoveDown,
    /// Toggle the selected folder.
    ToggleExpand,
    SelectAtLine(usize),
    Hover(usize),
    CreateNode {
        parent: NodeId,
        name: String,
        kind: NodeKind,
    },
    DeleteNode(NodeId),
}

/// In-memory note tree plus its flattened projection, selection, and viewport.
pub struct FsTree {
    arena: Arena,
    root: NodeId,
    view: FlatView,
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
    height: usize,
    viewport: (usize, usize),
    options: TreeOptions,
    gateway: Arc<dyn FsGateway>,
}

impl FsTree {
    /// Walk `root_path` and build the tree. Dot-entries are skipped; any
    /// listing failure aborts the whole build.
    pub fn build(
        root_path: &Path,
        gateway: Arc<dyn FsGateway>,
        options: TreeOptions,
    ) -> Result<Self> {
        let mut arena = Arena::default();
        let root = arena.insert(TreeNode::folder(root_path.to_path_buf(), None, true));
        walk(&mut arena, gateway.as_ref(), root, options.expand_on_load)?;

        let selected = arena.get(root).and_then(|r| r.children.first().copied());
        let mut tree = Self {
            arena,
            root,
            view: FlatView::default(),
            selected,
            hovered: None,
            height: 0,
            viewport: (0, 0),
            options,
            gateway,
        };
        tree.refresh();
        info!(
            root = %root_path.display(),
            nodes = tree.arena.live_count() - 1,
            "built note tree"
        );
        Ok(tree)
    }

    // ── Read accessors ───────────────────────────────────────────────

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_path(&self) -> &Path {
        // The root slot is never removed.
        self.arena
            .get(self.root)
            .map(|n| n.path.as_path())
            .unwrap_or_else(|| Path::new(""))
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id)
    }

    pub fn view(&self) -> &FlatView {
        &self.view
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selected.and_then(|id| self.arena.get(id))
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Visible line range `[start, end)` as of the last update.
    pub fn viewport(&self) -> (usize, usize) {
        self.viewport
    }

    pub fn display_name(&self, id: NodeId) -> String {
        self.arena
            .get(id)
            .map(|n| n.display_name(&self.options.note_extension))
            .unwrap_or_default()
    }

    pub fn find_by_path(&self, path: &Path) -> Option<NodeId> {
        self.arena
            .iter()
            .find(|(_, n)| n.path == path)
            .map(|(id, _)| id)
    }

    /// Folder new entries go into: the node itself, or a file's parent.
    pub fn target_folder(&self, id: NodeId) -> Option<NodeId> {
        let node = self.arena.get(id)?;
        match node.kind {
            NodeKind::Folder => Some(id),
            NodeKind::File => node.parent,
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Dispatch one input command.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::MoveUp => self.move_selection(Direction::Up),
            Command::MoveDown => self.move_selection(Direction::Down),
            Command::ToggleExpand => self.toggle_selected_expand(),
            Command::SelectAtLine(line) => self.select_at_line(line),
            Command::Hover(line) => {
                self.hover_at_line(line);
                Ok(())
            }
            Command::CreateNode { parent, name, kind } => {
                self.create_child(parent, &name, kind).map(|_| ())
            }
            Command::DeleteNode(id) => self.delete(id),
        }
    }

    /// Create a file or folder under `parent` (a file resolves to its parent
    /// folder). The entry is materialised on disk before the tree changes.
    pub fn create_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> Result<NodeId> {
        let folder = self
            .target_folder(parent)
            .ok_or_else(|| AppError::InvalidArgument("parent node does not exist".into()))?;
        let name = self.validate_name(name, kind)?;
        let folder_path = self.node_ref(folder)?.path.clone();
        let path = folder_path.join(&name);

        match kind {
            NodeKind::File => self.gateway.create_file(&path, &[])?,
            NodeKind::Folder => self.gateway.create_folder(&path)?,
        }

        let id = match kind {
            NodeKind::File => self.arena.insert(TreeNode::file(path.clone(), Some(folder))),
            NodeKind::Folder => self
                .arena
                .insert(TreeNode::folder(path.clone(), Some(folder), true)),
        };
        let folder_node = self.node_mut(folder)?;
        match kind {
            NodeKind::File => folder_node.children.insert(0, id),
            NodeKind::Folder => folder_node.children.push(id),
        }
        let collapsed = !folder_node.expanded;

        self.selected = Some(id);
        if collapsed {
            self.toggle_expand(folder)?;
        } else {
            self.refresh();
        }
        info!(path = %path.display(), ?kind, "created node");
        Ok(id)
    }

    /// Delete a node and its subtree from disk and from the tree. The row
    /// above it becomes selected.
    pub fn delete(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_ref(id)?;
        let parent = node
            .parent
            .ok_or_else(|| AppError::InvalidOperation("the root cannot be deleted".into()))?;
        let path = node.path.clone();

        self.gateway.delete_recursive(&path)?;

        let recovered = self.view.prev_of(id);
        self.node_mut(parent)?.children.retain(|&c| c != id);
        let removed = self.arena.remove_subtree(id);

        self.selected = recovered.or_else(|| self.first_root_child());
        if self.hovered.is_some_and(|h| self.arena.get(h).is_none()) {
            self.hovered = None;
        }
        self.refresh();
        info!(path = %path.display(), removed, "deleted node");
        Ok(())
    }

    /// Flip a folder's expanded state.
    pub fn toggle_expand(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.kind != NodeKind::Folder {
            return Err(AppError::InvalidOperation(
                "only folders can be expanded or collapsed".into(),
            ));
        }
        node.expanded = !node.expanded;
        debug!(path = %node.path.display(), expanded = node.expanded, "toggled folder");
        self.refresh();
        Ok(())
    }

    pub fn toggle_selected_expand(&mut self) -> Result<()> {
        let id = self.selected.ok_or(AppError::NoSelection)?;
        self.toggle_expand(id)
    }

    /// Step the selection one row. At either edge this is a no-op.
    pub fn move_selection(&mut self, direction: Direction) -> Result<()> {
        let current = self.selected.ok_or(AppError::NoSelection)?;
        let target = match direction {
            Direction::Up => self.view.prev_of(current),
            Direction::Down => self.view.next_of(current),
        };
        if let Some(target) = target {
            self.selected = Some(target);
            self.viewport = self.compute_viewport_bounds();
        }
        Ok(())
    }

    /// Select the node drawn at `line`; folders also toggle.
    pub fn select_at_line(&mut self, line: usize) -> Result<()> {
        let id = self.view.node_at(line).ok_or(AppError::OutOfBounds(line))?;
        self.selected = Some(id);
        if self.node_ref(id)?.is_folder() {
            self.toggle_expand(id)?;
        } else {
            self.viewport = self.compute_viewport_bounds();
        }
        Ok(())
    }

    /// Hover whatever is at `line`, or nothing.
    pub fn hover_at_line(&mut self, line: usize) {
        self.hovered = self.view.node_at(line);
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    /// Expand collapsed ancestors of `path` and select it.
    pub fn reveal(&mut self, path: &Path) -> Result<NodeId> {
        let id = self
            .find_by_path(path)
            .ok_or_else(|| AppError::NotFound(path.to_path_buf()))?;

        let mut ancestors = Vec::new();
        let mut cursor = self.node_ref(id)?.parent;
        while let Some(ancestor) = cursor {
            if ancestor == self.root {
                break;
            }
            ancestors.push(ancestor);
            cursor = self.node_ref(ancestor)?.parent;
        }
        for ancestor in ancestors.into_iter().rev() {
            if !self.node_ref(ancestor)?.expanded {
                self.toggle_expand(ancestor)?;
            }
        }

        self.selected = Some(id);
        self.viewport = self.compute_viewport_bounds();
        Ok(id)
    }

    /// Record a new panel height and recompute the viewport.
    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.viewport = self.compute_viewport_bounds();
    }

    /// Centre the selected line within the panel height, clamped to the
    /// projection.
    pub fn compute_viewport_bounds(&self) -> (usize, usize) {
        let total = self.view.total_lines();
        let height = self.height;
        let Some(line) = self.selected.and_then(|id| self.view.line_of(id)) else {
            return (0, height.min(total));
        };

        let mut start = line.saturating_sub(height / 2);
        let mut end = start + height;
        if end > total {
            end = total;
            start = end.saturating_sub(height);
        }
        (start, end)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Rebuild the projection, keep the selection on a visible row, and
    /// recompute the viewport. Every mutation ends here.
    fn refresh(&mut self) {
        self.view = flatten(
            &self.arena,
            self.root,
            FlattenOptions {
                folder_gap: self.options.folder_gap,
            },
        );

        // A collapsed ancestor hides the selection: climb to the nearest visible one.
        let mut candidate = self.selected.filter(|&id| self.arena.get(id).is_some());
        while let Some(id) = candidate {
            if self.view.contains(id) {
                break;
            }
            candidate = self.arena.get(id).and_then(|n| n.parent);
        }
        self.selected = candidate.or_else(|| self.view.first());

        if self.hovered.is_some_and(|h| !self.view.contains(h)) {
            self.hovered = None;
        }
        self.viewport = self.compute_viewport_bounds();
    }

    fn first_root_child(&self) -> Option<NodeId> {
        self.arena
            .get(self.root)
            .and_then(|r| r.children.first().copied())
    }

    fn node_ref(&self, id: NodeId) -> Result<&TreeNode> {
        self.arena
            .get(id)
            .ok_or_else(|| AppError::InvalidArgument(format!("unknown node {:?}", id)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        self.arena
            .get_mut(id)
            .ok_or_else(|| AppError::InvalidArgument(format!("unknown node {:?}", id)))
    }

    fn validate_name(&self, name: &str, kind: NodeKind) -> Result<String> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidArgument("name cannot be empty".into()));
        }
        if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
            return Err(AppError::InvalidArgument(format!(
                "'{}' is not a valid name",
                name
            )));
        }
        let ext = &self.options.note_extension;
        if kind == NodeKind::File && !ext.is_empty() && !name.ends_with(&format!(".{}", ext)) {
            return Ok(format!("{}.{}", name, ext));
        }
        Ok(name.to_string())
    }
}

/// Populate `dir` with its entries: files first, then folders (each sorted
/// case-insensitively), recursing into every folder.
fn walk(arena: &mut Arena, gateway: &dyn FsGateway, dir: NodeId, expand: bool) -> Result<()> {
    let dir_path = match arena.get(dir) {
        Some(node) => node.path.clone(),
        None => return Ok(()),
    };

    let mut entries: Vec<_> = gateway
        .list_directory(&dir_path)?
        .into_iter()
        .filter(|e| !e.name.starts_with('.'))
        .collect();
    entries.sort_by(|a, b| {
        a.is_dir
            .cmp(&b.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.is_dir {
            let id = arena.insert(TreeNode::folder(entry.path, Some(dir), expand));
            children.push(id);
            walk(arena, gateway, id, expand)?;
        } else {
            children.push(arena.insert(TreeNode::file(entry.path, Some(dir))));
        }
    }

    if let Some(node) = arena.get_mut(dir) {
        node.children = children;
    }
    Ok(())
}
