//! Folder tree: per-node load/expand state with lazily fetched children.
//!
//! Nodes live in an arena keyed by path. A parent owns its children through
//! the list of child paths; the `parent` field is a plain path used for
//! lookups and never for mutation. Every child load carries a ticket, and a
//! completion whose ticket is no longer the node's pending ticket is ignored.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::model::{is_within, rebase_path};
use crate::error::{BrowserError, Result};
use crate::service::FolderInfo;

/// Load state of a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}

/// Visual state reported to the renderer whenever a node changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Collapsed,
    Loading,
    Expanded,
    /// Loaded and expanded, but the folder has no subfolders.
    ExpandedEmpty,
    /// The last child load failed; the node is back to Unloaded.
    Failed(String),
}

/// Expand indicator for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chevron {
    Collapsed,
    Expanded,
    /// Nothing to expand (hint says so, or a load found no subfolders).
    None,
}

/// A folder in the tree.
#[derive(Debug, Clone)]
pub struct FolderNode {
    pub path: String,
    pub name: String,
    /// Hint from the service, not refreshed after the node is created.
    pub has_children: bool,
    pub load_state: LoadState,
    pub expanded: bool,
    /// Paths of the children, in service order. Empty unless Loaded.
    pub children: Vec<String>,
    pub parent: Option<String>,
    pub depth: usize,
    /// Error from the last failed child load.
    pub error: Option<BrowserError>,
    ticket: Option<u64>,
}

impl FolderNode {
    fn from_info(info: FolderInfo, parent: Option<String>, depth: usize) -> Self {
        Self {
            path: info.path,
            name: info.name,
            has_children: info.has_subfolders,
            load_state: LoadState::Unloaded,
            expanded: false,
            children: Vec::new(),
            parent,
            depth,
            error: None,
            ticket: None,
        }
    }

    pub fn state(&self) -> NodeState {
        match (self.load_state, self.expanded) {
            (LoadState::Loading, _) => NodeState::Loading,
            (LoadState::Loaded, true) if self.children.is_empty() => NodeState::ExpandedEmpty,
            (LoadState::Loaded, true) => NodeState::Expanded,
            _ => match &self.error {
                Some(err) => NodeState::Failed(err.inline_message()),
                None => NodeState::Collapsed,
            },
        }
    }

    pub fn chevron(&self) -> Chevron {
        match self.load_state {
            LoadState::Loaded if self.children.is_empty() => Chevron::None,
            LoadState::Loaded if self.expanded => Chevron::Expanded,
            LoadState::Loaded => Chevron::Collapsed,
            _ if self.has_children => Chevron::Collapsed,
            _ => Chevron::None,
        }
    }
}

/// Request to fetch the subfolders of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLoad {
    pub path: String,
    pub ticket: u64,
}

/// Request to fetch the top-level folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootLoad {
    pub ticket: u64,
}

/// Result of [`FolderTree::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// Was expanded; children stay in memory.
    Collapsed,
    /// Was collapsed with children already loaded.
    Expanded,
    /// Was unloaded; exactly one child load must be issued.
    Expanding(ChildLoad),
    /// A child load is already in flight; nothing to do.
    Busy,
    /// No node with that path.
    Unknown,
}

/// A node flattened for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub is_last_sibling: bool,
    pub chevron: Chevron,
    pub state: NodeState,
    pub is_active: bool,
}

/// The folder hierarchy.
#[derive(Debug, Default)]
pub struct FolderTree {
    nodes: HashMap<String, FolderNode>,
    roots: Vec<String>,
    next_ticket: u64,
    roots_ticket: Option<u64>,
    roots_error: Option<BrowserError>,
    /// Paths that were expanded before the last rebuild, re-expanded as they reappear.
    restore: HashSet<String>,
    active: Option<String>,
}

impl FolderTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Seed the top-level nodes, Unloaded and collapsed.
    ///
    /// Issues no request of its own; returns loads only for roots that were
    /// expanded before a rebuild.
    pub fn initialize(&mut self, roots: Vec<FolderInfo>) -> Vec<ChildLoad> {
        self.nodes.clear();
        self.roots.clear();
        self.roots_ticket = None;
        self.roots_error = None;
        for info in roots {
            if self.nodes.contains_key(&info.path) {
                continue;
            }
            let node = FolderNode::from_info(info, None, 0);
            self.roots.push(node.path.clone());
            self.nodes.insert(node.path.clone(), node);
        }
        let roots = self.roots.clone();
        self.prune_restore(None, &roots);
        let loads = self.restore_loads(&roots);
        debug!(roots = self.roots.len(), restoring = loads.len(), "tree initialized");
        loads
    }

    /// Discard every node and request a fresh root listing.
    ///
    /// Currently expanded paths are remembered and re-expanded when they show
    /// up again.
    pub fn rebuild(&mut self) -> RootLoad {
        self.restore = self
            .nodes
            .values()
            .filter(|n| n.expanded || n.load_state == LoadState::Loading)
            .map(|n| n.path.clone())
            .collect();
        self.nodes.clear();
        self.roots.clear();
        self.roots_error = None;
        let ticket = self.take_ticket();
        self.roots_ticket = Some(ticket);
        RootLoad { ticket }
    }

    /// Apply the result of a root load. Stale tickets are ignored.
    pub fn finish_roots(&mut self, ticket: u64, result: Result<Vec<FolderInfo>>) -> Vec<ChildLoad> {
        if self.roots_ticket != Some(ticket) {
            debug!(ticket, "discarding stale root listing");
            return Vec::new();
        }
        match result {
            Ok(roots) => self.initialize(roots),
            Err(err) => {
                warn!(error = %err, "root folder listing failed");
                self.roots_ticket = None;
                self.roots_error = Some(err);
                self.restore.clear();
                Vec::new()
            }
        }
    }

    /// Toggle a node between expanded and collapsed, loading children on first expand.
    pub fn toggle(&mut self, path: &str) -> Toggle {
        let Some(node) = self.nodes.get(path) else {
            return Toggle::Unknown;
        };
        match (node.load_state, node.expanded) {
            (LoadState::Loading, _) => Toggle::Busy,
            (LoadState::Loaded, true) => {
                if let Some(node) = self.nodes.get_mut(path) {
                    node.expanded = false;
                }
                Toggle::Collapsed
            }
            (LoadState::Loaded, false) => {
                if let Some(node) = self.nodes.get_mut(path) {
                    node.expanded = true;
                }
                Toggle::Expanded
            }
            (LoadState::Unloaded, _) => match self.start_load(path) {
                Some(load) => Toggle::Expanding(load),
                None => Toggle::Unknown,
            },
        }
    }

    fn start_load(&mut self, path: &str) -> Option<ChildLoad> {
        let ticket = self.take_ticket();
        let node = self.nodes.get_mut(path)?;
        node.load_state = LoadState::Loading;
        node.expanded = false;
        node.error = None;
        node.ticket = Some(ticket);
        Some(ChildLoad {
            path: path.to_string(),
            ticket,
        })
    }

    /// Apply the result of a child load.
    ///
    /// On success the node becomes Loaded and expanded; on failure it reverts
    /// to Unloaded and keeps the error for inline display. A completion for a
    /// node that was invalidated or rebuilt in the meantime is ignored.
    pub fn finish_children(
        &mut self,
        path: &str,
        ticket: u64,
        result: Result<Vec<FolderInfo>>,
    ) -> Vec<ChildLoad> {
        let Some(node) = self.nodes.get(path) else {
            debug!(path, ticket, "discarding child listing for unknown node");
            return Vec::new();
        };
        if node.ticket != Some(ticket) {
            debug!(path, ticket, "discarding stale child listing");
            return Vec::new();
        }
        let depth = node.depth + 1;
        self.restore.remove(path);

        let folders = match result {
            Ok(folders) => folders,
            Err(err) => {
                warn!(path, error = %err, "child folder listing failed");
                if let Some(node) = self.nodes.get_mut(path) {
                    node.load_state = LoadState::Unloaded;
                    node.expanded = false;
                    node.ticket = None;
                    node.error = Some(err);
                }
                return Vec::new();
            }
        };

        self.remove_descendants(path);
        let mut child_paths = Vec::with_capacity(folders.len());
        for info in folders {
            if info.path == path || self.nodes.contains_key(&info.path) {
                continue;
            }
            let child = FolderNode::from_info(info, Some(path.to_string()), depth);
            child_paths.push(child.path.clone());
            self.nodes.insert(child.path.clone(), child);
        }
        if let Some(node) = self.nodes.get_mut(path) {
            node.children = child_paths.clone();
            node.load_state = LoadState::Loaded;
            node.expanded = true;
            node.ticket = None;
            node.error = None;
        }
        self.prune_restore(Some(path), &child_paths);
        self.restore_loads(&child_paths)
    }

    /// Forget remembered paths under `scope` that are not under any of `present`.
    fn prune_restore(&mut self, scope: Option<&str>, present: &[String]) {
        self.restore.retain(|p| {
            let in_scope = scope.map_or(true, |s| p != s && is_within(p, s));
            !in_scope || present.iter().any(|k| is_within(p, k))
        });
    }

    /// Move remembered expansion from `from` to `to` after a rename.
    pub fn rebase_restore(&mut self, from: &str, to: &str) {
        self.restore = self
            .restore
            .drain()
            .map(|p| rebase_path(&p, from, to).unwrap_or(p))
            .collect();
    }

    fn restore_loads(&mut self, candidates: &[String]) -> Vec<ChildLoad> {
        if self.restore.is_empty() {
            return Vec::new();
        }
        let wanted: Vec<String> = candidates
            .iter()
            .filter(|p| self.restore.contains(*p))
            .cloned()
            .collect();
        wanted.iter().filter_map(|p| self.start_load(p)).collect()
    }

    /// Force a node back to Unloaded and drop its children.
    ///
    /// A child load in flight for it becomes stale. Returns `false` if the
    /// path is not in the tree.
    pub fn invalidate_subtree(&mut self, path: &str) -> bool {
        if !self.nodes.contains_key(path) {
            return false;
        }
        self.remove_descendants(path);
        self.restore.retain(|p| !is_within(p, path));
        if let Some(node) = self.nodes.get_mut(path) {
            node.children.clear();
            node.load_state = LoadState::Unloaded;
            node.expanded = false;
            node.ticket = None;
            node.error = None;
        }
        true
    }

    fn remove_descendants(&mut self, path: &str) {
        let children = match self.nodes.get_mut(path) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.remove_descendants(&child);
            self.nodes.remove(&child);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn get(&self, path: &str) -> Option<&FolderNode> {
        self.nodes.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn roots(&self) -> impl Iterator<Item = &FolderNode> {
        self.roots.iter().filter_map(|p| self.nodes.get(p))
    }

    pub fn children_of<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a FolderNode> + 'a {
        self.nodes
            .get(path)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|p| self.nodes.get(p))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots_loading(&self) -> bool {
        self.roots_ticket.is_some()
    }

    pub fn roots_error(&self) -> Option<&BrowserError> {
        self.roots_error.as_ref()
    }

    /// Mark the node rendered as the current folder.
    pub fn set_active(&mut self, path: Option<&str>) {
        self.active = path.map(str::to_string);
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Flatten the visible part of the tree (expanded nodes' children) in display order.
    pub fn flatten(&self) -> Vec<FlatNode> {
        let mut items = Vec::new();
        let count = self.roots.len();
        for (i, root) in self.roots.iter().enumerate() {
            self.flatten_node(root, i + 1 == count, &mut items);
        }
        items
    }

    fn flatten_node(&self, path: &str, is_last: bool, items: &mut Vec<FlatNode>) {
        let Some(node) = self.nodes.get(path) else {
            return;
        };
        items.push(FlatNode {
            path: node.path.clone(),
            name: node.name.clone(),
            depth: node.depth,
            is_last_sibling: is_last,
            chevron: node.chevron(),
            state: node.state(),
            is_active: self.active.as_deref() == Some(node.path.as_str()),
        });
        if node.expanded {
            let count = node.children.len();
            for (i, child) in node.children.iter().enumerate() {
                self.flatten_node(child, i + 1 == count, items);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(path: &str, has_subfolders: bool) -> FolderInfo {
        let name = path.rsplit('/').next().unwrap_or(path);
        FolderInfo::new(name, path, has_subfolders)
    }

    fn seeded() -> FolderTree {
        let mut tree = FolderTree::new();
        let loads = tree.initialize(vec![folder("/docs", true), folder("/pics", false)]);
        assert!(loads.is_empty());
        tree
    }

    fn expand(tree: &mut FolderTree, path: &str, children: Vec<FolderInfo>) {
        let Toggle::Expanding(load) = tree.toggle(path) else {
            panic!("expected a load for {path}");
        };
        tree.finish_children(&load.path, load.ticket, Ok(children));
    }

    #[test]
    fn initialize_seeds_unloaded_collapsed_roots() {
        let tree = seeded();
        let roots: Vec<&FolderNode> = tree.roots().collect();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].path, "/docs");
        assert_eq!(roots[0].load_state, LoadState::Unloaded);
        assert!(!roots[0].expanded);
        assert_eq!(roots[0].depth, 0);
    }

    #[test]
    fn first_toggle_issues_one_load_and_second_is_busy() {
        let mut tree = seeded();
        let first = tree.toggle("/docs");
        assert!(matches!(first, Toggle::Expanding(ref l) if l.path == "/docs"));
        assert_eq!(tree.get("/docs").unwrap().load_state, LoadState::Loading);
        assert_eq!(tree.toggle("/docs"), Toggle::Busy);
        assert_eq!(tree.toggle("/docs"), Toggle::Busy);
    }

    #[test]
    fn successful_load_expands_and_populates_children() {
        let mut tree = seeded();
        expand(&mut tree, "/docs", vec![folder("/docs/a", false), folder("/docs/b", true)]);
        let docs = tree.get("/docs").unwrap();
        assert_eq!(docs.load_state, LoadState::Loaded);
        assert!(docs.expanded);
        assert_eq!(docs.children, vec!["/docs/a", "/docs/b"]);
        let a = tree.get("/docs/a").unwrap();
        assert_eq!(a.parent.as_deref(), Some("/docs"));
        assert_eq!(a.depth, 1);
        assert_eq!(a.load_state, LoadState::Unloaded);
    }

    #[test]
    fn collapse_keeps_children_and_reexpand_needs_no_load() {
        let mut tree = seeded();
        expand(&mut tree, "/docs", vec![folder("/docs/a", false)]);
        assert_eq!(tree.toggle("/docs"), Toggle::Collapsed);
        assert!(tree.contains("/docs/a"));
        assert_eq!(tree.get("/docs").unwrap().load_state, LoadState::Loaded);
        assert_eq!(tree.toggle("/docs"), Toggle::Expanded);
        assert!(tree.get("/docs").unwrap().expanded);
    }

    #[test]
    fn failed_load_reverts_to_unloaded_with_error() {
        let mut tree = seeded();
        let Toggle::Expanding(load) = tree.toggle("/docs") else {
            panic!("expected load");
        };
        tree.finish_children(
            &load.path,
            load.ticket,
            Err(BrowserError::Transport("connection refused".into())),
        );
        let docs = tree.get("/docs").unwrap();
        assert_eq!(docs.load_state, LoadState::Unloaded);
        assert!(!docs.expanded);
        assert!(matches!(docs.state(), NodeState::Failed(ref m) if m.contains("connection refused")));
        // Other nodes unaffected
        assert_eq!(tree.get("/pics").unwrap().state(), NodeState::Collapsed);
        // Retry is a fresh load
        assert!(matches!(tree.toggle("/docs"), Toggle::Expanding(_)));
    }

    #[test]
    fn retry_clears_previous_error() {
        let mut tree = seeded();
        let Toggle::Expanding(load) = tree.toggle("/docs") else {
            panic!("expected load");
        };
        tree.finish_children(&load.path, load.ticket, Err(BrowserError::service("boom")));
        assert!(matches!(tree.toggle("/docs"), Toggle::Expanding(_)));
        assert!(tree.get("/docs").unwrap().error.is_none());
        assert_eq!(tree.get("/docs").unwrap().state(), NodeState::Loading);
    }

    #[test]
    fn hinted_folder_with_no_actual_children_is_expanded_empty() {
        let mut tree = seeded();
        assert_eq!(tree.get("/docs").unwrap().chevron(), Chevron::Collapsed);
        expand(&mut tree, "/docs", vec![]);
        let docs = tree.get("/docs").unwrap();
        assert_eq!(docs.load_state, LoadState::Loaded);
        assert!(docs.expanded);
        assert_eq!(docs.state(), NodeState::ExpandedEmpty);
        assert_eq!(docs.chevron(), Chevron::None);
        assert_eq!(tree.children_of("/docs").count(), 0);
    }

    #[test]
    fn chevron_follows_hint_before_load() {
        let tree = seeded();
        assert_eq!(tree.get("/pics").unwrap().chevron(), Chevron::None);
    }

    #[test]
    fn invalidate_subtree_drops_children_and_resets() {
        let mut tree = seeded();
        expand(&mut tree, "/docs", vec![folder("/docs/a", true)]);
        expand(&mut tree, "/docs/a", vec![folder("/docs/a/x", false)]);
        assert!(tree.invalidate_subtree("/docs"));
        let docs = tree.get("/docs").unwrap();
        assert_eq!(docs.load_state, LoadState::Unloaded);
        assert!(!docs.expanded);
        assert!(docs.children.is_empty());
        assert!(!tree.contains("/docs/a"));
        assert!(!tree.contains("/docs/a/x"));
        assert!(matches!(tree.toggle("/docs"), Toggle::Expanding(_)));
    }

    #[test]
    fn invalidate_unknown_path_is_false() {
        let mut tree = seeded();
        assert!(!tree.invalidate_subtree("/nope"));
    }

    #[test]
    fn completion_after_invalidate_is_ignored() {
        let mut tree = seeded();
        let Toggle::Expanding(old) = tree.toggle("/docs") else {
            panic!("expected load");
        };
        tree.invalidate_subtree("/docs");
        let Toggle::Expanding(new) = tree.toggle("/docs") else {
            panic!("expected load");
        };
        tree.finish_children(&old.path, old.ticket, Ok(vec![folder("/docs/stale", false)]));
        assert!(!tree.contains("/docs/stale"));
        assert_eq!(tree.get("/docs").unwrap().load_state, LoadState::Loading);
        tree.finish_children(&new.path, new.ticket, Ok(vec![folder("/docs/fresh", false)]));
        assert!(tree.contains("/docs/fresh"));
    }

    #[test]
    fn toggle_unknown_path() {
        let mut tree = seeded();
        assert_eq!(tree.toggle("/missing"), Toggle::Unknown);
    }

    #[test]
    fn rebuild_discards_nodes_and_restores_expansion() {
        let mut tree = seeded();
        expand(&mut tree, "/docs", vec![folder("/docs/a", true), folder("/docs/b", false)]);
        expand(&mut tree, "/docs/a", vec![folder("/docs/a/x", false)]);

        let root_load = tree.rebuild();
        assert!(tree.is_empty());
        assert!(tree.roots_loading());

        let loads = tree.finish_roots(root_load.ticket, Ok(vec![folder("/docs", true)]));
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].path, "/docs");
        let loads = tree.finish_children(
            "/docs",
            loads[0].ticket,
            Ok(vec![folder("/docs/a", true), folder("/docs/b", false)]),
        );
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].path, "/docs/a");
        let loads = tree.finish_children("/docs/a", loads[0].ticket, Ok(vec![]));
        assert!(loads.is_empty());
        assert!(tree.get("/docs/a").unwrap().expanded);
        assert!(!tree.contains("/pics"));
    }

    #[test]
    fn rebuild_after_rename_restores_under_new_path() {
        let mut tree = seeded();
        expand(&mut tree, "/docs", vec![folder("/docs/a", false)]);

        let root_load = tree.rebuild();
        tree.rebase_restore("/docs", "/papers");
        let loads = tree.finish_roots(
            root_load.ticket,
            Ok(vec![folder("/papers", true), folder("/pics", false)]),
        );
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].path, "/papers");
        assert!(!tree.contains("/docs"));
    }

    #[test]
    fn vanished_paths_are_forgotten() {
        let mut tree = seeded();
        expand(&mut tree, "/docs", vec![folder("/docs/a", true)]);
        expand(&mut tree, "/docs/a", vec![]);

        let root_load = tree.rebuild();
        let loads = tree.finish_roots(root_load.ticket, Ok(vec![folder("/docs", true)]));
        let loads = tree.finish_children("/docs", loads[0].ticket, Ok(vec![]));
        assert!(loads.is_empty());
        assert!(tree.restore.is_empty());
    }

    #[test]
    fn stale_root_listing_is_ignored() {
        let mut tree = seeded();
        let first = tree.rebuild();
        let second = tree.rebuild();
        tree.finish_roots(first.ticket, Ok(vec![folder("/old", false)]));
        assert!(!tree.contains("/old"));
        tree.finish_roots(second.ticket, Ok(vec![folder("/new", false)]));
        assert!(tree.contains("/new"));
        assert!(!tree.roots_loading());
    }

    #[test]
    fn root_listing_failure_is_kept() {
        let mut tree = FolderTree::new();
        let load = tree.rebuild();
        tree.finish_roots(load.ticket, Err(BrowserError::Transport("offline".into())));
        assert!(tree.roots_error().is_some());
        assert!(!tree.roots_loading());
        assert!(tree.is_empty());
    }

    #[test]
    fn flatten_lists_visible_nodes_in_order() {
        let mut tree = seeded();
        expand(&mut tree, "/docs", vec![folder("/docs/a", false), folder("/docs/b", false)]);
        tree.set_active(Some("/docs/b"));
        let flat = tree.flatten();
        let paths: Vec<&str> = flat.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["/docs", "/docs/a", "/docs/b", "/pics"]);
        assert!(!flat[1].is_last_sibling);
        assert!(flat[2].is_last_sibling);
        assert!(flat[2].is_active);
        assert!(flat[3].is_last_sibling);
        assert_eq!(flat[0].chevron, Chevron::Expanded);
    }

    #[test]
    fn flatten_hides_collapsed_children() {
        let mut tree = seeded();
        expand(&mut tree, "/docs", vec![folder("/docs/a", false)]);
        tree.toggle("/docs");
        assert_eq!(tree.flatten().len(), 2);
    }
}
