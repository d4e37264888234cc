//! The browser core: folder tree, active selection and listing pane.
//!
//! Operations are synchronous state transitions. Anything that needs the
//! service comes back as a [`Request`]; the caller runs it and feeds the
//! outcome to [`Browser::complete`] as a [`Completion`]. Completions are
//! applied one at a time, so the core never sees data races, only
//! completions arriving in any order.

pub mod cache;
pub mod listing;
pub mod model;
pub mod selection;
pub mod sort_view;
pub mod tree;

use tracing::info;

use crate::error::Result;
use crate::service::FolderInfo;

use listing::{ListingPane, ListingRequest, PaneContent};
use model::{
    is_within, join_path, parent_path, rebase_path, FileEntry, SortColumn, SortDirection, ViewMode,
    ROOT_PATH,
};
use selection::ActiveSelection;
use sort_view::{SortViewChange, SortViewState, SubscriptionId};
use tree::{ChildLoad, FolderNode, FolderTree, NodeState, RootLoad, Toggle};

/// Work the core needs done by the listing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    LoadRoots(RootLoad),
    LoadChildren(ChildLoad),
    LoadListing(ListingRequest),
}

/// Outcome of a [`Request`].
#[derive(Debug)]
pub enum Completion {
    Roots {
        ticket: u64,
        result: Result<Vec<FolderInfo>>,
    },
    Children {
        path: String,
        ticket: u64,
        result: Result<Vec<FolderInfo>>,
    },
    Listing {
        request: ListingRequest,
        result: Result<Vec<FileEntry>>,
    },
}

/// A folder mutation that succeeded on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Created { parent: String, name: String },
    Renamed { path: String, new_name: String },
    Deleted { path: String },
}

/// Receives render-ready state whenever the core changes it.
pub trait RenderSink {
    /// The listing pane content or its presentation changed.
    fn listing_changed(&mut self, content: &PaneContent, view_mode: ViewMode);

    /// A tree node changed state (including becoming the active node).
    fn node_changed(&mut self, node: &FolderNode, state: &NodeState);

    /// The whole tree was discarded or re-seeded.
    fn tree_reset(&mut self) {}
}

pub struct Browser<S: RenderSink> {
    tree: FolderTree,
    selection: ActiveSelection,
    pane: ListingPane,
    sink: S,
}

impl<S: RenderSink> Browser<S> {
    pub fn new(sort_view: SortViewState, sink: S) -> Self {
        Self {
            tree: FolderTree::new(),
            selection: ActiveSelection::new(),
            pane: ListingPane::new(sort_view),
            sink,
        }
    }

    /// Load the top-level folders and, if given, show `start`.
    pub fn start(&mut self, start: Option<&str>) -> Vec<Request> {
        let mut requests = self.rebuild_tree();
        if let Some(path) = start {
            requests.extend(self.activate_folder(path));
        }
        requests
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn tree(&self) -> &FolderTree {
        &self.tree
    }

    pub fn pane(&self) -> &ListingPane {
        &self.pane
    }

    pub fn sort_view(&self) -> &SortViewState {
        self.pane.sort_view()
    }

    pub fn current_path(&self) -> Option<&str> {
        self.selection.current()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn subscribe_sort_view(
        &mut self,
        listener: impl FnMut(&SortViewChange) + Send + 'static,
    ) -> SubscriptionId {
        self.pane.subscribe(listener)
    }

    pub fn unsubscribe_sort_view(&mut self, id: SubscriptionId) -> bool {
        self.pane.unsubscribe(id)
    }

    // ── Operations ───────────────────────────────────────────────────────────

    /// Make `path` the current folder and show its listing.
    pub fn activate_folder(&mut self, path: &str) -> Vec<Request> {
        let previous = self.selection.current().map(str::to_string);
        self.selection.select(path);
        self.tree.set_active(Some(path));
        if let Some(prev) = previous.filter(|p| p != path) {
            self.notify_node(&prev);
        }
        self.notify_node(path);

        let request = self.pane.show_current_sort(path);
        self.render_listing();
        request.map(Request::LoadListing).into_iter().collect()
    }

    /// Show the parent of the current folder.
    pub fn activate_parent(&mut self) -> Vec<Request> {
        match self.selection.current().and_then(parent_path) {
            Some(parent) => self.activate_folder(&parent),
            None => Vec::new(),
        }
    }

    /// Expand or collapse a tree node.
    pub fn toggle_tree_node(&mut self, path: &str) -> Vec<Request> {
        match self.tree.toggle(path) {
            Toggle::Expanding(load) => {
                self.notify_node(path);
                vec![Request::LoadChildren(load)]
            }
            Toggle::Collapsed | Toggle::Expanded => {
                self.notify_node(path);
                Vec::new()
            }
            Toggle::Busy | Toggle::Unknown => Vec::new(),
        }
    }

    /// Change the sort and re-resolve the current folder under it.
    pub fn set_sort(&mut self, column: SortColumn, direction: SortDirection) -> Vec<Request> {
        let current = self.selection.current().map(str::to_string);
        let request = self.pane.set_sort(current.as_deref(), column, direction);
        if current.is_some() {
            self.render_listing();
        }
        request.map(Request::LoadListing).into_iter().collect()
    }

    /// Change the presentation mode. Never produces a request.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.pane.set_view_mode(mode) {
            self.render_listing();
        }
    }

    /// Drop every cached listing of `path`.
    pub fn invalidate(&mut self, path: &str) {
        let dropped = self.pane.invalidate(path);
        tracing::debug!(path, dropped, "listing invalidated");
    }

    /// Re-fetch the current folder's listing, bypassing the cache.
    pub fn reload_current(&mut self) -> Vec<Request> {
        let Some(current) = self.selection.current().map(str::to_string) else {
            return Vec::new();
        };
        self.pane.invalidate(&current);
        let request = self.pane.show_current_sort(&current);
        self.render_listing();
        request.map(Request::LoadListing).into_iter().collect()
    }

    /// Discard the tree and load it again from the top-level folders.
    pub fn rebuild_tree(&mut self) -> Vec<Request> {
        let load = self.tree.rebuild();
        self.sink.tree_reset();
        vec![Request::LoadRoots(load)]
    }

    /// Bring caches, tree and selection in line after a successful mutation.
    pub fn after_mutation(&mut self, mutation: &Mutation) -> Vec<Request> {
        info!(?mutation, "folder mutated");
        let current = self.selection.current().map(str::to_string);
        match mutation {
            Mutation::Created { parent, name } => {
                self.pane.invalidate(parent);
                self.pane.invalidate(&join_path(parent, name));
                let mut requests = if self.tree.contains(parent) {
                    self.refresh_node(parent)
                } else {
                    self.rebuild_tree()
                };
                if current.as_deref() == Some(parent.as_str()) {
                    requests.extend(self.reload_current());
                }
                requests
            }
            Mutation::Renamed { path, new_name } => {
                let parent = parent_path(path).unwrap_or_else(|| ROOT_PATH.to_string());
                let new_path = join_path(&parent, new_name);
                self.pane.invalidate_within(path);
                self.pane.invalidate(&new_path);
                self.pane.invalidate(&parent);

                let mut requests = self.rebuild_tree();
                self.tree.rebase_restore(path, &new_path);
                match current {
                    Some(cur) if is_within(&cur, path) => {
                        let moved = rebase_path(&cur, path, &new_path).unwrap_or(new_path);
                        requests.extend(self.activate_folder(&moved));
                    }
                    Some(cur) if cur == parent => requests.extend(self.reload_current()),
                    _ => {}
                }
                requests
            }
            Mutation::Deleted { path } => {
                let parent = parent_path(path).unwrap_or_else(|| ROOT_PATH.to_string());
                self.pane.invalidate_within(path);
                self.pane.invalidate(&parent);

                let mut requests = self.rebuild_tree();
                match current {
                    Some(cur) if is_within(&cur, path) => {
                        requests.extend(self.activate_folder(&parent));
                    }
                    Some(cur) if cur == parent => requests.extend(self.reload_current()),
                    _ => {}
                }
                requests
            }
        }
    }

    /// Re-fetch a node's children, keeping it expanded if it was.
    fn refresh_node(&mut self, path: &str) -> Vec<Request> {
        let was_expanded = self
            .tree
            .get(path)
            .is_some_and(|n| n.expanded || n.load_state == tree::LoadState::Loading);
        self.tree.invalidate_subtree(path);
        self.notify_node(path);
        if was_expanded {
            self.toggle_tree_node(path)
        } else {
            Vec::new()
        }
    }

    /// Apply the outcome of a request.
    pub fn complete(&mut self, completion: Completion) -> Vec<Request> {
        match completion {
            Completion::Roots { ticket, result } => {
                let loads = self.tree.finish_roots(ticket, result);
                if let Some(active) = self.selection.current().map(str::to_string) {
                    self.tree.set_active(Some(&active));
                }
                self.sink.tree_reset();
                self.issue_loads(loads)
            }
            Completion::Children {
                path,
                ticket,
                result,
            } => {
                let loads = self.tree.finish_children(&path, ticket, result);
                self.notify_node(&path);
                self.issue_loads(loads)
            }
            Completion::Listing { request, result } => {
                if self.pane.finish(&request, result) {
                    self.render_listing();
                }
                Vec::new()
            }
        }
    }

    fn issue_loads(&mut self, loads: Vec<ChildLoad>) -> Vec<Request> {
        for load in &loads {
            self.notify_node(&load.path);
        }
        loads.into_iter().map(Request::LoadChildren).collect()
    }

    fn notify_node(&mut self, path: &str) {
        if let Some(node) = self.tree.get(path) {
            let state = node.state();
            self.sink.node_changed(node, &state);
        }
    }

    fn render_listing(&mut self) {
        let view_mode = self.pane.view_mode();
        self.sink.listing_changed(self.pane.content(), view_mode);
    }
}
