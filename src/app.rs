use std::time::Instant;

use tracing::warn;

use remote_file_browser::browser::listing::PaneContent;
use remote_file_browser::browser::model::{base_name, FileEntry, ViewMode, ROOT_PATH};
use remote_file_browser::browser::tree::{Chevron, FlatNode, FolderNode, NodeState};
use remote_file_browser::dispatch::{MutationRequest, ServiceEvent};
use remote_file_browser::service::validate_folder_name;
use remote_file_browser::{Browser, BrowserError, RenderSink, Request};

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    CreateFolder { parent: String },
    RenameFolder { path: String },
    /// `is_empty` is filled in once the service answers.
    DeleteConfirm { path: String, is_empty: Option<bool> },
    Error { message: String },
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
    Help,
}

/// Which panel receives navigation keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tree,
    Listing,
}

/// State for a dialog's text input.
#[derive(Debug, Default)]
pub struct DialogState {
    pub input: String,
    pub cursor_position: usize,
    /// Validation message shown under the input.
    pub error: Option<String>,
}

/// Service work the event loop must hand to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(Vec<Request>),
    Mutate(MutationRequest),
    CheckEmpty(String),
}

/// What the core last told the renderer.
#[derive(Debug)]
pub struct ScreenState {
    pub listing: PaneContent,
    pub view_mode: ViewMode,
    listing_moved: bool,
    notices: Vec<String>,
}

impl ScreenState {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            listing: PaneContent::Idle,
            view_mode,
            listing_moved: false,
            notices: Vec::new(),
        }
    }
}

impl RenderSink for ScreenState {
    fn listing_changed(&mut self, content: &PaneContent, view_mode: ViewMode) {
        if content.path() != self.listing.path() {
            self.listing_moved = true;
        }
        self.listing = content.clone();
        self.view_mode = view_mode;
    }

    fn node_changed(&mut self, node: &FolderNode, state: &NodeState) {
        if let NodeState::Failed(message) = state {
            self.notices.push(format!("{}: {}", node.name, message));
        }
    }
}

/// Main application state.
pub struct App {
    pub browser: Browser<ScreenState>,
    pub focus: Focus,
    pub tree_cursor: usize,
    pub tree_scroll: usize,
    pub listing_cursor: usize,
    pub listing_scroll: usize,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub status_message: Option<(String, Instant)>,
    pub confirm_delete: bool,
    pub should_quit: bool,
    commands: Vec<Command>,
}

impl App {
    pub fn new(browser: Browser<ScreenState>, confirm_delete: bool) -> Self {
        Self {
            browser,
            focus: Focus::Tree,
            tree_cursor: 0,
            tree_scroll: 0,
            listing_cursor: 0,
            listing_scroll: 0,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            status_message: None,
            confirm_delete,
            should_quit: false,
            commands: Vec::new(),
        }
    }

    /// Load the tree and, if given, open `start_path`.
    pub fn start(&mut self, start_path: Option<&str>) {
        let requests = self.browser.start(start_path);
        self.queue(requests);
    }

    /// Drain the service work queued since the last call.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn queue(&mut self, requests: Vec<Request>) {
        if !requests.is_empty() {
            self.commands.push(Command::Load(requests));
        }
        self.sync_screen();
    }

    /// Pick up listing moves and node failures reported through the sink.
    fn sync_screen(&mut self) {
        let screen = self.browser.sink_mut();
        let moved = std::mem::take(&mut screen.listing_moved);
        let notices = std::mem::take(&mut screen.notices);
        if moved {
            self.listing_cursor = 0;
            self.listing_scroll = 0;
        }
        if let Some(last) = notices.last() {
            self.set_status_message(format!("⚠ {}", last));
        }
        self.clamp_cursors();
    }

    fn clamp_cursors(&mut self) {
        let tree_len = self.flat_tree().len();
        self.tree_cursor = self.tree_cursor.min(tree_len.saturating_sub(1));
        let listing_len = self.entries().len();
        self.listing_cursor = self.listing_cursor.min(listing_len.saturating_sub(1));
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn flat_tree(&self) -> Vec<FlatNode> {
        self.browser.tree().flatten()
    }

    pub fn selected_node(&self) -> Option<FlatNode> {
        self.flat_tree().into_iter().nth(self.tree_cursor)
    }

    pub fn entries(&self) -> &[FileEntry] {
        self.browser.sink().listing.entries()
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.entries().get(self.listing_cursor)
    }

    /// Folder a rename or delete applies to: the highlighted tree node, or
    /// the highlighted folder entry in the listing.
    fn target_folder(&self) -> Option<String> {
        match self.focus {
            Focus::Tree => self.selected_node().map(|n| n.path),
            Focus::Listing => self
                .selected_entry()
                .filter(|e| e.is_folder())
                .map(|e| e.path.clone()),
        }
    }

    // ── Navigation ───────────────────────────────────────────────────────────

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree => Focus::Listing,
            Focus::Listing => Focus::Tree,
        };
    }

    fn focused_len(&self) -> usize {
        match self.focus {
            Focus::Tree => self.flat_tree().len(),
            Focus::Listing => self.entries().len(),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.focus {
            Focus::Tree => &mut self.tree_cursor,
            Focus::Listing => &mut self.listing_cursor,
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let len = self.focused_len();
        let cursor = self.cursor_mut();
        if len > 0 && *cursor < len - 1 {
            *cursor += 1;
        }
    }

    /// Move selection up by one item.
    pub fn select_previous(&mut self) {
        let cursor = self.cursor_mut();
        *cursor = cursor.saturating_sub(1);
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) {
        *self.cursor_mut() = 0;
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) {
        let len = self.focused_len();
        *self.cursor_mut() = len.saturating_sub(1);
    }

    /// Expand the selected node, or step into its first child if already open.
    pub fn expand_selected(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        match node.chevron {
            Chevron::Collapsed => {
                let requests = self.browser.toggle_tree_node(&node.path);
                self.queue(requests);
            }
            Chevron::Expanded => self.select_next(),
            Chevron::None => {}
        }
    }

    /// Collapse the selected node, or jump to its parent.
    pub fn collapse_selected(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if node.chevron == Chevron::Expanded {
            let requests = self.browser.toggle_tree_node(&node.path);
            self.queue(requests);
            return;
        }
        let parent = self
            .browser
            .tree()
            .get(&node.path)
            .and_then(|n| n.parent.clone());
        if let Some(parent) = parent {
            self.reveal(&parent);
        }
    }

    /// Make the selected node current and expand or collapse it.
    pub fn activate_selected_node(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        let mut requests = self.browser.activate_folder(&node.path);
        requests.extend(self.browser.toggle_tree_node(&node.path));
        self.queue(requests);
    }

    /// Open the highlighted listing entry if it is a folder.
    pub fn open_selected_entry(&mut self) {
        let Some(path) = self
            .selected_entry()
            .filter(|e| e.is_folder())
            .map(|e| e.path.clone())
        else {
            return;
        };
        let requests = self.browser.activate_folder(&path);
        self.queue(requests);
        self.reveal(&path);
    }

    /// Show the parent of the current folder.
    pub fn go_to_parent(&mut self) {
        let requests = self.browser.activate_parent();
        self.queue(requests);
        if let Some(current) = self.browser.current_path().map(str::to_string) {
            self.reveal(&current);
        }
    }

    /// Put the tree cursor on `path` when it is visible.
    fn reveal(&mut self, path: &str) {
        if let Some(index) = self.flat_tree().iter().position(|n| n.path == path) {
            self.tree_cursor = index;
        }
    }

    // ── Sort / view ──────────────────────────────────────────────────────────

    pub fn cycle_view_mode(&mut self) {
        let next = self.browser.sort_view().view_mode().next();
        self.browser.set_view_mode(next);
        self.sync_screen();
    }

    pub fn cycle_sort_column(&mut self) {
        let sort = self.browser.sort_view();
        let (column, direction) = (sort.column().next(), sort.direction());
        let requests = self.browser.set_sort(column, direction);
        self.queue(requests);
    }

    pub fn flip_sort_direction(&mut self) {
        let sort = self.browser.sort_view();
        let (column, direction) = (sort.column(), sort.direction().flipped());
        let requests = self.browser.set_sort(column, direction);
        self.queue(requests);
    }

    /// Reload the tree from the top and re-fetch the current listing.
    pub fn refresh(&mut self) {
        let mut requests = self.browser.rebuild_tree();
        requests.extend(self.browser.reload_current());
        self.queue(requests);
        self.set_status_message("Refreshing…".to_string());
    }

    // ── Dialogs ──────────────────────────────────────────────────────────────

    /// Open a dialog of the given kind.
    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog_state = DialogState::default();
        if let DialogKind::RenameFolder { ref path } = kind {
            let name = base_name(path).to_string();
            self.dialog_state.cursor_position = name.len();
            self.dialog_state.input = name;
        }
        self.mode = AppMode::Dialog(kind);
    }

    /// Close the current dialog and return to normal mode.
    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Help => AppMode::Normal,
            _ => AppMode::Help,
        };
    }

    pub fn show_error(&mut self, message: String) {
        self.open_dialog(DialogKind::Error { message });
    }

    /// Start creating a folder inside the highlighted tree node or the current folder.
    pub fn begin_create(&mut self) {
        let parent = match self.focus {
            Focus::Tree => self.selected_node().map(|n| n.path),
            Focus::Listing => self.browser.current_path().map(str::to_string),
        };
        match parent {
            Some(parent) => self.open_dialog(DialogKind::CreateFolder { parent }),
            None => self.set_status_message("Select a folder first".to_string()),
        }
    }

    pub fn begin_rename(&mut self) {
        match self.target_folder().filter(|p| p != ROOT_PATH) {
            Some(path) => self.open_dialog(DialogKind::RenameFolder { path }),
            None => self.set_status_message("Select a folder to rename".to_string()),
        }
    }

    pub fn begin_delete(&mut self) {
        let Some(path) = self.target_folder().filter(|p| p != ROOT_PATH) else {
            self.set_status_message("Select a folder to delete".to_string());
            return;
        };
        if self.confirm_delete {
            self.commands.push(Command::CheckEmpty(path.clone()));
            self.open_dialog(DialogKind::DeleteConfirm {
                path,
                is_empty: None,
            });
        } else {
            self.commands.push(Command::Mutate(MutationRequest::Delete { path }));
        }
    }

    /// Submit the create/rename dialog. Invalid names keep the dialog open.
    pub fn submit_input_dialog(&mut self) {
        let name = match validate_folder_name(&self.dialog_state.input) {
            Ok(name) => name,
            Err(e) => {
                self.dialog_state.error = Some(e.inline_message());
                return;
            }
        };
        let request = match &self.mode {
            AppMode::Dialog(DialogKind::CreateFolder { parent }) => MutationRequest::Create {
                parent: parent.clone(),
                name,
            },
            AppMode::Dialog(DialogKind::RenameFolder { path }) => {
                if base_name(path) == name {
                    self.close_dialog();
                    return;
                }
                MutationRequest::Rename {
                    path: path.clone(),
                    new_name: name,
                }
            }
            _ => return,
        };
        self.commands.push(Command::Mutate(request));
        self.close_dialog();
    }

    pub fn confirm_delete_dialog(&mut self) {
        if let AppMode::Dialog(DialogKind::DeleteConfirm { path, .. }) = &self.mode {
            let path = path.clone();
            self.commands.push(Command::Mutate(MutationRequest::Delete { path }));
            self.close_dialog();
        }
    }

    /// Insert a character at the current cursor position.
    pub fn dialog_input_char(&mut self, c: char) {
        self.dialog_state
            .input
            .insert(self.dialog_state.cursor_position, c);
        self.dialog_state.cursor_position += c.len_utf8();
        self.dialog_state.error = None;
    }

    /// Delete the character before the cursor (backspace).
    pub fn dialog_delete_char(&mut self) {
        let before = &self.dialog_state.input[..self.dialog_state.cursor_position];
        if let Some(prev) = before.chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
            self.dialog_state
                .input
                .remove(self.dialog_state.cursor_position);
            self.dialog_state.error = None;
        }
    }

    /// Move cursor left by one character.
    pub fn dialog_move_cursor_left(&mut self) {
        let before = &self.dialog_state.input[..self.dialog_state.cursor_position];
        if let Some(prev) = before.chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
        }
    }

    /// Move cursor right by one character.
    pub fn dialog_move_cursor_right(&mut self) {
        let after = &self.dialog_state.input[self.dialog_state.cursor_position..];
        if let Some(next) = after.chars().next() {
            self.dialog_state.cursor_position += next.len_utf8();
        }
    }

    pub fn dialog_cursor_home(&mut self) {
        self.dialog_state.cursor_position = 0;
    }

    pub fn dialog_cursor_end(&mut self) {
        self.dialog_state.cursor_position = self.dialog_state.input.len();
    }

    // ── Status ───────────────────────────────────────────────────────────────

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created)) = self.status_message {
            if created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    // ── Service events ───────────────────────────────────────────────────────

    pub fn handle_service_event(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::Completed(completion) => {
                let requests = self.browser.complete(completion);
                self.queue(requests);
            }
            ServiceEvent::Mutated { request, result } => match result {
                Ok((mutation, message)) => {
                    let requests = self.browser.after_mutation(&mutation);
                    self.queue(requests);
                    if let Some(current) = self.browser.current_path().map(str::to_string) {
                        self.reveal(&current);
                    }
                    self.set_status_message(message.unwrap_or_else(|| done_message(&request)));
                }
                Err(e) => {
                    warn!(?request, error = %e, "mutation rejected");
                    self.show_error(failure_message(&request, &e));
                }
            },
            ServiceEvent::EmptyChecked { path, result } => {
                if let AppMode::Dialog(DialogKind::DeleteConfirm {
                    path: pending,
                    is_empty,
                }) = &mut self.mode
                {
                    if *pending == path {
                        *is_empty = result.ok();
                    }
                }
            }
        }
    }
}

fn done_message(request: &MutationRequest) -> String {
    match request {
        MutationRequest::Create { name, .. } => format!("Created folder '{}'", name),
        MutationRequest::Rename { new_name, .. } => format!("Renamed to '{}'", new_name),
        MutationRequest::Delete { path } => format!("Deleted '{}'", base_name(path)),
    }
}

fn failure_message(request: &MutationRequest, error: &BrowserError) -> String {
    match request {
        MutationRequest::Create { name, .. } | MutationRequest::Rename { new_name: name, .. }
            if error.is_conflict() =>
        {
            format!("A folder named '{}' already exists", name)
        }
        _ => error.inline_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_file_browser::browser::model::EntryKind;
    use remote_file_browser::browser::sort_view::SortViewState;
    use remote_file_browser::service::FolderInfo;
    use remote_file_browser::Completion;

    fn folder(path: &str, has_subfolders: bool) -> FolderInfo {
        FolderInfo::new(base_name(path), path, has_subfolders)
    }

    fn entry(path: &str, kind: EntryKind) -> FileEntry {
        FileEntry {
            name: base_name(path).into(),
            path: path.into(),
            kind,
            size: None,
            modified_at: None,
            thumbnail_ref: None,
        }
    }

    fn loads(app: &mut App) -> Vec<Request> {
        app.take_commands()
            .into_iter()
            .flat_map(|c| match c {
                Command::Load(requests) => requests,
                _ => Vec::new(),
            })
            .collect()
    }

    /// App with roots `/docs` (has subfolders) and `/pics` loaded.
    fn setup_app() -> App {
        let browser = Browser::new(
            SortViewState::default(),
            ScreenState::new(ViewMode::List),
        );
        let mut app = App::new(browser, true);
        app.start(None);
        let Some(Request::LoadRoots(load)) = loads(&mut app).pop() else {
            panic!("expected a root load");
        };
        app.handle_service_event(ServiceEvent::Completed(Completion::Roots {
            ticket: load.ticket,
            result: Ok(vec![folder("/docs", true), folder("/pics", false)]),
        }));
        app
    }

    /// Activate `/docs` and answer its listing.
    fn open_docs(app: &mut App) {
        app.activate_selected_node();
        for request in loads(app) {
            let completion = match request {
                Request::LoadListing(request) => Completion::Listing {
                    request,
                    result: Ok(vec![
                        entry("/docs/reports", EntryKind::Folder),
                        entry("/docs/a.txt", EntryKind::File),
                    ]),
                },
                Request::LoadChildren(load) => Completion::Children {
                    path: load.path.clone(),
                    ticket: load.ticket,
                    result: Ok(vec![folder("/docs/reports", false)]),
                },
                Request::LoadRoots(_) => continue,
            };
            app.handle_service_event(ServiceEvent::Completed(completion));
        }
    }

    #[test]
    fn select_next_and_previous_clamp() {
        let mut app = setup_app();
        assert_eq!(app.tree_cursor, 0);
        app.select_next();
        assert_eq!(app.tree_cursor, 1);
        app.select_next();
        assert_eq!(app.tree_cursor, 1);
        app.select_previous();
        app.select_previous();
        assert_eq!(app.tree_cursor, 0);
    }

    #[test]
    fn select_first_and_last() {
        let mut app = setup_app();
        app.select_last();
        assert_eq!(app.tree_cursor, 1);
        app.select_first();
        assert_eq!(app.tree_cursor, 0);
    }

    #[test]
    fn activate_node_loads_listing_and_children() {
        let mut app = setup_app();
        app.activate_selected_node();
        let requests = loads(&mut app);
        assert_eq!(requests.len(), 2);
        assert!(matches!(app.browser.sink().listing, PaneContent::Loading { .. }));
        assert_eq!(app.browser.current_path(), Some("/docs"));
    }

    #[test]
    fn listing_arrives_through_sink() {
        let mut app = setup_app();
        open_docs(&mut app);
        assert_eq!(app.entries().len(), 2);
        assert_eq!(app.flat_tree().len(), 3);
    }

    #[test]
    fn open_folder_entry_moves_current_and_resets_cursor() {
        let mut app = setup_app();
        open_docs(&mut app);
        app.toggle_focus();
        app.open_selected_entry();
        assert_eq!(app.browser.current_path(), Some("/docs/reports"));
        assert_eq!(app.listing_cursor, 0);
        // Tree cursor follows to the visible node
        assert_eq!(app.tree_cursor, 1);
    }

    #[test]
    fn open_file_entry_is_noop() {
        let mut app = setup_app();
        open_docs(&mut app);
        app.toggle_focus();
        app.select_next();
        app.take_commands();
        app.open_selected_entry();
        assert_eq!(app.browser.current_path(), Some("/docs"));
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn collapse_on_leaf_jumps_to_parent() {
        let mut app = setup_app();
        open_docs(&mut app);
        app.select_next();
        assert_eq!(app.selected_node().unwrap().path, "/docs/reports");
        app.collapse_selected();
        assert_eq!(app.tree_cursor, 0);
    }

    #[test]
    fn view_mode_cycle_never_queues_requests() {
        let mut app = setup_app();
        open_docs(&mut app);
        app.cycle_view_mode();
        assert_eq!(app.browser.sink().view_mode, ViewMode::Compact);
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn sort_change_refetches_current() {
        let mut app = setup_app();
        open_docs(&mut app);
        app.flip_sort_direction();
        assert!(matches!(
            loads(&mut app).as_slice(),
            [Request::LoadListing(_)]
        ));
    }

    #[test]
    fn invalid_name_stays_in_dialog() {
        let mut app = setup_app();
        app.begin_create();
        for c in "a/b".chars() {
            app.dialog_input_char(c);
        }
        app.submit_input_dialog();
        assert!(matches!(app.mode, AppMode::Dialog(DialogKind::CreateFolder { .. })));
        assert!(app.dialog_state.error.is_some());
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn create_submits_trimmed_name() {
        let mut app = setup_app();
        app.begin_create();
        for c in " new ".chars() {
            app.dialog_input_char(c);
        }
        app.submit_input_dialog();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(
            app.take_commands(),
            vec![Command::Mutate(MutationRequest::Create {
                parent: "/docs".into(),
                name: "new".into()
            })]
        );
    }

    #[test]
    fn rename_prefills_and_same_name_is_noop() {
        let mut app = setup_app();
        app.begin_rename();
        assert_eq!(app.dialog_state.input, "docs");
        assert_eq!(app.dialog_state.cursor_position, 4);
        app.submit_input_dialog();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn delete_asks_service_if_folder_is_empty() {
        let mut app = setup_app();
        app.take_commands();
        app.begin_delete();
        assert_eq!(app.take_commands(), vec![Command::CheckEmpty("/docs".into())]);
        app.handle_service_event(ServiceEvent::EmptyChecked {
            path: "/docs".into(),
            result: Ok(false),
        });
        assert_eq!(
            app.mode,
            AppMode::Dialog(DialogKind::DeleteConfirm {
                path: "/docs".into(),
                is_empty: Some(false)
            })
        );
        app.confirm_delete_dialog();
        assert_eq!(
            app.take_commands(),
            vec![Command::Mutate(MutationRequest::Delete {
                path: "/docs".into()
            })]
        );
    }

    #[test]
    fn delete_without_confirmation_submits_directly() {
        let mut app = setup_app();
        app.confirm_delete = false;
        app.take_commands();
        app.begin_delete();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(
            app.take_commands(),
            vec![Command::Mutate(MutationRequest::Delete {
                path: "/docs".into()
            })]
        );
    }

    #[test]
    fn rename_conflict_shows_friendly_error() {
        let mut app = setup_app();
        app.handle_service_event(ServiceEvent::Mutated {
            request: MutationRequest::Rename {
                path: "/docs".into(),
                new_name: "pics".into(),
            },
            result: Err(BrowserError::Service {
                status: Some(409),
                message: "Conflict".into(),
            }),
        });
        assert_eq!(
            app.mode,
            AppMode::Dialog(DialogKind::Error {
                message: "A folder named 'pics' already exists".into()
            })
        );
    }

    #[test]
    fn successful_mutation_rebuilds_and_reports() {
        let mut app = setup_app();
        let request = MutationRequest::Delete {
            path: "/pics".into(),
        };
        app.handle_service_event(ServiceEvent::Mutated {
            request: request.clone(),
            result: Ok((
                remote_file_browser::Mutation::Deleted {
                    path: "/pics".into(),
                },
                None,
            )),
        });
        assert!(loads(&mut app)
            .iter()
            .any(|r| matches!(r, Request::LoadRoots(_))));
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Deleted 'pics'");
    }

    #[test]
    fn failed_child_load_surfaces_in_status() {
        let mut app = setup_app();
        app.expand_selected();
        let Some(Request::LoadChildren(load)) = loads(&mut app).pop() else {
            panic!("expected a child load");
        };
        app.handle_service_event(ServiceEvent::Completed(Completion::Children {
            path: load.path,
            ticket: load.ticket,
            result: Err(BrowserError::Transport("timed out".into())),
        }));
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("docs"));
    }

    #[test]
    fn dialog_editing() {
        let mut app = setup_app();
        app.open_dialog(DialogKind::CreateFolder {
            parent: "/docs".into(),
        });
        app.dialog_input_char('a');
        app.dialog_input_char('é');
        app.dialog_input_char('c');
        app.dialog_move_cursor_left();
        app.dialog_delete_char();
        assert_eq!(app.dialog_state.input, "ac");
        assert_eq!(app.dialog_state.cursor_position, 1);
        app.dialog_cursor_end();
        assert_eq!(app.dialog_state.cursor_position, 2);
        app.dialog_cursor_home();
        app.dialog_move_cursor_left();
        assert_eq!(app.dialog_state.cursor_position, 0);
        app.dialog_move_cursor_right();
        assert_eq!(app.dialog_state.cursor_position, 1);
    }

    #[test]
    fn clear_expired_status_removes_old() {
        let mut app = setup_app();
        app.status_message = Some((
            "old".to_string(),
            Instant::now() - std::time::Duration::from_secs(5),
        ));
        app.clear_expired_status();
        assert!(app.status_message.is_none());
        app.set_status_message("fresh".to_string());
        app.clear_expired_status();
        assert!(app.status_message.is_some());
    }

    #[test]
    fn quit_sets_flag() {
        let mut app = setup_app();
        assert!(!app.should_quit);
        app.quit();
        assert!(app.should_quit);
    }
}
