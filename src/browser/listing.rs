//! Listing pane: resolves "entries for path P under sort (C, D)" through the
//! cache or a sequenced request, and holds what the pane currently shows.

use std::sync::Arc;

use tracing::{debug, warn};

use super::cache::{ListingCache, ListingKey};
use super::model::{FileEntry, SortColumn, SortDirection, ViewMode};
use super::sort_view::{SortViewChange, SortViewState, SubscriptionId};
use crate::error::{BrowserError, Result};

/// A listing fetch. Only the one carrying the latest sequence number is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub seq: u64,
    pub key: ListingKey,
}

/// What the listing pane shows.
#[derive(Debug, Clone)]
pub enum PaneContent {
    /// Nothing selected yet.
    Idle,
    Loading {
        path: String,
    },
    Entries {
        path: String,
        entries: Arc<Vec<FileEntry>>,
    },
    /// Successful listing with no entries.
    Empty {
        path: String,
    },
    Failed {
        path: String,
        error: BrowserError,
    },
}

impl PaneContent {
    pub fn path(&self) -> Option<&str> {
        match self {
            PaneContent::Idle => None,
            PaneContent::Loading { path }
            | PaneContent::Entries { path, .. }
            | PaneContent::Empty { path }
            | PaneContent::Failed { path, .. } => Some(path),
        }
    }

    pub fn entries(&self) -> &[FileEntry] {
        match self {
            PaneContent::Entries { entries, .. } => entries.as_slice(),
            _ => &[],
        }
    }

    fn from_listing(path: &str, entries: Arc<Vec<FileEntry>>) -> Self {
        if entries.is_empty() {
            PaneContent::Empty {
                path: path.to_string(),
            }
        } else {
            PaneContent::Entries {
                path: path.to_string(),
                entries,
            }
        }
    }
}

/// Coordinates the cache, the sort/view state and listing requests.
#[derive(Debug)]
pub struct ListingPane {
    cache: ListingCache,
    sort_view: SortViewState,
    latest_seq: u64,
    in_flight: Option<ListingRequest>,
    content: PaneContent,
}

impl ListingPane {
    pub fn new(sort_view: SortViewState) -> Self {
        Self {
            cache: ListingCache::new(),
            sort_view,
            latest_seq: 0,
            in_flight: None,
            content: PaneContent::Idle,
        }
    }

    pub fn sort_view(&self) -> &SortViewState {
        &self.sort_view
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SortViewChange) + Send + 'static,
    ) -> SubscriptionId {
        self.sort_view.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.sort_view.unsubscribe(id)
    }

    pub fn content(&self) -> &PaneContent {
        &self.content
    }

    pub fn view_mode(&self) -> ViewMode {
        self.sort_view.view_mode()
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    /// The request whose result will be committed, if one is outstanding.
    pub fn in_flight(&self) -> Option<&ListingRequest> {
        self.in_flight.as_ref()
    }

    /// Show `path` under the given sort.
    ///
    /// A cache hit updates the content immediately and returns `None`;
    /// otherwise the pane goes to Loading and the returned request must be
    /// issued. Either way any older outstanding request is superseded.
    pub fn show(
        &mut self,
        path: &str,
        column: SortColumn,
        direction: SortDirection,
    ) -> Option<ListingRequest> {
        self.latest_seq += 1;
        let key = ListingKey::new(path, column, direction);

        if let Some(entries) = self.cache.get(&key) {
            debug!(path, ?column, ?direction, "listing cache hit");
            self.in_flight = None;
            self.content = PaneContent::from_listing(path, entries);
            return None;
        }

        let request = ListingRequest {
            seq: self.latest_seq,
            key,
        };
        debug!(path, seq = request.seq, "listing cache miss, fetching");
        self.in_flight = Some(request.clone());
        self.content = PaneContent::Loading {
            path: path.to_string(),
        };
        Some(request)
    }

    /// Commit a listing result. Returns `false` when a newer request
    /// superseded it and the result was dropped.
    pub fn finish(&mut self, request: &ListingRequest, result: Result<Vec<FileEntry>>) -> bool {
        if request.seq != self.latest_seq {
            debug!(
                path = %request.key.path,
                seq = request.seq,
                latest = self.latest_seq,
                "discarding superseded listing"
            );
            return false;
        }
        self.in_flight = None;
        let path = request.key.path.as_str();
        self.content = match result {
            Ok(entries) => {
                let entries = self.cache.store(request.key.clone(), entries);
                PaneContent::from_listing(path, entries)
            }
            Err(error) => {
                warn!(path, error = %error, "listing failed");
                PaneContent::Failed {
                    path: path.to_string(),
                    error,
                }
            }
        };
        true
    }

    /// Change the presentation mode. Never fetches; content is unchanged.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        self.sort_view.set_view_mode(mode)
    }

    /// Change the sort and re-resolve `current` under it.
    pub fn set_sort(
        &mut self,
        current: Option<&str>,
        column: SortColumn,
        direction: SortDirection,
    ) -> Option<ListingRequest> {
        self.sort_view.set_sort(column, direction);
        current.and_then(|path| self.show(path, column, direction))
    }

    /// Re-resolve `path` under the active sort.
    pub fn show_current_sort(&mut self, path: &str) -> Option<ListingRequest> {
        let (column, direction) = (self.sort_view.column(), self.sort_view.direction());
        self.show(path, column, direction)
    }

    /// Drop every cached sort variant of `path`.
    pub fn invalidate(&mut self, path: &str) -> usize {
        self.cache.invalidate(path)
    }

    /// Drop cached listings of `path` and everything beneath it.
    pub fn invalidate_within(&mut self, path: &str) -> usize {
        self.cache.invalidate_within(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::model::EntryKind;

    fn entry(path: &str) -> FileEntry {
        FileEntry {
            name: path.rsplit('/').next().unwrap_or(path).into(),
            path: path.into(),
            kind: EntryKind::File,
            size: Some(10),
            modified_at: Some(1_700_000_000),
            thumbnail_ref: None,
        }
    }

    fn pane() -> ListingPane {
        ListingPane::new(SortViewState::default())
    }

    const NAME: SortColumn = SortColumn::Name;
    const ASC: SortDirection = SortDirection::Ascending;

    #[test]
    fn miss_then_hit_issues_one_request() {
        let mut pane = pane();
        let req = pane.show("/docs", NAME, ASC).expect("first show fetches");
        assert!(matches!(pane.content(), PaneContent::Loading { path } if path == "/docs"));
        assert!(pane.finish(&req, Ok(vec![entry("/docs/a")])));

        assert!(pane.show("/docs", NAME, ASC).is_none());
        let first = pane.content().entries().to_vec();
        assert!(pane.show("/docs", NAME, ASC).is_none());
        assert_eq!(pane.content().entries(), first.as_slice());
    }

    #[test]
    fn different_sort_is_a_miss() {
        let mut pane = pane();
        let req = pane.show("/docs", NAME, ASC).unwrap();
        pane.finish(&req, Ok(vec![entry("/docs/a")]));
        assert!(pane.show("/docs", NAME, SortDirection::Descending).is_some());
        assert!(pane.show("/docs", SortColumn::Size, ASC).is_some());
    }

    #[test]
    fn later_request_wins_when_earlier_arrives_last() {
        let mut pane = pane();
        let first = pane.show("/docs", NAME, ASC).unwrap();
        let second = pane.show("/pics", NAME, ASC).unwrap();

        assert!(pane.finish(&second, Ok(vec![entry("/pics/cat.png")])));
        assert!(!pane.finish(&first, Ok(vec![entry("/docs/a")])));

        assert_eq!(pane.content().path(), Some("/pics"));
        assert_eq!(pane.content().entries()[0].path, "/pics/cat.png");
        // The superseded result is not cached either
        assert!(pane.cache().get(&first.key).is_none());
    }

    #[test]
    fn cache_hit_supersedes_outstanding_request() {
        let mut pane = pane();
        let docs = pane.show("/docs", NAME, ASC).unwrap();
        pane.finish(&docs, Ok(vec![entry("/docs/a")]));

        let pics = pane.show("/pics", NAME, ASC).unwrap();
        assert!(pane.show("/docs", NAME, ASC).is_none());
        assert!(pane.in_flight().is_none());
        assert!(!pane.finish(&pics, Ok(vec![entry("/pics/b")])));
        assert_eq!(pane.content().path(), Some("/docs"));
    }

    #[test]
    fn empty_listing_is_empty_marker_not_error() {
        let mut pane = pane();
        let req = pane.show("/empty", NAME, ASC).unwrap();
        pane.finish(&req, Ok(vec![]));
        assert!(matches!(pane.content(), PaneContent::Empty { path } if path == "/empty"));
    }

    #[test]
    fn failure_is_scoped_to_pane_and_not_cached() {
        let mut pane = pane();
        let req = pane.show("/docs", NAME, ASC).unwrap();
        pane.finish(&req, Err(BrowserError::Transport("timeout".into())));
        assert!(matches!(pane.content(), PaneContent::Failed { path, .. } if path == "/docs"));
        assert!(pane.show("/docs", NAME, ASC).is_some());
    }

    #[test]
    fn view_mode_change_never_fetches() {
        let mut pane = pane();
        let req = pane.show("/docs", NAME, ASC).unwrap();
        pane.finish(&req, Ok(vec![entry("/docs/a")]));
        assert!(pane.set_view_mode(ViewMode::Grid));
        assert!(pane.in_flight().is_none());
        assert_eq!(pane.view_mode(), ViewMode::Grid);
        assert_eq!(pane.content().entries().len(), 1);
    }

    #[test]
    fn set_sort_refetches_even_when_only_direction_flips() {
        let mut pane = pane();
        let req = pane.show("/docs", NAME, ASC).unwrap();
        pane.finish(&req, Ok(vec![entry("/docs/a")]));
        let flipped = pane.set_sort(Some("/docs"), NAME, SortDirection::Descending);
        assert!(flipped.is_some());
        assert_eq!(pane.sort_view().direction(), SortDirection::Descending);
    }

    #[test]
    fn set_sort_without_current_path_only_updates_state() {
        let mut pane = pane();
        assert!(pane.set_sort(None, SortColumn::Size, ASC).is_none());
        assert_eq!(pane.sort_view().column(), SortColumn::Size);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let mut pane = pane();
        let req = pane.show("/docs", NAME, ASC).unwrap();
        pane.finish(&req, Ok(vec![entry("/docs/a")]));
        assert!(pane.show("/docs", NAME, ASC).is_none());
        assert_eq!(pane.invalidate("/docs"), 1);
        assert!(pane.show("/docs", NAME, ASC).is_some());
    }

    #[test]
    fn subscribers_hear_sort_changes() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut pane = pane();
        pane.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        pane.set_sort(None, SortColumn::Date, ASC);
        pane.set_view_mode(ViewMode::Compact);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
