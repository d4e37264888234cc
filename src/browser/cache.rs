use std::collections::HashMap;
use std::sync::Arc;

use super::model::{is_within, FileEntry, SortColumn, SortDirection};

/// Cache key: a listing is only valid for the sort it was fetched under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub path: String,
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl ListingKey {
    pub fn new(path: &str, column: SortColumn, direction: SortDirection) -> Self {
        Self {
            path: path.to_string(),
            column,
            direction,
        }
    }
}

/// Most recently fetched entries per (path, column, direction).
///
/// Entries are shared with the renderer through `Arc` and replaced wholesale,
/// never edited in place.
#[derive(Debug, Default)]
pub struct ListingCache {
    entries: HashMap<ListingKey, Arc<Vec<FileEntry>>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ListingKey) -> Option<Arc<Vec<FileEntry>>> {
        self.entries.get(key).cloned()
    }

    /// Store a listing, replacing any previous one for the same key.
    pub fn store(&mut self, key: ListingKey, entries: Vec<FileEntry>) -> Arc<Vec<FileEntry>> {
        let entries = Arc::new(entries);
        self.entries.insert(key, Arc::clone(&entries));
        entries
    }

    /// Drop every sort variant cached for `path`. Returns how many were removed.
    pub fn invalidate(&mut self, path: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.path != path);
        before - self.entries.len()
    }

    /// Drop cached listings for `path` and every folder beneath it.
    pub fn invalidate_within(&mut self, path: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !is_within(&key.path, path));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
