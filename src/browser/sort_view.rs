//! Current sort column, sort direction and presentation mode.
//!
//! One instance is owned by the listing pane and handed out by reference;
//! nothing reads it through a global. Every mutator notifies subscribers
//! synchronously, before returning.

use super::model::{SortColumn, SortDirection, ViewMode};

/// What changed in a [`SortViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortViewChange {
    Sort {
        column: SortColumn,
        direction: SortDirection,
    },
    ViewMode(ViewMode),
}

/// Handle returned by [`SortViewState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SortViewChange) + Send>;

pub struct SortViewState {
    column: SortColumn,
    direction: SortDirection,
    view_mode: ViewMode,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for SortViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortViewState")
            .field("column", &self.column)
            .field("direction", &self.direction)
            .field("view_mode", &self.view_mode)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for SortViewState {
    fn default() -> Self {
        Self::new(SortColumn::Name, SortDirection::Ascending, ViewMode::List)
    }
}

impl SortViewState {
    pub fn new(column: SortColumn, direction: SortDirection, view_mode: ViewMode) -> Self {
        Self {
            column,
            direction,
            view_mode,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn column(&self) -> SortColumn {
        self.column
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Set the sort. Always notifies, even when the value is unchanged, so a
    /// repeated sort request still re-resolves the listing.
    pub fn set_sort(&mut self, column: SortColumn, direction: SortDirection) {
        self.column = column;
        self.direction = direction;
        self.notify(SortViewChange::Sort { column, direction });
    }

    /// Set the presentation mode. Notifies only on change.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        if self.view_mode == mode {
            return false;
        }
        self.view_mode = mode;
        self.notify(SortViewChange::ViewMode(mode));
        true
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SortViewChange) + Send + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        before != self.listeners.len()
    }

    fn notify(&mut self, change: SortViewChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}
