//! Value types shared by the browser core: entries, sort parameters, view modes.

/// Kind of listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

/// One row of a folder listing. Produced fresh on every fetch, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    /// Size in bytes. Always `None` for folders.
    pub size: Option<u64>,
    /// Unix seconds.
    pub modified_at: Option<i64>,
    pub thumbnail_ref: Option<String>,
}

impl FileEntry {
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// Column the listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Name,
    Size,
    Date,
}

impl SortColumn {
    /// Parse from a config string; unknown values fall back to `Name`.
    pub fn from_str(s: &str) -> Self {
        match s {
            "size" => SortColumn::Size,
            "date" | "modified" | "mtime" => SortColumn::Date,
            _ => SortColumn::Name,
        }
    }

    /// Value of the `sortBy` request parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Size => "size",
            SortColumn::Date => "date",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::Size => "Size",
            SortColumn::Date => "Date",
        }
    }

    /// Cycle to the next sort column.
    pub fn next(&self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Size,
            SortColumn::Size => SortColumn::Date,
            SortColumn::Date => SortColumn::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_str(s: &str) -> Self {
        match s {
            "desc" | "descending" => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    /// Value of the `sortOrder` request parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Presentation of the listing pane. Does not affect entry content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    List,
    Compact,
}

impl ViewMode {
    pub fn from_str(s: &str) -> Self {
        match s {
            "grid" => ViewMode::Grid,
            "compact" => ViewMode::Compact,
            _ => ViewMode::List,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Grid => "Grid",
            ViewMode::List => "List",
            ViewMode::Compact => "Compact",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Compact,
            ViewMode::Compact => ViewMode::Grid,
        }
    }
}

/// Root of the remote tree.
pub const ROOT_PATH: &str = "/";

/// Parent of a slash-separated service path. The root has no parent.
///
/// `/docs/reports` → `/docs`, `/docs` → `/`, `/` → `None`.
pub fn parent_path(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) => Some(ROOT_PATH.to_string()),
        Some(idx) => Some(trimmed[..idx].to_string()),
        None => Some(ROOT_PATH.to_string()),
    }
}

/// Join a folder path and a child name.
pub fn join_path(parent: &str, name: &str) -> String {
    let base = parent.trim_end_matches('/');
    format!("{}/{}", base, name)
}

/// Last segment of a path, used as a display label.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None if trimmed.is_empty() => ROOT_PATH,
        None => trimmed,
    }
}

/// Whether `path` equals `ancestor` or lies beneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    let ancestor = ancestor.trim_end_matches('/');
    if ancestor.is_empty() {
        return true;
    }
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Replace the `from` prefix of `path` with `to`. Returns `None` if `path` is not within `from`.
pub fn rebase_path(path: &str, from: &str, to: &str) -> Option<String> {
    if !is_within(path, from) {
        return None;
    }
    let rest = &path[from.trim_end_matches('/').len()..];
    Some(format!("{}{}", to.trim_end_matches('/'), rest))
}
