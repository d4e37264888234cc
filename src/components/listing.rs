use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use remote_file_browser::browser::listing::PaneContent;
use remote_file_browser::browser::model::{FileEntry, ViewMode};

/// Width of one cell in grid mode, including the gap.
pub const GRID_CELL_WIDTH: u16 = 20;

/// Listing pane widget: entries of the current folder in the active view mode.
pub struct ListingWidget<'a> {
    content: &'a PaneContent,
    view_mode: ViewMode,
    selected: usize,
    scroll: usize,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> ListingWidget<'a> {
    pub fn new(content: &'a PaneContent, view_mode: ViewMode, selected: usize, scroll: usize) -> Self {
        Self {
            content,
            view_mode,
            selected,
            scroll,
            focused: false,
            block: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    /// Number of grid columns that fit in `width`.
    pub fn grid_columns(width: u16) -> usize {
        (width / GRID_CELL_WIDTH).max(1) as usize
    }

    fn entry_style(&self, entry: &FileEntry, is_selected: bool) -> Style {
        let base = if entry.is_folder() {
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        match (is_selected, self.focused) {
            (true, true) => base.bg(Color::DarkGray),
            (true, false) => base.add_modifier(Modifier::UNDERLINED),
            _ => base,
        }
    }

    fn render_message(text: &str, style: Style, area: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(text.to_string(), style));
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(1));
    }

    fn render_list(&self, entries: &[FileEntry], area: Rect, buf: &mut Buffer) {
        let date_width = 16;
        let size_width = 10;
        let name_width = (area.width as usize).saturating_sub(date_width + size_width + 2);

        for (row, (idx, entry)) in entries
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(area.height as usize)
            .enumerate()
        {
            let size = match entry.size {
                Some(bytes) if !entry.is_folder() => format_size(bytes),
                _ => "—".to_string(),
            };
            let date = entry.modified_at.map(format_date).unwrap_or_default();
            let name = truncate(&format!("{}{}", icon(entry), entry.name), name_width);
            let text = format!(
                "{:<name_width$} {:>size_width$} {:<date_width$}",
                name, size, date
            );
            let line = Line::from(Span::styled(text, self.entry_style(entry, idx == self.selected)));
            buf.set_line(area.x, area.y + row as u16, &line, area.width);
        }
    }

    fn render_compact(&self, entries: &[FileEntry], area: Rect, buf: &mut Buffer) {
        for (row, (idx, entry)) in entries
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(area.height as usize)
            .enumerate()
        {
            let text = format!("{}{}", icon(entry), entry.name);
            let line = Line::from(Span::styled(text, self.entry_style(entry, idx == self.selected)));
            buf.set_line(area.x, area.y + row as u16, &line, area.width);
        }
    }

    /// Grid mode: `scroll` counts rows of cells. Entries with a thumbnail are
    /// marked since the terminal cannot show the image itself.
    fn render_grid(&self, entries: &[FileEntry], area: Rect, buf: &mut Buffer) {
        let columns = Self::grid_columns(area.width);
        let cell_text_width = (GRID_CELL_WIDTH - 2) as usize;

        for (row, chunk) in entries
            .chunks(columns)
            .enumerate()
            .skip(self.scroll)
            .take(area.height as usize)
        {
            let y = area.y + (row - self.scroll) as u16;
            for (col, entry) in chunk.iter().enumerate() {
                let idx = row * columns + col;
                let marker = if entry.thumbnail_ref.is_some() { "▣ " } else { icon(entry) };
                let text = truncate(&format!("{}{}", marker, entry.name), cell_text_width);
                let x = area.x + col as u16 * GRID_CELL_WIDTH;
                let width = GRID_CELL_WIDTH.min(area.x + area.width - x);
                let span = Span::styled(
                    format!("{:<cell_text_width$}", text),
                    self.entry_style(entry, idx == self.selected),
                );
                buf.set_span(x, y, &span, width);
            }
        }
    }
}

impl<'a> Widget for ListingWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let dim = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC);
        match self.content {
            PaneContent::Idle => Self::render_message("Select a folder", dim, inner, buf),
            PaneContent::Loading { .. } => Self::render_message("Loading…", dim, inner, buf),
            PaneContent::Empty { .. } => {
                Self::render_message("This folder is empty", dim, inner, buf)
            }
            PaneContent::Failed { error, .. } => Self::render_message(
                &format!("⚠ {}", error.inline_message()),
                Style::default().fg(Color::Red),
                inner,
                buf,
            ),
            PaneContent::Entries { entries, .. } => match self.view_mode {
                ViewMode::List => self.render_list(entries, inner, buf),
                ViewMode::Compact => self.render_compact(entries, inner, buf),
                ViewMode::Grid => self.render_grid(entries, inner, buf),
            },
        }
    }
}

fn icon(entry: &FileEntry) -> &'static str {
    if entry.is_folder() {
        "▸ "
    } else {
        "  "
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Local `YYYY-MM-DD HH:MM` for a Unix timestamp in seconds.
pub fn format_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
