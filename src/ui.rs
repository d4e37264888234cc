use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
    Frame,
};

use remote_file_browser::browser::model::ViewMode;

use crate::app::{App, AppMode, Focus};
use crate::components::dialog::DialogWidget;
use crate::components::help::HelpOverlay;
use crate::components::listing::ListingWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;

/// Scroll offset that keeps row `cursor` inside a window of `height` rows.
pub fn keep_visible(cursor: usize, scroll: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    if cursor < scroll {
        cursor
    } else if cursor >= scroll + height {
        cursor + 1 - height
    } else {
        scroll
    }
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let [main, status] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .areas(frame.area());
    let [tree_area, listing_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .areas(main);

    render_tree(app, frame, tree_area);
    render_listing(app, frame, listing_area);
    render_status(app, frame, status);

    match app.mode {
        AppMode::Dialog(_) => {
            frame.render_widget(DialogWidget::new(&app.mode, &app.dialog_state), frame.area())
        }
        AppMode::Help => frame.render_widget(HelpOverlay, frame.area()),
        AppMode::Normal => {}
    }
}

fn render_tree(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Tree;
    let block = panel_block(" Folders ".to_string(), focused);
    let tree = app.browser.tree();

    if tree.is_empty() {
        let message = if let Some(error) = tree.roots_error() {
            Span::styled(format!(" ⚠ {}", error.inline_message()), Style::default().fg(Color::Red))
        } else if tree.roots_loading() {
            Span::styled(" Loading folders…", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(" No folders", Style::default().fg(Color::DarkGray))
        };
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Line::from(message), inner);
        return;
    }

    let items = app.flat_tree();
    let visible_height = area.height.saturating_sub(2) as usize;
    app.tree_scroll = keep_visible(app.tree_cursor, app.tree_scroll, visible_height);

    let widget = TreeWidget::new(&items, app.tree_cursor, app.tree_scroll)
        .focused(focused)
        .block(block);
    frame.render_widget(widget, area);
}

fn render_listing(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Listing;
    let screen = app.browser.sink();
    let title = match screen.listing.path() {
        Some(path) => format!(" {} ", path),
        None => " Listing ".to_string(),
    };

    let visible_height = area.height.saturating_sub(2) as usize;
    let view_mode = screen.view_mode;
    let cursor_row = match view_mode {
        ViewMode::Grid => {
            app.listing_cursor / ListingWidget::grid_columns(area.width.saturating_sub(2))
        }
        ViewMode::List | ViewMode::Compact => app.listing_cursor,
    };
    app.listing_scroll = keep_visible(cursor_row, app.listing_scroll, visible_height);

    let screen = app.browser.sink();
    let widget = ListingWidget::new(&screen.listing, view_mode, app.listing_cursor, app.listing_scroll)
        .focused(focused)
        .block(panel_block(title, focused));
    frame.render_widget(widget, area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let path = app.browser.current_path().unwrap_or("—");
    let sort = app.browser.sort_view();
    let sort_info = format!(
        "{} {} · {} ",
        sort.column().label(),
        sort.direction().arrow(),
        sort.view_mode().label()
    );

    let mut widget = StatusBarWidget::new(path, &sort_info);
    if let Some((msg, _)) = &app.status_message {
        widget = widget.status_message(msg);
    }
    frame.render_widget(widget, area);
}
