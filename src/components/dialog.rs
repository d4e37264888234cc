use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use remote_file_browser::browser::model::base_name;

use crate::app::{AppMode, DialogKind, DialogState};

/// Dialog widget that renders a centered modal overlay.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    dialog_state: &'a DialogState,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, dialog_state: &'a DialogState) -> Self {
        Self { mode, dialog_state }
    }

    /// Calculate a centered rectangle within the given area.
    pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width.min(area.width), height.min(area.height))
    }
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let AppMode::Dialog(kind) = self.mode else {
            return;
        };

        match kind {
            DialogKind::CreateFolder { parent } => {
                let title = format!("New folder in {}", parent);
                render_input_dialog(&title, self.dialog_state, area, buf);
            }
            DialogKind::RenameFolder { path } => {
                let title = format!("Rename {}", base_name(path));
                render_input_dialog(&title, self.dialog_state, area, buf);
            }
            DialogKind::DeleteConfirm { path, is_empty } => {
                render_confirm_dialog(path, *is_empty, area, buf);
            }
            DialogKind::Error { message } => {
                render_error_dialog(message, area, buf);
            }
        }
    }
}

fn hint_line(hint: &str) -> Line<'_> {
    Line::from(Span::styled(
        hint,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
    ))
}

fn dialog_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .padding(Padding::horizontal(1))
}

fn render_input_dialog(title: &str, state: &DialogState, area: Rect, buf: &mut Buffer) {
    let width = 50.min(area.width.saturating_sub(4));
    let rect = DialogWidget::centered_rect(width, 6, area);
    Clear.render(rect, buf);

    let block = dialog_block(title, Color::Cyan);
    let inner = block.inner(rect);
    block.render(rect, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    // Input line with a block cursor
    let input = &state.input;
    let cursor = state.cursor_position.min(input.len());
    let (before, rest) = input.split_at(cursor);
    let mut rest_chars = rest.chars();
    let cursor_char = rest_chars.next().map(String::from).unwrap_or_else(|| " ".into());
    let after: String = rest_chars.collect();

    // Keep the cursor in view by dropping characters from the left
    let max_width = inner.width as usize;
    let before_chars = before.chars().count();
    let before_display: String = if before_chars + 1 > max_width {
        before.chars().skip(before_chars + 1 - max_width).collect()
    } else {
        before.to_string()
    };

    let input_style = Style::default().fg(Color::White);
    let cursor_style = Style::default()
        .bg(Color::White)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(before_display, input_style),
        Span::styled(cursor_char, cursor_style),
        Span::styled(after, input_style),
    ]);
    buf.set_line(inner.x, inner.y, &line, inner.width);

    if let Some(error) = &state.error {
        let error_line = Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red)));
        if inner.height > 2 {
            buf.set_line(inner.x, inner.y + 1, &error_line, inner.width);
        }
    }

    if inner.height > 1 {
        let hint = hint_line("[Enter] Confirm  [Esc] Cancel");
        buf.set_line(inner.x, inner.y + inner.height - 1, &hint, inner.width);
    }
}

fn render_confirm_dialog(path: &str, is_empty: Option<bool>, area: Rect, buf: &mut Buffer) {
    let width = (path.chars().count() as u16 + 10)
        .max(44)
        .min(area.width.saturating_sub(4));
    let rect = DialogWidget::centered_rect(width, 7, area);
    Clear.render(rect, buf);

    let block = dialog_block("Delete Folder", Color::Red);
    let inner = block.inner(rect);
    block.render(rect, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let header = Line::from(Span::styled(
        format!("Delete {}?", path),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    buf.set_line(inner.x, inner.y, &header, inner.width);

    let (note, color) = match is_empty {
        None => ("Checking contents…", Color::DarkGray),
        Some(true) => ("The folder is empty.", Color::Green),
        Some(false) => ("The folder is NOT empty; its contents will be deleted.", Color::Red),
    };
    if inner.height > 2 {
        let line = Line::from(Span::styled(note, Style::default().fg(color)));
        buf.set_line(inner.x, inner.y + 2, &line, inner.width);
    }

    let hint = hint_line("[y] Yes  [n/Esc] Cancel");
    buf.set_line(inner.x, inner.y + inner.height - 1, &hint, inner.width);
}

fn render_error_dialog(message: &str, area: Rect, buf: &mut Buffer) {
    let width = (message.chars().count() as u16 + 6)
        .max(30)
        .min(area.width.saturating_sub(4));
    let rect = DialogWidget::centered_rect(width, 5, area);
    Clear.render(rect, buf);

    let block = dialog_block("Error", Color::Red);
    let inner = block.inner(rect);
    block.render(rect, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let msg_line = Line::from(Span::styled(message, Style::default().fg(Color::Red)));
    buf.set_line(inner.x, inner.y + inner.height / 2, &msg_line, inner.width);

    if inner.height > 1 {
        let hint = hint_line("[Enter/Esc] Dismiss");
        buf.set_line(inner.x, inner.y + inner.height - 1, &hint, inner.width);
    }
}
