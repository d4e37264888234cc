use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Status bar: current folder, sort/view state and key hints, or a transient message.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    sort_info: &'a str,
    status_message: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, sort_info: &'a str) -> Self {
        Self {
            path_str,
            sort_info,
            status_message: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str) -> Self {
        self.status_message = Some(msg);
        self
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Green)
            };
            let line = Line::from(Span::styled(format!("{:<width$}", msg), style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let key_hints = " n:new  r:ren  d:del  ?:help ";
        let remaining = width.saturating_sub(key_hints.chars().count());
        let info_len = self.sort_info.chars().count();
        let path_budget = remaining.saturating_sub(info_len + 1);

        // Keep the tail of long paths: the folder name matters most
        let path_len = self.path_str.chars().count();
        let path_display: String = if path_len > path_budget && path_budget > 3 {
            let tail: String = self
                .path_str
                .chars()
                .skip(path_len - (path_budget - 3))
                .collect();
            format!("...{}", tail)
        } else {
            self.path_str.chars().take(path_budget).collect()
        };
        let gap = remaining.saturating_sub(path_display.chars().count() + info_len);

        let spans = vec![
            Span::styled(path_display, Style::default().fg(Color::White)),
            Span::raw(" ".repeat(gap)),
            Span::styled(self.sort_info, Style::default().fg(Color::Cyan)),
            Span::styled(
                key_hints,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            ),
        ];
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
