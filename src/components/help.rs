use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

/// A category of keybindings: name and (key, description) pairs.
struct KeyCategory {
    name: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

const TREE_KEYS: &[(&str, &str)] = &[
    ("j / ↓", "Move down"),
    ("k / ↑", "Move up"),
    ("g / G", "Jump to first / last"),
    ("l / →", "Expand folder"),
    ("h / ←", "Collapse folder or go to parent node"),
    ("Enter", "Open folder and toggle it"),
    ("Backspace", "Open parent folder"),
];

const LISTING_KEYS: &[(&str, &str)] = &[
    ("j / k", "Move selection"),
    ("Enter / l", "Open selected folder"),
    ("Backspace / h", "Open parent folder"),
    ("v", "Cycle view (list → compact → grid)"),
    ("s", "Cycle sort column (name → size → date)"),
    ("o", "Flip sort direction"),
];

const FOLDER_OPS_KEYS: &[(&str, &str)] = &[
    ("n", "New folder"),
    ("r", "Rename folder"),
    ("d / Delete", "Delete folder"),
    ("F5 / R", "Reload tree and listing"),
];

const GENERAL_KEYS: &[(&str, &str)] = &[
    ("Tab", "Switch between tree and listing"),
    ("?", "Toggle this help"),
    ("q / Ctrl+C", "Quit"),
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Folder Tree",
        entries: TREE_KEYS,
    },
    KeyCategory {
        name: "Listing",
        entries: LISTING_KEYS,
    },
    KeyCategory {
        name: "Folder Operations",
        entries: FOLDER_OPS_KEYS,
    },
    KeyCategory {
        name: "General",
        entries: GENERAL_KEYS,
    },
];

/// Help overlay widget showing all keybindings.
pub struct HelpOverlay;

impl HelpOverlay {
    fn build_content_lines() -> Vec<Line<'static>> {
        let accent = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::from(Span::styled(" Keybinding Reference ", accent)), Line::from("")];

        for category in CATEGORIES {
            lines.push(Line::from(vec![
                Span::styled(format!("── {} ", category.name), accent),
                Span::styled("─".repeat(30), Style::default().fg(Color::DarkGray)),
            ]));
            for (key, description) in category.entries {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {:<18}", key),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*description),
                ]));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(Color::DarkGray),
        )));
        lines
    }

    /// Total number of content lines.
    pub fn total_lines() -> usize {
        3 + CATEGORIES.iter().map(|c| c.entries.len() + 2).sum::<usize>()
    }
}

impl Widget for HelpOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (area.width as f32 * 0.70).min(70.0) as u16;
        let height = (area.height as f32 * 0.85).min(Self::total_lines() as f32 + 2.0) as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let overlay = Rect::new(x, y, width, height);

        Clear.render(overlay, buf);
        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(overlay);
        block.render(overlay, buf);

        for (i, line) in Self::build_content_lines()
            .iter()
            .take(inner.height as usize)
            .enumerate()
        {
            buf.set_line(inner.x + 1, inner.y + i as u16, line, inner.width.saturating_sub(2));
        }
    }
}
