use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use remote_file_browser::browser::tree::{Chevron, FlatNode, NodeState};

/// Folder tree widget drawn with box-drawing connectors.
pub struct TreeWidget<'a> {
    items: &'a [FlatNode],
    selected: usize,
    scroll: usize,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(items: &'a [FlatNode], selected: usize, scroll: usize) -> Self {
        Self {
            items,
            selected,
            scroll,
            focused: true,
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

    /// Indentation for `items[index]`: a continuation bar for every ancestor
    /// that still has siblings below, then this node's own connector.
    fn build_prefix(items: &[FlatNode], index: usize) -> String {
        let item = &items[index];
        let mut prefix = String::new();

        for level in 0..item.depth {
            // Nearest preceding node at `level` is this item's ancestor.
            let ancestor_is_last = items[..index]
                .iter()
                .rev()
                .take_while(|n| n.depth >= level)
                .find(|n| n.depth == level)
                .is_some_and(|n| n.is_last_sibling);
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }

        prefix.push_str(if item.is_last_sibling { "└─" } else { "├─" });
        prefix
    }

    fn chevron(item: &FlatNode) -> &'static str {
        match (&item.state, item.chevron) {
            (NodeState::Loading, _) => "◌ ",
            (_, Chevron::Collapsed) => "▸ ",
            (_, Chevron::Expanded) => "▾ ",
            (_, Chevron::None) => "  ",
        }
    }

    fn style(&self, item: &FlatNode, is_selected: bool) -> Style {
        let base = match item.state {
            NodeState::Failed(_) => Style::default().fg(Color::Red),
            NodeState::Loading => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::ITALIC),
            _ => Style::default().fg(Color::Blue),
        };
        let base = if item.is_active {
            base.fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            base
        };
        if is_selected && self.focused {
            base.bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else if is_selected {
            base.add_modifier(Modifier::UNDERLINED)
        } else {
            base
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let visible_height = inner_area.height as usize;
        if self.items.is_empty() || visible_height == 0 {
            return;
        }

        let visible = self
            .items
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(visible_height);

        for (row, (idx, item)) in visible.enumerate() {
            let y = inner_area.y + row as u16;
            let prefix = Self::build_prefix(self.items, idx);
            let suffix = match &item.state {
                NodeState::Failed(_) => " ⚠",
                _ => "",
            };
            let text = format!("{}{}{}{}", prefix, Self::chevron(item), item.name, suffix);
            let line = Line::from(Span::styled(text, self.style(item, idx == self.selected)));
            buf.set_line(inner_area.x, y, &line, inner_area.width);
        }
    }
}
