//! Model selector popup

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Widget},
};

/// Maximum width for the popup
const MAX_POPUP_WIDTH: u16 = 70;

/// One selectable entry
#[derive(Debug, Clone)]
pub struct SelectorItem {
    /// Display name
    pub label: String,
    /// Secondary text (model identifier)
    pub detail: Option<String>,
    /// Whether this entry is the active one
    pub is_current: bool,
}

/// Visibility and cursor state for a selector popup
#[derive(Debug, Default)]
pub struct SelectorState {
    pub visible: bool,
    pub selected: usize,
}

impl SelectorState {
    /// Open the popup
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Close the popup
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Move the cursor up
    pub fn up(&mut self, _count: usize) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move the cursor down
    pub fn down(&mut self, count: usize) {
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }
}

/// Centered popup list for picking a model
pub struct Selector<'a> {
    title: &'a str,
    items: Vec<SelectorItem>,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> Selector<'a> {
    /// Create a new selector
    pub fn new(title: &'a str, items: Vec<SelectorItem>, theme: &'a Theme) -> Self {
        Self {
            title,
            items,
            selected: 0,
            theme,
        }
    }

    /// Set the highlighted entry
    pub fn with_selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    fn popup_size(&self) -> (u16, u16) {
        let mut max_width = self.title.chars().count() + 4;
        for item in &self.items {
            let mut len = item.label.chars().count() + 6;
            if let Some(detail) = &item.detail {
                len += detail.chars().count() + 3;
            }
            max_width = max_width.max(len);
        }
        let width = (max_width as u16).clamp(24, MAX_POPUP_WIDTH);
        let height = (self.items.len() as u16 + 2).min(16);
        (width, height)
    }

    /// Render the popup centered in `area`
    pub fn render_centered(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.popup_size();
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let popup_area = Rect::new(x, y, width.min(area.width), height.min(area.height));

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.accent_style());

        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let prefix = if item.is_current { "● " } else { "  " };
                let style = if i == self.selected {
                    Style::default()
                        .bg(self.theme.accent)
                        .fg(self.theme.bg)
                        .add_modifier(Modifier::BOLD)
                } else if item.is_current {
                    self.theme.accent_style()
                } else {
                    self.theme.base_style()
                };

                let mut spans = vec![Span::styled(format!("{}{}", prefix, item.label), style)];
                if let Some(detail) = &item.detail {
                    let detail_style = if i == self.selected {
                        style
                    } else {
                        self.theme.dim_style()
                    };
                    spans.push(Span::styled(format!("  {}", detail), detail_style));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(Some(self.selected));

        ratatui::widgets::StatefulWidget::render(list, popup_area, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut state = SelectorState::default();
        state.up(4);
        assert_eq!(state.selected, 0);
        state.down(4);
        state.down(4);
        state.down(4);
        state.down(4);
        assert_eq!(state.selected, 3);
    }

    #[test]
    fn test_down_on_empty_list() {
        let mut state = SelectorState::default();
        state.down(0);
        assert_eq!(state.selected, 0);
    }
}
