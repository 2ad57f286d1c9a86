//! Message list widget for the chat transcript

use crate::theme::Theme;
use crate::widgets::markdown::render_markdown;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use textwrap;

/// The font scale at which content uses the full available width
const BASE_FONT_SCALE: u16 = 14;

/// Who a displayed message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    /// Local notices (key warnings, model switches); never sent anywhere
    System,
}

/// A single message in the chat view
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Whether this message is still receiving deltas
    pub is_streaming: bool,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            is_streaming: false,
        }
    }

    /// Create a completed assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            is_streaming: false,
        }
    }

    /// Create an assistant message that is still streaming
    pub fn assistant_streaming() -> Self {
        Self {
            role: ChatRole::Assistant,
            content: String::new(),
            is_streaming: true,
        }
    }

    /// Create a system notice
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
            is_streaming: false,
        }
    }
}

/// Effective content width for a font scale.
///
/// Terminals cannot change glyph size, so a larger scale narrows the wrap
/// width instead: the same zoom effect the original pixel surface gets
/// from a bigger font.
pub fn scaled_width(width: usize, font_scale: u16) -> usize {
    let scale = font_scale.max(1) as usize;
    (width * BASE_FONT_SCALE as usize / scale).max(20).min(width)
}

/// Widget for displaying the chat transcript
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
    font_scale: u16,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
            font_scale: BASE_FONT_SCALE,
        }
    }

    /// Set scroll offset
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Set the font scale
    pub fn font_scale(mut self, scale: u16) -> Self {
        self.font_scale = scale;
        self
    }

    fn render_message(&self, msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let (role_text, role_style, prefix) = match msg.role {
            ChatRole::User => ("You", self.theme.user_style(), "▶ "),
            ChatRole::Assistant => ("Assistant", self.theme.assistant_style(), "◀ "),
            ChatRole::System => ("System", self.theme.dim_style(), "● "),
        };

        let header = if msg.is_streaming {
            format!("{}{} ▌", prefix, role_text)
        } else {
            format!("{}{}", prefix, role_text)
        };
        lines.push(Line::from(Span::styled(header, role_style)));

        let content_width = scaled_width(width.saturating_sub(2), self.font_scale);

        match msg.role {
            ChatRole::Assistant => {
                if msg.content.is_empty() && msg.is_streaming {
                    // Animated indicator while the first token is pending
                    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
                    let frame_idx = (std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_millis()
                        / 80) as usize
                        % frames.len();
                    lines.push(Line::from(Span::styled(
                        format!("  {} thinking...", frames[frame_idx]),
                        self.theme.warning_style(),
                    )));
                } else {
                    for line in render_markdown(&msg.content, self.theme, content_width) {
                        let mut indented_spans = vec![Span::raw("  ")];
                        indented_spans.extend(
                            line.spans
                                .into_iter()
                                .map(|s| Span::styled(s.content.into_owned(), s.style)),
                        );
                        lines.push(Line::from(indented_spans));
                    }
                }
            }
            ChatRole::User | ChatRole::System => {
                let content_style: Style = match msg.role {
                    ChatRole::System => self.theme.dim_style(),
                    _ => self.theme.base_style(),
                };
                for line in textwrap::wrap(&msg.content, content_width) {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", line),
                        content_style,
                    )));
                }
            }
        }

        lines.push(Line::from(""));
        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::NONE);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for msg in self.messages {
            all_lines.extend(self.render_message(msg, width));
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(inner.height as usize)
            .collect();

        let paragraph = Paragraph::new(visible_lines).wrap(Wrap { trim: false });
        paragraph.render(inner, buf);
    }
}

/// Total rendered height of the transcript; must track `render_message`.
pub fn transcript_height(messages: &[ChatMessage], width: usize, font_scale: u16) -> usize {
    let theme = Theme::dark();
    let content_width = scaled_width(width.saturating_sub(2), font_scale);
    let mut total = 0;

    for msg in messages {
        // Role header
        total += 1;

        match msg.role {
            ChatRole::Assistant => {
                if msg.content.is_empty() && msg.is_streaming {
                    total += 1;
                } else {
                    total += render_markdown(&msg.content, &theme, content_width).len();
                }
            }
            ChatRole::User | ChatRole::System => {
                total += textwrap::wrap(&msg.content, content_width).len();
            }
        }

        // Separator
        total += 1;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_width_at_base_scale() {
        assert_eq!(scaled_width(80, 14), 80);
    }

    #[test]
    fn test_scaled_width_narrows_for_larger_fonts() {
        let wide = scaled_width(80, 14);
        let narrow = scaled_width(80, 24);
        assert!(narrow < wide, "{} should be < {}", narrow, wide);
    }

    #[test]
    fn test_scaled_width_never_exceeds_area() {
        // Smaller fonts cannot overflow the terminal.
        assert_eq!(scaled_width(80, 10), 80);
    }

    #[test]
    fn test_transcript_height_counts_all_messages() {
        let messages = vec![
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi there"),
        ];
        // Each message: header + one content line + separator.
        assert_eq!(transcript_height(&messages, 80, 14), 6);
    }

    #[test]
    fn test_pending_stream_renders_indicator_line() {
        let messages = vec![ChatMessage::assistant_streaming()];
        assert_eq!(transcript_height(&messages, 80, 14), 3);
    }
}
