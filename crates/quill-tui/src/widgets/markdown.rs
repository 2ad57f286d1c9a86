//! Markdown rendering for the terminal
//!
//! Converts the accumulated assistant text into styled lines on every
//! delta, so partially-streamed markdown renders as well as it can.

use crate::theme::Theme;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Convert markdown text to styled ratatui Lines
pub fn render_markdown<'a>(text: &str, theme: &Theme, width: usize) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::new();
    let mut current_line: Vec<Span<'a>> = Vec::new();
    let mut current_style = theme.base_style();
    let mut in_code_block = false;
    let mut code_block_content = String::new();
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut quote_depth: usize = 0;

    let parser = Parser::new(text);

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    flush(&mut lines, &mut current_line);
                    current_style = match level {
                        pulldown_cmark::HeadingLevel::H1 => theme
                            .accent_style()
                            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                        pulldown_cmark::HeadingLevel::H2 => {
                            theme.accent_style().add_modifier(Modifier::BOLD)
                        }
                        _ => theme.accent_style(),
                    };
                }
                Tag::Paragraph => {
                    flush(&mut lines, &mut current_line);
                    if quote_depth > 0 {
                        current_line.push(Span::styled(
                            "│ ".repeat(quote_depth),
                            theme.dim_style(),
                        ));
                    }
                }
                Tag::BlockQuote(_) => {
                    flush(&mut lines, &mut current_line);
                    quote_depth += 1;
                }
                Tag::CodeBlock(_) => {
                    in_code_block = true;
                    code_block_content.clear();
                    flush(&mut lines, &mut current_line);
                }
                Tag::List(start) => {
                    list_stack.push(start);
                }
                Tag::Item => {
                    flush(&mut lines, &mut current_line);
                    let indent = "  ".repeat(list_stack.len().saturating_sub(1));
                    let marker = match list_stack.last_mut() {
                        Some(Some(number)) => {
                            let marker = format!("{}{}. ", indent, number);
                            *number += 1;
                            marker
                        }
                        _ => format!("{}• ", indent),
                    };
                    current_line.push(Span::styled(marker, theme.dim_style()));
                }
                Tag::Emphasis => {
                    current_style = current_style.add_modifier(Modifier::ITALIC);
                }
                Tag::Strong => {
                    current_style = current_style.add_modifier(Modifier::BOLD);
                }
                Tag::Strikethrough => {
                    current_style = current_style.add_modifier(Modifier::CROSSED_OUT);
                }
                Tag::Link { .. } => {
                    current_style = Style::default().fg(theme.link);
                }
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Heading(_) => {
                    flush(&mut lines, &mut current_line);
                    current_style = theme.base_style();
                }
                TagEnd::Paragraph => {
                    flush(&mut lines, &mut current_line);
                    lines.push(Line::from(""));
                }
                TagEnd::BlockQuote(_) => {
                    flush(&mut lines, &mut current_line);
                    quote_depth = quote_depth.saturating_sub(1);
                    if quote_depth == 0 {
                        lines.push(Line::from(""));
                    }
                }
                TagEnd::CodeBlock => {
                    in_code_block = false;
                    let code_style = theme.code_style().add_modifier(Modifier::DIM);

                    for code_line in code_block_content.lines() {
                        let display_line = if code_line.len() > width.saturating_sub(4) {
                            format!("  {}…", &code_line[..width.saturating_sub(5)])
                        } else {
                            format!("  {}", code_line)
                        };
                        lines.push(Line::from(Span::styled(display_line, code_style)));
                    }
                    lines.push(Line::from(""));
                }
                TagEnd::List(_) => {
                    list_stack.pop();
                    if list_stack.is_empty() {
                        lines.push(Line::from(""));
                    }
                }
                TagEnd::Item => {
                    flush(&mut lines, &mut current_line);
                }
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                    current_style = theme.base_style();
                }
                TagEnd::Link => {
                    current_style = theme.base_style();
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_code_block {
                    code_block_content.push_str(&text);
                } else {
                    current_line.push(Span::styled(text.to_string(), current_style));
                }
            }
            Event::Code(code) => {
                let code_style = theme.code_style().add_modifier(Modifier::BOLD);
                current_line.push(Span::styled(format!("`{}`", code), code_style));
            }
            Event::SoftBreak => {
                current_line.push(Span::raw(" "));
            }
            Event::HardBreak => {
                flush(&mut lines, &mut current_line);
            }
            _ => {}
        }
    }

    // Flush remaining content (streaming text often ends mid-paragraph)
    if !current_line.is_empty() {
        lines.push(Line::from(current_line));
    }

    // Remove trailing empty lines
    while lines.last().is_some_and(|l| {
        l.spans.is_empty() || (l.spans.len() == 1 && l.spans[0].content.is_empty())
    }) {
        lines.pop();
    }

    lines
}

fn flush<'a>(lines: &mut Vec<Line<'a>>, current_line: &mut Vec<Span<'a>>) {
    if !current_line.is_empty() {
        lines.push(Line::from(std::mem::take(current_line)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_simple_text() {
        let theme = Theme::dark();
        let lines = render_markdown("Hello, world!", &theme, 80);
        assert_eq!(text_of(&lines), vec!["Hello, world!"]);
    }

    #[test]
    fn test_partial_stream_renders() {
        // Mid-stream content is frequently unterminated markdown.
        let theme = Theme::dark();
        let lines = render_markdown("Here is **bol", &theme, 80);
        assert!(!lines.is_empty());
    }

    #[test]
    fn test_code_block() {
        let theme = Theme::dark();
        let md = "```rust\nfn main() {}\n```";
        let lines = render_markdown(md, &theme, 80);
        assert!(text_of(&lines).iter().any(|l| l.contains("fn main()")));
    }

    #[test]
    fn test_ordered_list_numbering() {
        let theme = Theme::dark();
        let md = "1. first\n2. second\n3. third";
        let lines = render_markdown(md, &theme, 80);
        let texts = text_of(&lines);
        assert!(texts.iter().any(|l| l.starts_with("1. ")));
        assert!(texts.iter().any(|l| l.starts_with("3. ")));
    }

    #[test]
    fn test_blockquote_prefix() {
        let theme = Theme::dark();
        let lines = render_markdown("> quoted text", &theme, 80);
        assert!(text_of(&lines).iter().any(|l| l.starts_with("│ ")));
    }
}
