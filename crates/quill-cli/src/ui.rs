//! Terminal UI for quill

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, MouseEventKind};
use futures::StreamExt;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use quill_chat::{ChatController, Error as ChatError, PresentationSurface};
use quill_tui::{
    Theme, Tui,
    input::{Action, key_to_action},
    widgets::{
        ChatMessage, InputBox, MessageList, Selector, SelectorItem, SelectorState,
        Spinner, message_list,
    },
};

use crate::models::ModelInfo;

const MISSING_KEY_NOTICE: &str = "No API key configured. Add api_key to the config file, \
set OPENROUTER_API_KEY, or create APIKEY.txt next to the binary. Sending is disabled until then.";

/// Widget state for the chat window; the controller's presentation surface.
pub struct TuiSurface {
    messages: Vec<ChatMessage>,
    input: InputBox,
    scroll: usize,
    status: String,
    theme: Theme,
    font_scale: u16,
    streaming: bool,
    spinner_start: Instant,
    model_selector: SelectorState,
    models: Vec<ModelInfo>,
    model_label: String,
}

impl TuiSurface {
    pub fn new(models: Vec<ModelInfo>, model_label: String, font_scale: u16) -> Self {
        Self {
            messages: vec![],
            input: InputBox::new().with_placeholder("Type your message..."),
            scroll: 0,
            status: "Ready".to_string(),
            theme: Theme::dark(),
            font_scale,
            streaming: false,
            spinner_start: Instant::now(),
            model_selector: SelectorState::default(),
            models,
            model_label,
        }
    }

    /// Show a local notice in the transcript
    pub fn system_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::system(content));
        self.scroll_to_bottom();
    }

    /// Mark the in-progress assistant message as done
    pub fn finish_stream(&mut self) {
        if let Some(last) = self.messages.last_mut() {
            if last.is_streaming {
                last.is_streaming = false;
            }
        }
        self.streaming = false;
        self.input.set_disabled(false);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn set_model_label(&mut self, label: impl Into<String>) {
        self.model_label = label.into();
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
        self.scroll = 0;
    }

    pub fn input_content(&self) -> &str {
        self.input.content()
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn handle_edit_action(&mut self, action: &Action, width: u16) {
        self.input.handle_action(action, width);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved against content height during render.
        self.scroll = usize::MAX;
    }

    pub fn selector_visible(&self) -> bool {
        self.model_selector.visible
    }

    /// Open the model selector with the active model highlighted
    pub fn open_model_selector(&mut self, current_id: &str) {
        self.model_selector.selected = self
            .models
            .iter()
            .position(|m| m.id == current_id)
            .unwrap_or(0);
        self.model_selector.show();
    }

    pub fn selector_up(&mut self) {
        self.model_selector.up(self.models.len());
    }

    pub fn selector_down(&mut self) {
        self.model_selector.down(self.models.len());
    }

    pub fn selector_hide(&mut self) {
        self.model_selector.hide();
    }

    /// Close the selector, returning the chosen model
    pub fn selector_choose(&mut self) -> Option<ModelInfo> {
        self.model_selector.hide();
        self.models.get(self.model_selector.selected).cloned()
    }

    /// Render the full chat window
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Layout: messages (flex), status bar (1), input (3)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(size);

        self.render_messages(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);

        if self.model_selector.visible {
            self.render_model_selector(frame, size);
        }
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" quill │ {} │ A:{} ", self.model_label, self.font_scale);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }

        if self.messages.is_empty() {
            self.render_welcome(frame, inner);
            return;
        }

        let content_height =
            message_list::transcript_height(&self.messages, inner.width as usize, self.font_scale);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let list = MessageList::new(&self.messages, &self.theme)
            .scroll(self.scroll)
            .font_scale(self.font_scale);
        frame.render_widget(list, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);

            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_welcome(&self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default().fg(Color::Cyan);
        let text_style = Style::default().fg(Color::White);
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "  ❝ ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "quill",
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" - streaming AI chat", Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("  Model: {}", self.model_label),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(Span::styled("  Keybindings", Style::default().fg(Color::Yellow))),
            Line::from(""),
            Line::from(vec![
                Span::styled("    Enter       ", key_style),
                Span::styled("Send message", text_style),
            ]),
            Line::from(vec![
                Span::styled("    Ctrl+K      ", key_style),
                Span::styled("Select model", text_style),
            ]),
            Line::from(vec![
                Span::styled("    Ctrl+- / +  ", key_style),
                Span::styled("Font size", text_style),
            ]),
            Line::from(vec![
                Span::styled("    Ctrl+L      ", key_style),
                Span::styled("Clear conversation", text_style),
            ]),
            Line::from(vec![
                Span::styled("    Esc/Ctrl+C  ", key_style),
                Span::styled("Abort response / quit", text_style),
            ]),
            Line::from(vec![
                Span::styled("    PgUp/PgDn   ", key_style),
                Span::styled("Scroll history", text_style),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Type a message to get started...",
                Style::default().fg(Color::DarkGray),
            )),
        ]);
        frame.render_widget(welcome, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.streaming {
            let spinner =
                Spinner::new(&self.status, &self.theme).with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left_content = format!("{} │ {}", self.model_label, self.status);
        let right_content = "Ctrl+K: model │ Ctrl+L: clear │ Ctrl+Q: quit";

        let left_width = left_content.chars().count();
        let right_width = right_content.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            let spacing = available - left_width - right_width;
            Line::from(vec![
                Span::styled(&left_content, self.theme.dim_style()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(right_content, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(&left_content, self.theme.dim_style()))
        };

        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_model_selector(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<SelectorItem> = self
            .models
            .iter()
            .map(|m| SelectorItem {
                label: m.name.clone(),
                detail: Some(m.id.clone()),
                is_current: m.name == self.model_label,
            })
            .collect();

        let selector = Selector::new("Select Model", items, &self.theme)
            .with_selected(self.model_selector.selected);
        selector.render_centered(area, frame.buffer_mut());
    }
}

impl PresentationSurface for TuiSurface {
    fn render_user_message(&mut self, text: &str) {
        self.messages.push(ChatMessage::user(text));
        self.scroll_to_bottom();
    }

    fn begin_assistant_message(&mut self) {
        self.messages.push(ChatMessage::assistant_streaming());
        self.streaming = true;
        self.spinner_start = Instant::now();
        self.status = "Streaming...".to_string();
        self.input.set_disabled(true);
        self.scroll_to_bottom();
    }

    fn append_assistant_delta(&mut self, delta: &str) {
        match self.messages.last_mut() {
            Some(last) if last.is_streaming => last.content.push_str(delta),
            _ => self.messages.push(ChatMessage::assistant(delta)),
        }
        self.scroll_to_bottom();
    }

    fn set_font_scale(&mut self, size: u16) {
        self.font_scale = size;
    }
}

/// Run the interactive chat UI.
///
/// This loop is the single place stream events touch the controller and
/// the surface; the network worker only feeds the channel behind
/// `next_event`.
pub async fn run_tui(controller: &mut ChatController<TuiSurface>) -> anyhow::Result<()> {
    let mut tui = Tui::enter()?;
    let mut events = EventStream::new();
    // 80ms tick keeps the spinner and thinking indicator animated.
    let mut tick = tokio::time::interval(Duration::from_millis(80));

    if !controller.has_credentials() {
        controller.surface_mut().system_message(MISSING_KEY_NOTICE);
        controller.surface_mut().set_status("No API key");
    }

    loop {
        tui.draw(|frame| controller.surface_mut().render(frame))?;
        let width = tui.width()?;

        tokio::select! {
            biased;

            event = controller.next_event() => {
                controller.handle_event(event);
                if !controller.is_streaming() {
                    let status = match controller.conversation().last_error {
                        Some(_) => "Request failed".to_string(),
                        None => "Ready".to_string(),
                    };
                    let surface = controller.surface_mut();
                    surface.finish_stream();
                    surface.set_status(status);
                }
            }

            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if !handle_key(controller, key_to_action(key), width) {
                            return Ok(());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        controller
                            .surface_mut()
                            .handle_edit_action(&Action::Paste(text), width);
                    }
                    Some(Ok(Event::Mouse(mouse))) => match mouse.kind {
                        MouseEventKind::ScrollUp => controller.surface_mut().scroll_up(3),
                        MouseEventKind::ScrollDown => controller.surface_mut().scroll_down(3),
                        _ => {}
                    },
                    Some(Ok(Event::Resize(_, _))) => {}
                    Some(Err(e)) => return Err(anyhow::anyhow!("Event error: {}", e)),
                    None => return Ok(()),
                    _ => {}
                }
            }

            _ = tick.tick() => {}
        }
    }
}

/// Handle one key action. Returns false to quit.
fn handle_key(controller: &mut ChatController<TuiSurface>, action: Action, width: u16) -> bool {
    // The model selector swallows input while open
    if controller.surface().selector_visible() {
        match action {
            Action::Up => controller.surface_mut().selector_up(),
            Action::Down => controller.surface_mut().selector_down(),
            Action::Submit => {
                if let Some(model) = controller.surface_mut().selector_choose() {
                    controller.set_model(&model.id);
                    let surface = controller.surface_mut();
                    surface.set_model_label(&model.name);
                    surface.system_message(format!("Switched to: {}", model.id));
                }
            }
            Action::Escape | Action::ModelSelect => controller.surface_mut().selector_hide(),
            _ => {}
        }
        return true;
    }

    match action {
        Action::Submit => {
            // The affordance is disabled while a response is streaming.
            if controller.is_streaming() {
                return true;
            }
            let content = controller.surface().input_content().to_string();
            match controller.submit(&content) {
                Ok(()) => controller.surface_mut().clear_input(),
                Err(ChatError::EmptyInput) => {}
                Err(ChatError::MissingCredentials) => {
                    controller.surface_mut().system_message(MISSING_KEY_NOTICE);
                }
                Err(ChatError::StreamActive) => {}
            }
            true
        }
        Action::Interrupt => {
            if controller.is_streaming() {
                abort_stream(controller);
                true
            } else {
                false
            }
        }
        Action::Escape => {
            if controller.is_streaming() {
                abort_stream(controller);
            }
            true
        }
        Action::Quit => false,
        Action::ClearChat => {
            controller.clear();
            let surface = controller.surface_mut();
            surface.clear_messages();
            surface.set_status("Cleared");
            true
        }
        Action::ModelSelect => {
            if !controller.is_streaming() {
                let current = controller.model().to_string();
                controller.surface_mut().open_model_selector(&current);
            }
            true
        }
        Action::FontIncrease => {
            controller.increase_font();
            true
        }
        Action::FontDecrease => {
            controller.decrease_font();
            true
        }
        Action::PageUp => {
            controller.surface_mut().scroll_up(10);
            true
        }
        Action::PageDown => {
            controller.surface_mut().scroll_down(10);
            true
        }
        other => {
            controller.surface_mut().handle_edit_action(&other, width);
            true
        }
    }
}

fn abort_stream(controller: &mut ChatController<TuiSurface>) {
    controller.abort();
    let surface = controller.surface_mut();
    surface.finish_stream();
    surface.set_status("Cancelled");
}
