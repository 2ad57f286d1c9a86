//! Conversation controller: one streaming turn at a time.

use std::sync::Arc;

use futures::StreamExt;
use quill_ai::{Message, StreamEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    conversation::Conversation,
    error::{Error, Result},
    session::StreamSession,
    surface::PresentationSurface,
    transport::StreamTransport,
};

/// Default bound on the trailing context window
pub const DEFAULT_CONTEXT_LIMIT: usize = 10;

/// Font scale bounds (matches the presentation controls' range)
pub const FONT_SCALE_MIN: u16 = 10;
pub const FONT_SCALE_MAX: u16 = 24;
const FONT_SCALE_STEP: u16 = 2;

/// Controller configuration
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Model identifier sent with each request
    pub model: String,
    /// Maximum number of trailing messages sent per request
    pub context_limit: usize,
    /// Initial font scale
    pub font_scale: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            model: "openrouter/free".to_string(),
            context_limit: DEFAULT_CONTEXT_LIMIT,
            font_scale: 14,
        }
    }
}

/// Drives the conversation: accepts user turns, runs the streaming worker,
/// and applies its events to the transcript and the presentation surface.
///
/// The network worker only forwards events; every mutation of the
/// transcript, the session, and the surface happens on the loop that calls
/// [`ChatController::handle_event`]. At most one stream is active at a
/// time, held as the `session` field; each turn gets a fresh event channel
/// so a stale worker can never interleave with a newer session.
pub struct ChatController<S: PresentationSurface> {
    config: ControllerConfig,
    conversation: Conversation,
    transport: Option<Arc<dyn StreamTransport>>,
    surface: S,
    session: Option<StreamSession>,
    event_rx: Option<mpsc::UnboundedReceiver<StreamEvent>>,
    cancel: CancellationToken,
}

impl<S: PresentationSurface> ChatController<S> {
    /// Create a new controller.
    ///
    /// `transport` is `None` when no credentials are configured; the
    /// controller then rejects every submission with `MissingCredentials`.
    pub fn new(
        config: ControllerConfig,
        transport: Option<Arc<dyn StreamTransport>>,
        surface: S,
    ) -> Self {
        Self {
            config,
            conversation: Conversation::default(),
            transport,
            surface,
            session: None,
            event_rx: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Get the presentation surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Get the presentation surface mutably
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Get the conversation state
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Get all transcript messages
    pub fn messages(&self) -> &[Message] {
        &self.conversation.messages
    }

    /// Replace the transcript (used when seeding a conversation)
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.conversation.messages = messages;
    }

    /// Whether a stream is currently active
    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    /// Whether credentials are configured
    pub fn has_credentials(&self) -> bool {
        self.transport.is_some()
    }

    /// The model identifier used for the next request
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Switch the model for subsequent requests
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = model.into();
    }

    /// Current font scale
    pub fn font_scale(&self) -> u16 {
        self.config.font_scale
    }

    /// Set the font scale, clamped to the supported range
    pub fn set_font_scale(&mut self, size: u16) {
        self.config.font_scale = size.clamp(FONT_SCALE_MIN, FONT_SCALE_MAX);
        self.surface.set_font_scale(self.config.font_scale);
    }

    /// Step the font scale up
    pub fn increase_font(&mut self) {
        self.set_font_scale(self.config.font_scale + FONT_SCALE_STEP);
    }

    /// Step the font scale down
    pub fn decrease_font(&mut self) {
        self.set_font_scale(self.config.font_scale.saturating_sub(FONT_SCALE_STEP));
    }

    /// Submit a user turn.
    ///
    /// Appends the user message, shows it on the surface, and spawns the
    /// streaming worker. Rejected without side effects if a stream is
    /// active, credentials are missing, or the text is blank.
    pub fn submit(&mut self, text: &str) -> Result<()> {
        if self.session.is_some() {
            return Err(Error::StreamActive);
        }
        let Some(transport) = self.transport.clone() else {
            return Err(Error::MissingCredentials);
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }

        self.conversation.last_error = None;
        self.conversation.push(Message::user(text));
        self.surface.render_user_message(text);
        self.surface.begin_assistant_message();
        self.session = Some(StreamSession::new());

        let window = self
            .conversation
            .context_window(self.config.context_limit)
            .to_vec();
        let model = self.config.model.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        self.event_rx = Some(rx);
        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let mut events = transport.send(&model, window).await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    next = events.next() => match next {
                        Some(event) => {
                            let terminal = event.is_terminal();
                            if tx.send(event).is_err() || terminal {
                                break;
                            }
                        }
                        None => {
                            let _ = tx.send(StreamEvent::failed("Stream ended unexpectedly"));
                            break;
                        }
                    },
                }
            }
        });

        Ok(())
    }

    /// Wait for the next event from the active stream.
    ///
    /// Pends forever while no stream is active, so it can sit in a select
    /// loop alongside input events.
    pub async fn next_event(&mut self) -> StreamEvent {
        match self.event_rx.as_mut() {
            Some(rx) => match rx.recv().await {
                Some(event) => event,
                None => futures::future::pending().await,
            },
            None => futures::future::pending().await,
        }
    }

    /// Apply a stream event. Must be called from the update loop; this is
    /// the only place conversation state changes during a turn.
    pub fn handle_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Token { text } => {
                if let Some(session) = self.session.as_mut() {
                    session.push_delta(&text);
                    self.surface.append_assistant_delta(&text);
                }
            }
            StreamEvent::Completed => {
                if let Some(session) = self.session.take() {
                    self.conversation.push(session.into_message());
                }
                self.event_rx = None;
            }
            StreamEvent::Failed { reason } => {
                if self.session.take().is_some() {
                    tracing::warn!("stream failed: {}", reason);
                    // The failure text takes the place of the assistant
                    // response; the failed turn leaves no transcript entry.
                    self.surface.append_assistant_delta(&reason);
                }
                self.conversation.last_error = Some(reason);
                self.event_rx = None;
            }
        }
    }

    /// Cancel the active stream, discarding the pending response.
    pub fn abort(&mut self) {
        if self.session.take().is_some() {
            self.cancel.cancel();
            self.event_rx = None;
            self.surface.append_assistant_delta("(cancelled)");
        }
    }

    /// Reset the conversation, cancelling any active stream first.
    pub fn clear(&mut self) {
        self.abort();
        self.conversation.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quill_ai::{Role, StreamEventStream};
    use std::sync::Mutex;

    /// Transport that replays a scripted event sequence and records what it
    /// was asked to send.
    struct MockTransport {
        events: Mutex<Vec<StreamEvent>>,
        requests: Mutex<Vec<(String, Vec<Message>)>>,
    }

    impl MockTransport {
        fn new(events: Vec<StreamEvent>) -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(events),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<(String, Vec<Message>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StreamTransport for MockTransport {
        async fn send(&self, model: &str, messages: Vec<Message>) -> StreamEventStream {
            self.requests
                .lock()
                .unwrap()
                .push((model.to_string(), messages));
            let events: Vec<StreamEvent> = self.events.lock().unwrap().drain(..).collect();
            Box::pin(futures::stream::iter(events))
        }
    }

    /// Transport whose stream never produces anything, keeping a turn open.
    struct StalledTransport;

    #[async_trait]
    impl StreamTransport for StalledTransport {
        async fn send(&self, _model: &str, _messages: Vec<Message>) -> StreamEventStream {
            Box::pin(futures::stream::pending())
        }
    }

    /// Surface that records every call it receives.
    #[derive(Default)]
    struct MockSurface {
        calls: Vec<String>,
    }

    impl PresentationSurface for MockSurface {
        fn render_user_message(&mut self, text: &str) {
            self.calls.push(format!("user:{}", text));
        }
        fn begin_assistant_message(&mut self) {
            self.calls.push("begin".to_string());
        }
        fn append_assistant_delta(&mut self, delta: &str) {
            self.calls.push(format!("delta:{}", delta));
        }
        fn set_font_scale(&mut self, size: u16) {
            self.calls.push(format!("font:{}", size));
        }
    }

    fn controller(
        transport: Option<Arc<dyn StreamTransport>>,
    ) -> ChatController<MockSurface> {
        ChatController::new(ControllerConfig::default(), transport, MockSurface::default())
    }

    /// Drive the active turn to its terminal event.
    async fn run_turn(c: &mut ChatController<MockSurface>) {
        while c.is_streaming() {
            let event = c.next_event().await;
            c.handle_event(event);
        }
    }

    #[tokio::test]
    async fn test_successful_turn_appends_one_assistant_message() {
        let transport = MockTransport::new(vec![
            StreamEvent::token("Hel"),
            StreamEvent::token("lo"),
            StreamEvent::Completed,
        ]);
        let mut c = controller(Some(transport));

        c.submit("hi there").unwrap();
        run_turn(&mut c).await;

        let messages = c.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Hello");
        assert!(c.conversation().last_error.is_none());
    }

    #[tokio::test]
    async fn test_surface_sees_calls_in_order() {
        let transport = MockTransport::new(vec![
            StreamEvent::token("a"),
            StreamEvent::token("b"),
            StreamEvent::Completed,
        ]);
        let mut c = controller(Some(transport));

        c.submit("question").unwrap();
        run_turn(&mut c).await;

        assert_eq!(
            c.surface().calls,
            vec!["user:question", "begin", "delta:a", "delta:b"]
        );
    }

    #[tokio::test]
    async fn test_failed_turn_appends_nothing() {
        let transport = MockTransport::new(vec![
            StreamEvent::token("Hi"),
            StreamEvent::failed("Connection error: reset"),
        ]);
        let mut c = controller(Some(transport));

        c.submit("hello").unwrap();
        run_turn(&mut c).await;

        // Only the user message survives; the failure is surfaced inline.
        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.messages()[0].role, Role::User);
        assert_eq!(
            c.conversation().last_error.as_deref(),
            Some("Connection error: reset")
        );
        assert!(c
            .surface()
            .calls
            .contains(&"delta:Connection error: reset".to_string()));
    }

    #[tokio::test]
    async fn test_empty_submission_is_rejected() {
        let transport = MockTransport::new(vec![StreamEvent::Completed]);
        let mut c = controller(Some(transport.clone()));

        assert_eq!(c.submit(""), Err(Error::EmptyInput));
        assert_eq!(c.submit("   \n\t "), Err(Error::EmptyInput));

        assert!(c.messages().is_empty());
        assert!(c.surface().calls.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_rejected() {
        let mut c = controller(None);
        assert_eq!(c.submit("hello"), Err(Error::MissingCredentials));
        assert!(c.messages().is_empty());
    }

    #[tokio::test]
    async fn test_second_submission_rejected_while_streaming() {
        let mut c = controller(Some(Arc::new(StalledTransport)));

        c.submit("first").unwrap();
        assert!(c.is_streaming());
        assert_eq!(c.submit("second"), Err(Error::StreamActive));

        // Only the first user message was appended.
        assert_eq!(c.messages().len(), 1);
        assert_eq!(c.messages()[0].content, "first");
    }

    #[tokio::test]
    async fn test_abort_discards_session() {
        let mut c = controller(Some(Arc::new(StalledTransport)));

        c.submit("going nowhere").unwrap();
        c.abort();

        assert!(!c.is_streaming());
        assert_eq!(c.messages().len(), 1);
        // A new turn is accepted immediately after.
        assert_eq!(c.submit("again"), Ok(()));
    }

    #[tokio::test]
    async fn test_context_window_bounds_request() {
        let transport = MockTransport::new(vec![StreamEvent::Completed]);
        let mut c = controller(Some(transport.clone()));

        let mut seed = Vec::new();
        for i in 0..15 {
            seed.push(Message::user(format!("old {}", i)));
        }
        c.set_messages(seed);

        c.submit("newest").unwrap();
        run_turn(&mut c).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let (_, sent) = &requests[0];
        assert_eq!(sent.len(), DEFAULT_CONTEXT_LIMIT);
        assert_eq!(sent.last().unwrap().content, "newest");
        assert_eq!(sent[0].content, "old 6");
    }

    #[tokio::test]
    async fn test_submission_trims_whitespace() {
        let transport = MockTransport::new(vec![StreamEvent::Completed]);
        let mut c = controller(Some(transport));

        c.submit("  hello  ").unwrap();
        assert_eq!(c.messages()[0].content, "hello");
    }

    #[tokio::test]
    async fn test_model_switch_applies_to_next_request() {
        let transport = MockTransport::new(vec![StreamEvent::Completed]);
        let mut c = controller(Some(transport.clone()));

        c.set_model("stepfun/step-3.5-flash:free");
        c.submit("hi").unwrap();
        run_turn(&mut c).await;

        assert_eq!(transport.requests()[0].0, "stepfun/step-3.5-flash:free");
    }

    #[tokio::test]
    async fn test_font_scale_clamped() {
        let mut c = controller(None);

        c.set_font_scale(99);
        assert_eq!(c.font_scale(), FONT_SCALE_MAX);

        c.set_font_scale(1);
        assert_eq!(c.font_scale(), FONT_SCALE_MIN);
        c.decrease_font();
        assert_eq!(c.font_scale(), FONT_SCALE_MIN);

        c.set_font_scale(14);
        c.increase_font();
        assert_eq!(c.font_scale(), 16);

        assert_eq!(
            c.surface().calls,
            vec!["font:24", "font:10", "font:10", "font:14", "font:16"]
        );
    }

    #[tokio::test]
    async fn test_clear_resets_transcript() {
        let transport = MockTransport::new(vec![
            StreamEvent::token("x"),
            StreamEvent::Completed,
        ]);
        let mut c = controller(Some(transport));

        c.submit("hi").unwrap();
        run_turn(&mut c).await;
        assert_eq!(c.messages().len(), 2);

        c.clear();
        assert!(c.messages().is_empty());
        assert!(!c.is_streaming());
    }
}
