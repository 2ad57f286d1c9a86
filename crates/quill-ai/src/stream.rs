//! Streaming event types

use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Events emitted while streaming a completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// An incremental text fragment of the assistant response
    Token { text: String },
    /// The response finished successfully
    Completed,
    /// The stream failed; no more tokens will arrive
    Failed { reason: String },
}

impl StreamEvent {
    /// Check if this is a terminal event (Completed or Failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed | StreamEvent::Failed { .. })
    }

    /// Shorthand for a token event
    pub fn token(text: impl Into<String>) -> Self {
        StreamEvent::Token { text: text.into() }
    }

    /// Shorthand for a failure event
    pub fn failed(reason: impl Into<String>) -> Self {
        StreamEvent::Failed {
            reason: reason.into(),
        }
    }
}

/// A stream of completion events
pub type StreamEventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;
