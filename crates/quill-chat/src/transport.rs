//! Transport abstraction between the controller and the network client.

use async_stream::stream;
use async_trait::async_trait;
use quill_ai::{ChatClient, Message, StreamEvent, StreamEventStream};

/// Transport for one streaming completion request.
///
/// `send` never fails at the call site: pre-stream errors (bad status,
/// connect failure) are delivered as a terminal `Failed` event inside the
/// returned stream, so callers see a single event algebra either way.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Issue one request and stream its events
    async fn send(&self, model: &str, messages: Vec<Message>) -> StreamEventStream;
}

/// Transport backed by a live chat-completions endpoint
pub struct EndpointTransport {
    client: ChatClient,
    max_tokens: u32,
}

impl EndpointTransport {
    /// Create a transport over the given client
    pub fn new(client: ChatClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }
}

#[async_trait]
impl StreamTransport for EndpointTransport {
    async fn send(&self, model: &str, messages: Vec<Message>) -> StreamEventStream {
        match self.client.stream(model, &messages, self.max_tokens).await {
            Ok(events) => events,
            Err(err) => {
                let reason = err.to_string();
                Box::pin(stream! {
                    yield StreamEvent::Failed { reason };
                })
            }
        }
    }
}
