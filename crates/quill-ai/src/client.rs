//! HTTP client for the streaming chat-completions endpoint

use async_stream::stream;
use futures::StreamExt;
use tokio_stream::Stream;

use crate::{
    error::{Error, Result},
    sse::SseDecoder,
    stream::{StreamEvent, StreamEventStream},
    types::{CompletionRequest, Message},
};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default cap on generated tokens per response
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Client for one chat-completions endpoint
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    /// Create a new client with an API key, using the default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the endpoint base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create from the `OPENROUTER_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY").map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Open a streaming completion request.
    ///
    /// A non-success status is returned as `Error::Api` with the raw status
    /// and body text; no retry is attempted. On success the returned stream
    /// yields `Token` events in network order and ends with exactly one
    /// terminal event.
    pub async fn stream(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<StreamEventStream> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model,
            messages,
            stream: true,
            max_tokens,
        };

        tracing::info!(model, count = messages.len(), "starting completion stream");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "http://localhost")
            .header("X-Title", "quill")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), body));
        }

        Ok(Box::pin(decode_stream(response.bytes_stream())))
    }
}

/// Fold a response byte stream through the decoder into completion events.
///
/// Transport failures mid-stream become a terminal `Failed` event; a body
/// that ends cleanly without the `[DONE]` sentinel completes normally.
pub fn decode_stream<S, B, E>(byte_stream: S) -> impl Stream<Item = StreamEvent>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    stream! {
        let mut byte_stream = byte_stream;
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = byte_stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for event in decoder.feed(bytes.as_ref()) {
                        let terminal = event.is_terminal();
                        yield event;
                        if terminal {
                            // [DONE] seen: stop reading the body.
                            return;
                        }
                    }
                }
                Err(err) => {
                    yield StreamEvent::failed(format!("Connection error: {}", err));
                    return;
                }
            }
        }

        if let Some(event) = decoder.finish() {
            yield event;
        }
    }
}
