//! quill-ai: Streaming chat-completions client
//!
//! This crate owns one outbound request lifecycle: it opens the connection,
//! decodes the event stream, and emits text deltas until a terminal event.

pub mod client;
pub mod error;
pub mod sse;
pub mod stream;
pub mod types;

pub use client::ChatClient;
pub use error::{Error, Result};
pub use stream::{StreamEvent, StreamEventStream};
pub use types::{Message, Role};
