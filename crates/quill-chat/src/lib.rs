//! quill-chat: Conversation controller
//!
//! This crate owns the message history, enforces the bounded context
//! window, drives one streaming request at a time, and relays stream
//! events to a presentation surface.

pub mod controller;
pub mod conversation;
pub mod error;
pub mod session;
pub mod surface;
pub mod transport;

pub use controller::{ChatController, ControllerConfig};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use session::StreamSession;
pub use surface::PresentationSurface;
pub use transport::{EndpointTransport, StreamTransport};
