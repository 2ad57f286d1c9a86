//! Error types for quill-chat

use thiserror::Error;

/// Result type alias using quill-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when a submission is rejected locally.
///
/// None of these involve the network: a rejected submission appends no
/// message and issues no request.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Submitted text was empty or whitespace-only
    #[error("Message is empty")]
    EmptyInput,

    /// No API credentials are configured
    #[error("No API key configured")]
    MissingCredentials,

    /// A stream is already active; one turn at a time
    #[error("A response is already streaming")]
    StreamActive,
}
