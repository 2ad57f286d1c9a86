//! Error types for quill-ai

use thiserror::Error;

/// Result type alias using quill-ai Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the completions endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before any stream was established
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Invalid or missing API key
    #[error("Invalid or missing API key")]
    InvalidApiKey,
}

impl Error {
    /// Create an API error from a status code and body text
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }
}
