//! Failure taxonomy for calls against the chat backend.
//!
//! Two classes matter to the UI: transport failures (the backend could not be
//! reached, answered with a non-success status, or sent something that is not the
//! expected JSON) and application failures (the backend answered with an
//! `{"error": ...}` payload). Send-message shows an apology for both; every other
//! path only logs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Could not reach the chat backend: {0}")]
    Transport(String),

    #[error("Chat backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from the chat backend: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Chat backend reported an error: {0}")]
    Backend(String),
}

impl ApiError {
    /// True for `{"error": ...}` payloads, false for everything transport-shaped.
    pub fn is_application(&self) -> bool {
        matches!(self, ApiError::Backend(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
