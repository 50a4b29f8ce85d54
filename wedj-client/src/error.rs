//! Error types for wedj-client
//!
//! Two layers:
//! - [`BackendError`]: what a single backend call can fail with. Polling
//!   treats every variant as "not ready yet".
//! - [`ClientError`]: what the coordinator and playlist flow surface to the
//!   front end. Each variant has a short inline message for the user.

use thiserror::Error;

/// Failure of one render backend call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Connection, timeout, or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("Backend returned status {0}")]
    Status(u16),

    /// Success status but unexpected content type or missing fields
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => BackendError::Status(status.as_u16()),
            None if e.is_decode() => BackendError::Malformed(e.to_string()),
            None => BackendError::Network(e.to_string()),
        }
    }
}

/// Client error surfaced to the front end
#[derive(Debug, Error)]
pub enum ClientError {
    /// The search or playlist request failed; no job was created
    #[error("Submission failed: {0}")]
    Submission(String),

    /// The backend accepted the request but the reply was unusable
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Mandatory asset never became available
    #[error("Asset not ready after {attempts} attempts")]
    AssetTimeout { attempts: u32 },

    /// Playlist key did not match the shared secret
    #[error("Playlist access denied")]
    AccessDenied,

    /// Empty query, empty playlist, unknown song id
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// wedj-common error (configuration, catalog loading)
    #[error("Common error: {0}")]
    Common(#[from] wedj_common::Error),
}

impl ClientError {
    /// Short message for display next to the search control
    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::Submission(_) | ClientError::MalformedResponse(_) => {
                "Couldn't start the transition. Please try again."
            }
            ClientError::AssetTimeout { .. } => {
                "Still processing. Try again in a moment."
            }
            ClientError::AccessDenied => "That key doesn't unlock playlists.",
            ClientError::InvalidInput(_) => "Enter a song title and artist.",
            ClientError::Common(_) => "Something went wrong.",
        }
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Submission(_)
                | ClientError::MalformedResponse(_)
                | ClientError::AssetTimeout { .. }
        )
    }
}

impl From<BackendError> for ClientError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Malformed(msg) => ClientError::MalformedResponse(msg),
            other => ClientError::Submission(other.to_string()),
        }
    }
}

/// Convenience Result type using ClientError
pub type ClientResult<T> = std::result::Result<T, ClientError>;
