use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the API client and re-raised by store actions.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("rejected by server: {message}")]
    Invalid { message: String },

    #[error("server error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn api(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// The message the server attached to the failure, when it sent one.
    /// Transport and decode failures carry no server message; the store
    /// substitutes a per-action fallback for those.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::NotFound { message } | Self::Invalid { message } | Self::Api { message, .. }
                if !message.is_empty() =>
            {
                Some(message)
            }
            _ => None,
        }
    }
}
