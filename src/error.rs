// Error handling module
// Classifies vendor responses and local failures

use thiserror::Error;

/// Errors returned by every client operation
#[derive(Error, Debug)]
pub enum PaylocityError {
    /// 429 from any endpoint, token endpoints included
    #[error("{status} - {reason}")]
    TooManyRequests { status: u16, reason: String },

    /// 400 with the server's per-field messages joined into `message`
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// Any other non-2xx response
    #[error("{status} - {reason}")]
    Http { status: u16, reason: String },

    /// A 2xx body that could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Token endpoint answered but gave no usable token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Payload encryption failed
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Network or protocol failure before a response was read
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PaylocityError {
    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            PaylocityError::TooManyRequests { status, .. }
            | PaylocityError::Validation { status, .. }
            | PaylocityError::Http { status, .. } => Some(*status),
            PaylocityError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for 429 responses; callers own any backoff
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PaylocityError::TooManyRequests { .. })
    }
}

impl From<serde_json::Error> for PaylocityError {
    fn from(err: serde_json::Error) -> Self {
        PaylocityError::Decode(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, PaylocityError>;
