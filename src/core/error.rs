//! Custom error types for foundry-chat
//!
//! Every failure a user action can hit ends up as a `ChatError`, whose
//! `Display` output is what the client shows as the error message.

use thiserror::Error;

/// Main error type for foundry-chat operations
#[derive(Error, Debug)]
pub enum ChatError {
    /// Sign-in, sign-out or token acquisition failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Silent token acquisition needs the user to interact with the provider.
    /// Consumed by the interactive fallback; callers normally never see it.
    #[error("Interaction required: {0}")]
    InteractionRequired(String),

    /// Backend responded with a non-success status
    #[error("{path} failed ({status})")]
    Api { path: String, status: u16 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for foundry-chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create an interaction-required signal
    pub fn interaction_required(msg: impl Into<String>) -> Self {
        Self::InteractionRequired(msg.into())
    }

    /// Create an API error for a failed backend call
    pub fn api(path: impl Into<String>, status: u16) -> Self {
        Self::Api {
            path: path.into(),
            status,
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether silent acquisition failed only because the user must interact
    pub fn is_interaction_required(&self) -> bool {
        matches!(self, Self::InteractionRequired(_))
    }
}
