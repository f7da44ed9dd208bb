//! Shared types used across foundry-chat modules
//!
//! Accounts and tokens from the identity provider, agents from the backend
//! directory, and transcript messages.

use serde::{Deserialize, Serialize};

/// Placeholder shown when the backend replies without an answer
pub const NO_ANSWER_PLACEHOLDER: &str = "(no answer)";

/// Signed-in identity issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Sign-in name, usually the user's email
    pub username: String,
    /// Stable identifier (`<object id>.<tenant id>`)
    pub home_account_id: String,
    /// Display name, when the provider sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Bearer token with its expiry
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The bearer credential itself
    pub secret: String,
    /// Expiry as unix seconds
    pub expires_at: u64,
    /// Scopes the token was granted for
    pub scopes: Vec<String>,
}

impl AccessToken {
    /// Whether the token is still usable `margin_secs` from `now`
    pub fn is_valid_at(&self, now: u64, margin_secs: u64) -> bool {
        self.expires_at > now.saturating_add(margin_secs)
    }
}

/// Scopes and account for a token acquisition
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub scopes: Vec<String>,
    pub account: Account,
}

impl TokenRequest {
    pub fn new(scopes: Vec<String>, account: Account) -> Self {
        Self { scopes, account }
    }
}

/// A conversational agent configured on the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Backend identifier
    #[serde(rename = "agent_id")]
    pub id: String,
    /// Human-readable name
    pub display_name: String,
}

impl Agent {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Who wrote a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    /// Create a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// `GET /agents` response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentsResponse {
    /// Missing or `null` both mean no agents
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<Agent>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `POST /chat` request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub agent_id: &'a str,
    pub message: &'a str,
}

/// `POST /chat` response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    /// Usually a string; other JSON values are shown as JSON text
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
}

impl ChatResponse {
    /// The answer text, or the placeholder when none came back
    pub fn answer_or_placeholder(self) -> String {
        match self.answer {
            None | Some(serde_json::Value::Null) => NO_ANSWER_PLACEHOLDER.to_string(),
            Some(serde_json::Value::String(answer)) if answer.is_empty() => {
                NO_ANSWER_PLACEHOLDER.to_string()
            }
            Some(serde_json::Value::String(answer)) => answer,
            Some(other) => other.to_string(),
        }
    }
}
