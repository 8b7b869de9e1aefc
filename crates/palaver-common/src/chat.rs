//! Caller-visible conversation types.
//!
//! The conversation model is deliberately small: an append-only, chronological
//! sequence of [`ChatMessage`] entries, at most one [`PendingMessage`] waiting
//! to be resolved into an agent reply, and a [`ConversationId`] the remote
//! agent assigns on the first successful exchange.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Arbitrary JSON context submitted alongside a user message.
pub type Context = HashMap<String, serde_json::Value>;

/// Identity of a conversation session on the remote agent.
///
/// Unset until the first successful gateway response assigns one; from then on
/// it is immutable for the lifetime of the conversation and reused verbatim on
/// every subsequent gateway call.
///
/// Gateways are inconsistent about the wire representation (some issue
/// numeric ids, some opaque strings), so deserialization accepts both and
/// normalizes to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Creates an id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(i64),
            Str(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Num(n) => Self(n.to_string()),
            Repr::Str(s) => Self(s),
        })
    }
}

/// The author of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Input from the end user.
    User,
    /// A terminal reply from the remote agent.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single entry in the conversation history.
///
/// History is append-only and chronological; entries are never edited,
/// removed, or reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the entry.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a user entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant entry.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A user submission not yet resolved into an agent reply.
///
/// At most one pending message exists at a time; it is consumed when the
/// orchestrator begins the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    /// The submitted message text.
    pub text: String,
    /// Arbitrary JSON context forwarded to the agent alongside the text.
    pub context: Context,
}

impl PendingMessage {
    /// Creates a pending message.
    pub fn new(text: impl Into<String>, context: Context) -> Self {
        Self {
            text: text.into(),
            context,
        }
    }
}
