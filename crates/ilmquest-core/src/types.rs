//! Shared data model: conversation turns and the structured chat reply.

use serde::{Deserialize, Serialize};

// =============================================================================
// Conversation turns
// =============================================================================

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a conversation.
///
/// Turns are never edited once created; a conversation only grows by
/// appending new turns at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// =============================================================================
// Chat request / reply
// =============================================================================

/// Inbound chat request body.
///
/// `question` is optional at the wire level so that a missing field can be
/// reported as a client error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub history: Vec<Turn>,
}

/// Static attribution attached to every reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub content: String,
}

/// Structured reply returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentedResponse {
    /// Cleaned answer text.
    pub text: String,
    /// Placeholder citations, not derived from the generated text.
    pub citations: Vec<Citation>,
    /// Follow-up questions extracted from the generated text. May be empty.
    pub suggested_followups: Vec<String>,
    /// Caller history followed by the current user and assistant turns.
    pub history: Vec<Turn>,
}
