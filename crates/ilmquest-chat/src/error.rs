//! Error types for the question answering pipeline.

/// Errors from the chat pipeline.
///
/// Segmentation of generated text never fails, so every variant here comes
/// from input validation or from the generation service.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("question is required")]
    EmptyQuestion,
    #[error("question exceeds maximum length of {0} characters")]
    QuestionTooLong(usize),
    #[error("generation service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ChatError {
    /// Whether the caller caused this error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ChatError::EmptyQuestion | ChatError::QuestionTooLong(_))
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::Decode(err.to_string())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}
