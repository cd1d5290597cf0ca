//! Conversation window: the message sequence sent to the generation service.

use ilmquest_core::Turn;

/// Projects caller history onto a bounded message sequence.
pub struct HistoryWindow {
    /// Maximum number of prior turns to forward.
    pub max_turns: usize,
    /// Fully rendered system prompt.
    pub system_prompt: String,
}

impl HistoryWindow {
    /// Create a window keeping at most `max_turns` prior turns.
    pub fn new(max_turns: usize, system_prompt: impl Into<String>) -> Self {
        Self {
            max_turns,
            system_prompt: system_prompt.into(),
        }
    }

    /// Build `[system, ..last max_turns of history, user(question)]`.
    ///
    /// History entries are copied in their original order and never
    /// inspected or filtered by content.
    pub fn build(&self, history: &[Turn], question: &str) -> Vec<Turn> {
        let start = history.len().saturating_sub(self.max_turns);
        let recent = &history[start..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(Turn::system(self.system_prompt.clone()));
        messages.extend_from_slice(recent);
        messages.push(Turn::user(question));
        messages
    }
}
