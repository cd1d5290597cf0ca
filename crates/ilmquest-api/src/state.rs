//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use ilmquest_chat::ChatService;
use ilmquest_core::IlmquestConfig;

/// Shared application state.
///
/// Everything is read-only after start-up, so no locking is needed.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<IlmquestConfig>,
    /// Question answering pipeline.
    pub chat: Arc<ChatService>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: IlmquestConfig, chat: ChatService) -> Self {
        Self {
            config: Arc::new(config),
            chat: Arc::new(chat),
            start_time: Instant::now(),
        }
    }
}
