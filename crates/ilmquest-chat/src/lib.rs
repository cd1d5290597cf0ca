//! Question answering pipeline for Ilmquest.
//!
//! Windows the conversation history, calls the text-generation service, and
//! splits the generated text into an answer and a list of follow-up questions.

pub mod error;
pub mod history;
pub mod llm;
pub mod prompt;
pub mod segment;
pub mod service;

pub use error::ChatError;
pub use history::HistoryWindow;
pub use llm::{ChatCompletionsClient, TextGenerator};
pub use prompt::render_system_prompt;
pub use segment::{ParseOutcome, ResponseSegmenter, Segmentation, Tier};
pub use service::ChatService;
