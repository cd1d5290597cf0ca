//! Chat service: the request pipeline from question to structured reply.
//!
//! validate -> window history -> generate -> segment -> assemble.

use std::sync::Arc;

use ilmquest_core::config::{HistoryConfig, ResponseConfig};
use ilmquest_core::{Citation, IlmquestConfig, SegmentedResponse, Turn};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ChatError;
use crate::history::HistoryWindow;
use crate::llm::TextGenerator;
use crate::prompt::render_system_prompt;
use crate::segment::ResponseSegmenter;

/// Answers questions by calling a [`TextGenerator`] and segmenting its output.
///
/// Holds no per-request state; one instance serves any number of concurrent
/// requests.
pub struct ChatService {
    window: HistoryWindow,
    segmenter: ResponseSegmenter,
    generator: Arc<dyn TextGenerator>,
    citations: Vec<Citation>,
    max_question_chars: usize,
}

impl ChatService {
    /// Create a service from the history and response settings.
    pub fn new(
        history: &HistoryConfig,
        response: &ResponseConfig,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let system_prompt = render_system_prompt(&history.system_prompt, &response.sentinel);
        Self {
            window: HistoryWindow::new(history.window_size, system_prompt),
            segmenter: ResponseSegmenter::new(
                response.sentinel.clone(),
                response.fallback_answer.clone(),
            ),
            generator,
            citations: response.citations.clone(),
            max_question_chars: response.max_question_chars,
        }
    }

    pub fn from_config(config: &IlmquestConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(&config.history, &config.response, generator)
    }

    /// Model identifier of the underlying generator.
    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub fn segmenter(&self) -> &ResponseSegmenter {
        &self.segmenter
    }

    /// Answer `question` in the context of `history`.
    ///
    /// The returned history is the caller's full history (not the window)
    /// followed by the current user turn and the assistant's answer.
    pub async fn answer(
        &self,
        question: &str,
        history: Vec<Turn>,
    ) -> Result<SegmentedResponse, ChatError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("chat", %request_id, model = %self.generator.model());

        async move {
            if question.trim().is_empty() {
                return Err(ChatError::EmptyQuestion);
            }
            if question.chars().count() > self.max_question_chars {
                return Err(ChatError::QuestionTooLong(self.max_question_chars));
            }

            let messages = self.window.build(&history, question);
            info!(
                history_len = history.len(),
                messages = messages.len(),
                "Forwarding question to generation service"
            );

            let raw = match self.generator.generate(&messages).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "Generation failed");
                    return Err(e);
                }
            };

            let segmentation = self.segmenter.segment(&raw);
            debug!(
                tier = %segmentation.tier,
                outcome = %segmentation.outcome,
                followups = segmentation.suggested_followups.len(),
                raw_len = raw.len(),
                "Response segmented"
            );

            let mut history = history;
            history.reserve(2);
            history.push(Turn::user(question));
            history.push(Turn::assistant(segmentation.answer_text.clone()));

            Ok(SegmentedResponse {
                text: segmentation.answer_text,
                citations: self.citations.clone(),
                suggested_followups: segmentation.suggested_followups,
                history,
            })
        }
        .instrument(span)
        .await
    }
}
