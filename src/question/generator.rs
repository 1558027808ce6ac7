//! Retrieval-augmented question generation and answer grading.

use std::sync::Arc;

use crate::config::GenerationConfig;
use crate::provider::{GenerationRequest, TextGenerator};
use crate::question::feedback::{parse_feedback, FeedbackError};
use crate::question::parse::{parse_generated, GeneratedQuestion};
use crate::question::prompt::{feedback_prompt, question_prompt};
use crate::question::{Feedback, QuestionRecord};
use crate::retry::{self, RetryPolicy};
use crate::store::QuestionVectorStore;

/// Number of similar questions retrieved as few-shot examples.
const EXAMPLE_COUNT: usize = 3;

pub struct QuestionGenerator {
    generator: Arc<dyn TextGenerator>,
    store: QuestionVectorStore,
    question_temperature: f32,
    feedback_temperature: f32,
    retry: RetryPolicy,
}

impl QuestionGenerator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        store: QuestionVectorStore,
        config: &GenerationConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            store,
            question_temperature: config.question_temperature,
            feedback_temperature: config.feedback_temperature,
            retry,
        }
    }

    pub fn store(&self) -> &QuestionVectorStore {
        &self.store
    }

    /// Generate a new question about `topic` from the nearest stored
    /// examples.
    ///
    /// Returns `None` when the store has nothing similar, the model call
    /// fails, or the response contains no question at all.
    pub async fn generate(&self, topic: &str) -> Option<GeneratedQuestion> {
        let examples = self.store.search(topic, EXAMPLE_COUNT).await;
        if examples.is_empty() {
            log::warn!("question: no stored examples for topic {topic:?}");
            return None;
        }
        log::debug!(
            "question: using examples {:?}",
            examples.iter().map(|e| e.id.as_str()).collect::<Vec<_>>()
        );

        let request =
            GenerationRequest::new(question_prompt(topic, &examples), self.question_temperature);
        let text = match self.generator.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("question: generation for {topic:?} failed: {e}");
                return None;
            }
        };

        let generated = parse_generated(&text)?;
        log::info!(
            "question: generated {:?}{}",
            generated.record.question,
            if generated.placeholder_options {
                " (placeholder options)"
            } else {
                ""
            }
        );
        Some(generated)
    }

    /// Grade option `selected` (1-based) of `record`.
    ///
    /// Never fails: when no attempt yields valid feedback the fixed
    /// [`Feedback::fallback`] is returned.
    pub async fn feedback(&self, record: &QuestionRecord, selected: u8) -> Feedback {
        if !(1..=4).contains(&selected) {
            log::warn!("feedback: selected option {selected} is outside 1..=4");
            return Feedback::fallback();
        }

        let request =
            GenerationRequest::new(feedback_prompt(record, selected), self.feedback_temperature);
        let generator = &self.generator;
        let request = &request;

        let outcome = retry::run(self.retry, "feedback", |_attempt| async move {
            let response = generator.generate(request).await?;
            parse_feedback(&response, record)
        })
        .await;

        match outcome {
            Ok(feedback) => feedback,
            Err(e) => {
                let e: FeedbackError = e.into_inner();
                log::error!("feedback: returning fallback after failures: {e}");
                Feedback::fallback()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
