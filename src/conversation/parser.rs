use std::sync::Arc;

use thiserror::Error;

use crate::config::GenerationConfig;
use crate::conversation::prompt::conversation_prompt;
use crate::conversation::scanner::parse_turns;
use crate::conversation::turn::ConversationTurn;
use crate::conversation::validate::check;
use crate::error::{ConversationFormatError, GenerationError, ParseError, ValidationError};
use crate::provider::{GenerationRequest, ProviderError, TextGenerator};
use crate::question::QuestionRecord;
use crate::retry::{self, RetryError, RetryPolicy, Retryable};

/// Failure of a single prompt+scan+validate attempt.
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Retryable for AttemptError {
    fn is_retryable(&self) -> bool {
        !matches!(self, AttemptError::Provider(_))
    }
}

/// Turns a question record into validated speaker turns via the model.
pub struct ConversationParser {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl ConversationParser {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        config: &GenerationConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            temperature: config.conversation_temperature,
            max_tokens: config.conversation_max_tokens,
            retry,
        }
    }

    /// Ask the model for a tagged script and scan it into turns.
    ///
    /// Malformed or invalid scripts are re-requested up to the retry
    /// policy's limit. A failing model call is not retried.
    pub async fn parse(
        &self,
        record: &QuestionRecord,
    ) -> Result<Vec<ConversationTurn>, GenerationError> {
        let request = GenerationRequest::new(conversation_prompt(record), self.temperature)
            .with_max_tokens(self.max_tokens);
        let generator = &self.generator;
        let request = &request;

        let outcome = retry::run(self.retry, "conversation", |_attempt| async move {
            let response = generator.generate(request).await?;
            let turns = parse_turns(&response)?;
            check(&turns)?;
            Ok::<_, AttemptError>(turns)
        })
        .await;

        match outcome {
            Ok(turns) => {
                log::info!("conversation: parsed {} turns", turns.len());
                for turn in &turns {
                    log::debug!(
                        "conversation: [{}] {} ({}): {}",
                        turn.section,
                        turn.speaker,
                        turn.gender,
                        turn.text
                    );
                }
                Ok(turns)
            }
            Err(RetryError::Aborted(AttemptError::Provider(e))) => {
                Err(GenerationError::Provider(e))
            }
            Err(RetryError::Aborted(e)) => Err(ConversationFormatError {
                attempts: 1,
                last: e.to_string(),
            }
            .into()),
            Err(RetryError::Exhausted { attempts, last }) => Err(ConversationFormatError {
                attempts,
                last: last.to_string(),
            }
            .into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
