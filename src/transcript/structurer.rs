use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::provider::{GenerationRequest, ProviderError, TextGenerator};

const STRUCTURE_PROMPT: &str = "\
Extract questions from this transcript where the answer can be determined solely from the conversation without needing visual aids.

ONLY include questions that meet these criteria:
- The answer can be determined purely from the spoken dialogue
- No spatial/visual information is needed (like locations, layouts, or physical appearances)
- No physical objects or visual choices need to be compared

For example, INCLUDE questions about:
- Times and dates
- Numbers and quantities
- Spoken choices or decisions
- Clear verbal directions
- Information from conversations
- Details from announcements or radio segments
- Specific details or facts from the conversation

Format each question exactly like this:

<question>
    Introduction:
    [french introduction in french]

    Conversation:
    [conversation in french]

    Question:
    [french question in french]

    Options:
    a. [option 1 in french]
    b. [option 2 in french]
    c. [option 3 in french]
    d. [option 4 in french]

    Answer:
    [one of a, b, c, d]
</question>

Rules:
- Only extract questions from the TEF transcript
- Only include questions where answers can be determined from dialogue alone
- Ignore any practice examples (marked with \"Exemple\")
- Do not translate any French text
- Do not include any section descriptions or other text
- Output questions one after another with no extra text between them
- Remove all text about music or sound";

/// Sends a transcript to the model with fixed extraction instructions.
///
/// The output is returned verbatim; parsing it is the vector store's job.
pub struct TranscriptStructurer {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
}

impl TranscriptStructurer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &GenerationConfig) -> Self {
        Self {
            generator,
            temperature: config.structurer_temperature,
        }
    }

    /// Return the raw `<question>…</question>` blocks extracted from
    /// `transcript`. Blank model output is an error.
    pub async fn structure(&self, transcript: &str) -> Result<String, GenerationError> {
        let prompt = format!("{STRUCTURE_PROMPT}\n\nHere's the transcript:\n{transcript}");
        let request = GenerationRequest::new(prompt, self.temperature);

        let text = self.generator.generate(&request).await?;
        if text.trim().is_empty() {
            return Err(GenerationError::Provider(ProviderError::EmptyResponse));
        }
        log::info!(
            "transcript: structured {} chars into {} blocks",
            transcript.len(),
            text.matches("<question>").count()
        );
        Ok(text)
    }
}

/// Write structured output to `path`, creating parent directories.
pub fn save_questions(content: &str, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("transcript: saved questions to {}", path.display());
    Ok(())
}

pub fn load_transcript(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("cannot read transcript {}", path.display()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
