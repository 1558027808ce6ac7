//! Error taxonomy shared across the pipeline stages.
//!
//! | Error                     | Raised by                         | Recovery                      |
//! |---------------------------|-----------------------------------|-------------------------------|
//! | [`GenerationError`]       | structurer, conversation parsing  | propagated to the caller      |
//! | [`ParseError`]            | feedback / conversation parsing   | bounded retry of the call     |
//! | [`ValidationError`]       | feedback / turn validation        | bounded retry, then fallback  |
//! | [`ConversationFormatError`] | conversation formatting         | fatal once retries exhaust    |
//! | [`AudioAssemblyError`]    | audio assembler                   | fatal, partial output removed |
//! | [`StoreError`]            | vector store persistence          | propagated to the caller      |

use thiserror::Error;

use crate::provider::ProviderError;

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// A remote model call failed or its output could not be turned into the
/// requested structure.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Conversation(#[from] ConversationFormatError),
}

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// Model output drifted from the requested line or JSON format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("speaker line has no name: {0:?}")]
    MissingSpeaker(String),

    #[error("speaker line has no gender: {0:?}")]
    MissingGender(String),

    #[error("unrecognised gender {0:?}")]
    UnknownGender(String),
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A structural invariant of parsed model output does not hold.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no conversation turns were produced")]
    NoTurns,

    #[error("first speaker must be the announcer, got {0:?}")]
    FirstSpeakerNotAnnouncer(String),

    #[error("turn {0} has an empty speaker")]
    EmptySpeaker(usize),

    #[error("turn {0} has empty text")]
    EmptyText(usize),

    #[error("feedback field `{0}` is missing")]
    MissingField(&'static str),

    #[error("feedback field `{0}` has the wrong type")]
    WrongType(&'static str),

    #[error("correct_answer {0} is outside 1..=4")]
    AnswerOutOfRange(i64),

    #[error("explanation shares no word with the introduction")]
    Ungrounded,
}

// ---------------------------------------------------------------------------
// ConversationFormatError
// ---------------------------------------------------------------------------

/// Every attempt to obtain well-formed conversation turns failed.
#[derive(Debug, Error)]
#[error("conversation format still invalid after {attempts} attempts: {last}")]
pub struct ConversationFormatError {
    pub attempts: u32,
    /// Description of the failure seen on the final attempt.
    pub last: String,
}

// ---------------------------------------------------------------------------
// ClipToolError / AudioAssemblyError
// ---------------------------------------------------------------------------

/// Failure of the external audio tool.
#[derive(Debug, Error)]
pub enum ClipToolError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Audio assembly failed; no output file is left behind.
#[derive(Debug, Error)]
pub enum AudioAssemblyError {
    #[error("could not obtain conversation turns: {0}")]
    Generation(#[from] GenerationError),

    #[error("speech synthesis failed for turn {index}: {source}")]
    Synthesis {
        index: usize,
        #[source]
        source: ProviderError,
    },

    #[error("silence generation failed: {0}")]
    Silence(#[source] ClipToolError),

    #[error("concatenation failed: {0}")]
    Concat(#[source] ClipToolError),

    #[error("no audio clips were produced")]
    NoClips,

    #[error("audio file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Vector store persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
