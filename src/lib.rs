//! French listening-comprehension question pipeline.
//!
//! ```text
//! transcript → TranscriptStructurer → <question> blocks
//!            → QuestionVectorStore (index) ⇄ QuestionGenerator (generate, feedback)
//!            → ConversationParser → turns → AudioAssembler → audio file
//! ```
//!
//! Model, embedding and speech providers are injected as `Arc<dyn …>`
//! capability traits from [`provider`]; the external audio tool is
//! [`audio::ClipTool`].

pub mod audio;
pub mod config;
pub mod conversation;
pub mod error;
pub mod provider;
pub mod question;
pub mod retry;
pub mod store;
pub mod transcript;

pub use error::{
    AudioAssemblyError, ClipToolError, ConversationFormatError, GenerationError, ParseError,
    StoreError, ValidationError,
};
