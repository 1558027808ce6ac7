//! Turns raw listening-test transcripts into `<question>` blocks.

pub mod structurer;

pub use structurer::{load_transcript, save_questions, TranscriptStructurer};
