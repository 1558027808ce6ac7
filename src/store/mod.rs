//! Persisted question index for retrieval-augmented question generation.
//!
//! * [`parse_questions`] — reads the `<question>…</question>` interchange
//!   format produced by the transcript structurer.
//! * [`QuestionVectorStore`] — embeds, stores and searches question records.

pub mod block;
pub mod vector;

pub use block::{parse_answer, parse_questions, split_options};
pub use vector::{video_id_from_path, QuestionVectorStore, ScoredQuestion};
