//! Question records, generation and answer grading.
//!
//! * [`QuestionRecord`] — one multiple-choice listening question.
//! * [`QuestionGenerator`] — few-shot generation from the vector store and
//!   JSON-validated answer feedback with bounded retry.

pub mod feedback;
pub mod generator;
pub mod parse;
pub mod prompt;
pub mod record;

pub use feedback::{extract_json_object, parse_feedback, FeedbackError};
pub use generator::QuestionGenerator;
pub use parse::{parse_generated, GeneratedQuestion, PLACEHOLDER_OPTIONS};
pub use record::{question_id, AnswerLetter, Feedback, IndexedQuestion, QuestionRecord};
