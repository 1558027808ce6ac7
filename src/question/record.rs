//! Structured question records and answer feedback.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AnswerLetter
// ---------------------------------------------------------------------------

/// One of the four option letters `a`–`d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub const ALL: [AnswerLetter; 4] = [
        AnswerLetter::A,
        AnswerLetter::B,
        AnswerLetter::C,
        AnswerLetter::D,
    ];

    /// Case-insensitive `'a'..='d'`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(AnswerLetter::A),
            'b' => Some(AnswerLetter::B),
            'c' => Some(AnswerLetter::C),
            'd' => Some(AnswerLetter::D),
            _ => None,
        }
    }

    /// 1-based option number, `1..=4`.
    pub fn from_number(n: i64) -> Option<Self> {
        usize::try_from(n)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn as_char(self) -> char {
        match self {
            AnswerLetter::A => 'a',
            AnswerLetter::B => 'b',
            AnswerLetter::C => 'c',
            AnswerLetter::D => 'd',
        }
    }

    /// 0-based position in [`QuestionRecord::options`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based option number as shown to the learner.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// QuestionRecord
// ---------------------------------------------------------------------------

/// One listening-comprehension question.
///
/// The option count is fixed by the type; `answer`, when present, always
/// names one of the four options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub introduction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    pub question: String,
    pub options: [String; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerLetter>,
}

impl QuestionRecord {
    pub fn correct_option(&self) -> Option<&str> {
        self.answer.map(|a| self.options[a.index()].as_str())
    }

    /// Text submitted to the embedding provider for similarity search.
    pub fn document(&self) -> String {
        format!(
            "Situation: {}\nDialogue: {}\nQuestion: {}",
            self.introduction,
            self.conversation.as_deref().unwrap_or(""),
            self.question
        )
    }
}

// ---------------------------------------------------------------------------
// IndexedQuestion
// ---------------------------------------------------------------------------

/// A record as stored in the vector store, identified by
/// `{video_id}_{question_index}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedQuestion {
    pub video_id: String,
    pub question_index: usize,
    pub record: QuestionRecord,
}

impl IndexedQuestion {
    pub fn id(&self) -> String {
        question_id(&self.video_id, self.question_index)
    }
}

pub fn question_id(video_id: &str, question_index: usize) -> String {
    format!("{video_id}_{question_index}")
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Grading of a learner's selected option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub correct: bool,
    pub explanation: String,
    /// 1-based number of the correct option; `None` only on [`Feedback::fallback`].
    pub correct_answer: Option<u8>,
}

impl Feedback {
    pub const FALLBACK_EXPLANATION: &'static str =
        "Désolé, nous ne pouvons pas générer de feedback pour le moment. Veuillez réessayer.";

    /// Returned when no valid feedback could be produced.
    pub fn fallback() -> Self {
        Self {
            correct: false,
            explanation: Self::FALLBACK_EXPLANATION.to_string(),
            correct_answer: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.correct_answer.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn martin() -> QuestionRecord {
        QuestionRecord {
            introduction: "Martin se présente.".into(),
            conversation: Some("Bonjour je m'appelle Martin.".into()),
            question: "Comment s'appelle Martin?".into(),
            options: [
                "Jean".into(),
                "Martin".into(),
                "Pierre".into(),
                "Philippe".into(),
            ],
            answer: Some(AnswerLetter::B),
        }
    }

    #[test]
    fn letter_conversions() {
        assert_eq!(AnswerLetter::from_char('B'), Some(AnswerLetter::B));
        assert_eq!(AnswerLetter::from_char('e'), None);
        assert_eq!(AnswerLetter::from_number(4), Some(AnswerLetter::D));
        assert_eq!(AnswerLetter::from_number(0), None);
        assert_eq!(AnswerLetter::from_number(5), None);
        assert_eq!(AnswerLetter::C.index(), 2);
        assert_eq!(AnswerLetter::C.number(), 3);
        assert_eq!(AnswerLetter::D.to_string(), "d");
    }

    #[test]
    fn correct_option_follows_answer() {
        assert_eq!(martin().correct_option(), Some("Martin"));

        let unanswered = QuestionRecord {
            answer: None,
            ..martin()
        };
        assert_eq!(unanswered.correct_option(), None);
    }

    #[test]
    fn document_concatenates_situation_dialogue_question() {
        let doc = martin().document();
        assert_eq!(
            doc,
            "Situation: Martin se présente.\nDialogue: Bonjour je m'appelle Martin.\nQuestion: Comment s'appelle Martin?"
        );
    }

    #[test]
    fn answer_serialises_as_lowercase_letter() {
        let json = serde_json::to_value(martin()).unwrap();
        assert_eq!(json["answer"], "b");
        assert_eq!(json["options"][1], "Martin");
    }

    #[test]
    fn indexed_question_id() {
        let indexed = IndexedQuestion {
            video_id: "wqkIJLMR".into(),
            question_index: 3,
            record: martin(),
        };
        assert_eq!(indexed.id(), "wqkIJLMR_3");
    }

    #[test]
    fn fallback_feedback_has_no_answer() {
        let fb = Feedback::fallback();
        assert!(!fb.correct);
        assert!(fb.is_fallback());
        assert_eq!(fb.correct_answer, None);
    }
}
