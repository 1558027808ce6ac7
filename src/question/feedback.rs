//! Extraction and validation of model-written answer feedback.
//!
//! The model is asked for a JSON object but routinely wraps it in prose or
//! code fences, so the first balanced `{…}` in the response is taken.
//!
//! When `correct` is `true` the explanation must share at least one word
//! with the introduction. This grounding check is weak (any common word such
//! as "le" satisfies it) and only catches explanations that ignore the
//! scenario entirely.

use thiserror::Error;

use crate::error::{ParseError, ValidationError};
use crate::provider::ProviderError;
use crate::question::{Feedback, QuestionRecord};
use crate::retry::Retryable;

/// Failure of one feedback attempt. Every variant is retried.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Retryable for FeedbackError {}

/// The first balanced `{…}` in `text`, ignoring braces inside JSON strings.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse and validate a feedback response for `record`.
pub fn parse_feedback(response: &str, record: &QuestionRecord) -> Result<Feedback, FeedbackError> {
    let object = extract_json_object(response).ok_or(ParseError::NoJsonObject)?;
    let value: serde_json::Value =
        serde_json::from_str(object).map_err(|e| ParseError::Json(e.to_string()))?;

    let correct = field(&value, "correct")?
        .as_bool()
        .ok_or(ValidationError::WrongType("correct"))?;
    let explanation = field(&value, "explanation")?
        .as_str()
        .ok_or(ValidationError::WrongType("explanation"))?
        .to_string();
    let correct_answer = field(&value, "correct_answer")?
        .as_i64()
        .ok_or(ValidationError::WrongType("correct_answer"))?;

    if !(1..=4).contains(&correct_answer) {
        return Err(ValidationError::AnswerOutOfRange(correct_answer).into());
    }

    if correct && !is_grounded(&explanation, &record.introduction) {
        return Err(ValidationError::Ungrounded.into());
    }

    Ok(Feedback {
        correct,
        explanation,
        correct_answer: u8::try_from(correct_answer).ok(),
    })
}

fn field<'a>(
    value: &'a serde_json::Value,
    name: &'static str,
) -> Result<&'a serde_json::Value, ValidationError> {
    value.get(name).ok_or(ValidationError::MissingField(name))
}

/// `true` when any whitespace-separated word of `introduction` occurs in
/// `explanation` (case-insensitive).
fn is_grounded(explanation: &str, introduction: &str) -> bool {
    let explanation = explanation.to_lowercase();
    introduction
        .to_lowercase()
        .split_whitespace()
        .any(|word| explanation.contains(word))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> QuestionRecord {
        QuestionRecord {
            introduction: "Martin présente son nom.".into(),
            conversation: None,
            question: "Comment s'appelle Martin?".into(),
            options: ["Jean".into(), "Martin".into(), "Pierre".into(), "Philippe".into()],
            answer: None,
        }
    }

    #[test]
    fn extracts_object_from_prose() {
        let text = "Voici le JSON:\n```json\n{\"a\": {\"b\": 1}}\n```\nMerci {fin}";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"{"explanation": "texte avec } et {", "x": 1} reste"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"explanation": "texte avec } et {", "x": 1}"#)
        );
    }

    #[test]
    fn unbalanced_object_is_none() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("pas de json"), None);
    }

    #[test]
    fn valid_correct_feedback() {
        let response = r#"{"correct": true, "explanation": "Très bien! Martin présente son nom.", "correct_answer": 2}"#;
        let fb = parse_feedback(response, &record()).unwrap();
        assert!(fb.correct);
        assert_eq!(fb.correct_answer, Some(2));
    }

    #[test]
    fn incorrect_feedback_skips_grounding_check() {
        let response = r#"{"correct": false, "explanation": "Non.", "correct_answer": 2}"#;
        let fb = parse_feedback(response, &record()).unwrap();
        assert!(!fb.correct);
    }

    #[test]
    fn ungrounded_correct_feedback_is_rejected() {
        let response = r#"{"correct": true, "explanation": "Bravo!", "correct_answer": 2}"#;
        assert!(matches!(
            parse_feedback(response, &record()),
            Err(FeedbackError::Validation(ValidationError::Ungrounded))
        ));
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let response = r#"{"correct": false, "explanation": "Non.", "correct_answer": 5}"#;
        assert!(matches!(
            parse_feedback(response, &record()),
            Err(FeedbackError::Validation(ValidationError::AnswerOutOfRange(5)))
        ));
    }

    #[test]
    fn wrong_types_and_missing_fields_are_rejected() {
        let wrong_type = r#"{"correct": "yes", "explanation": "x", "correct_answer": 1}"#;
        assert!(matches!(
            parse_feedback(wrong_type, &record()),
            Err(FeedbackError::Validation(ValidationError::WrongType("correct")))
        ));

        let missing = r#"{"correct": false, "explanation": "x"}"#;
        assert!(matches!(
            parse_feedback(missing, &record()),
            Err(FeedbackError::Validation(ValidationError::MissingField("correct_answer")))
        ));

        let float_answer = r#"{"correct": false, "explanation": "x", "correct_answer": 2.5}"#;
        assert!(matches!(
            parse_feedback(float_answer, &record()),
            Err(FeedbackError::Validation(ValidationError::WrongType("correct_answer")))
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            parse_feedback("{correct: true}", &record()),
            Err(FeedbackError::Parse(ParseError::Json(_)))
        ));
        assert!(matches!(
            parse_feedback("désolé", &record()),
            Err(FeedbackError::Parse(ParseError::NoJsonObject))
        ));
    }
}
