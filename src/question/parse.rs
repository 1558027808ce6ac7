//! Line-prefix state machine for freshly generated questions.
//!
//! The model is asked for:
//!
//! ```text
//! Introduction: …
//! Question: …
//! Options:
//! 1. …
//! 2. …
//! 3. …
//! 4. …
//! ```
//!
//! Each recognised prefix opens a field; unprefixed lines continue the open
//! field. Inside `Options:` a line numbered `1.`–`4.` (or lettered `a.`–`d.`)
//! starts a new option and any other line continues the previous option.

use crate::question::{AnswerLetter, QuestionRecord};
use crate::store::parse_answer;

/// Substituted when the model does not produce exactly four options.
pub const PLACEHOLDER_OPTIONS: [&str; 4] = [
    "[option 1 in french]",
    "[option 2 in french]",
    "[option 3 in french]",
    "[option 4 in french]",
];

/// Outcome of parsing a generated question.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuestion {
    pub record: QuestionRecord,
    /// `true` when the model's options were unusable and
    /// [`PLACEHOLDER_OPTIONS`] were substituted.
    pub placeholder_options: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Introduction,
    Conversation,
    Situation,
    Question,
    Options,
    Answer,
}

const PREFIXES: [(&str, Field); 6] = [
    ("Introduction:", Field::Introduction),
    ("Conversation:", Field::Conversation),
    ("Situation:", Field::Situation),
    ("Question:", Field::Question),
    ("Options:", Field::Options),
    ("Answer:", Field::Answer),
];

#[derive(Default)]
struct Fields {
    introduction: Vec<String>,
    conversation: Vec<String>,
    situation: Vec<String>,
    question: Vec<String>,
    options: Vec<String>,
    answer: Vec<String>,
}

impl Fields {
    fn text_mut(&mut self, field: Field) -> &mut Vec<String> {
        match field {
            Field::Introduction => &mut self.introduction,
            Field::Conversation => &mut self.conversation,
            Field::Situation => &mut self.situation,
            Field::Question => &mut self.question,
            Field::Options => &mut self.options,
            Field::Answer => &mut self.answer,
        }
    }

    fn push_option_line(&mut self, line: &str) {
        if let Some(option) = strip_option_marker(line) {
            self.options.push(option.to_string());
        } else if let Some(last) = self.options.last_mut() {
            last.push(' ');
            last.push_str(line);
        } else {
            log::debug!("question: ignoring unnumbered line before first option: {line:?}");
        }
    }
}

/// `"2. Martin"` or `"b. Martin"` → `"Martin"`.
fn strip_option_marker(line: &str) -> Option<&str> {
    let mut chars = line.char_indices();
    let (_, first) = chars.next()?;
    let (dot, second) = chars.next()?;
    let numbered = matches!(first, '1'..='4');
    let lettered = AnswerLetter::from_char(first).is_some();
    if (numbered || lettered) && (second == '.' || second == ')') {
        Some(line[dot + 1..].trim())
    } else {
        None
    }
}

/// Parse a generated question. Returns `None` when no question text was
/// produced at all.
pub fn parse_generated(text: &str) -> Option<GeneratedQuestion> {
    let mut fields = Fields::default();
    let mut current: Option<Field> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((field, rest)) = PREFIXES
            .iter()
            .find_map(|(prefix, field)| line.strip_prefix(prefix).map(|r| (*field, r.trim())))
        {
            current = Some(field);
            if field == Field::Options {
                if !rest.is_empty() {
                    fields.push_option_line(rest);
                }
            } else if !rest.is_empty() {
                fields.text_mut(field).push(rest.to_string());
            }
            continue;
        }

        match current {
            Some(Field::Options) => fields.push_option_line(line),
            Some(field) => fields.text_mut(field).push(line.to_string()),
            None => log::debug!("question: ignoring preamble line {line:?}"),
        }
    }

    let question = fields.question.join(" ");
    if question.is_empty() {
        log::warn!("question: generated text has no Question field");
        return None;
    }

    let introduction = if fields.introduction.is_empty() {
        fields.situation.join(" ")
    } else {
        fields.introduction.join(" ")
    };
    let conversation = Some(fields.conversation.join(" ")).filter(|c| !c.is_empty());

    let answer = fields.answer.first().and_then(|a| {
        parse_answer(a).or_else(|| {
            a.trim_end_matches(['.', ')'])
                .parse::<i64>()
                .ok()
                .and_then(AnswerLetter::from_number)
        })
    });

    let (options, placeholder_options) = match <[String; 4]>::try_from(fields.options) {
        Ok(options) => (options, false),
        Err(got) => {
            log::warn!(
                "question: expected 4 options, got {}; substituting placeholders",
                got.len()
            );
            (PLACEHOLDER_OPTIONS.map(String::from), true)
        }
    };

    Some(GeneratedQuestion {
        record: QuestionRecord {
            introduction,
            conversation,
            question,
            options,
            answer: if placeholder_options { None } else { answer },
        },
        placeholder_options,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
