//! Parser for the persisted `<question>…</question>` text format.
//!
//! ```text
//! <question>
//!     Introduction:
//!     Martin présente son nom, sa nationalité et son âge.
//!     Conversation:
//!     Bonjour je m'appelle Martin, je suis belge et j'ai 34 ans.
//!     Question:
//!     Comment s'appelle Martin?
//!     Options:
//!     a. Jean
//!     b. Martin
//!     c. Pierre
//!     d. Philippe
//!     Answer:
//!     b. Martin
//! </question>
//! ```
//!
//! A tag's value may sit on the tag line itself or on the lines that follow
//! it, up to the next tag. Options may be one per line or all on one line;
//! four marked lines are read one option per line, so letters inside an
//! option (`Le docteur B. Martin`) are kept as text.
//! Blocks that lack a question, do not carry exactly four lettered options,
//! or carry an unreadable answer are dropped with a warning.

use std::sync::OnceLock;

use regex::Regex;

use crate::question::{AnswerLetter, QuestionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Introduction,
    Conversation,
    Situation,
    Question,
    Options,
    Answer,
}

const TAGS: [(&str, Tag); 6] = [
    ("Introduction:", Tag::Introduction),
    ("Conversation:", Tag::Conversation),
    ("Situation:", Tag::Situation),
    ("Question:", Tag::Question),
    ("Options:", Tag::Options),
    ("Answer:", Tag::Answer),
];

fn split_tag(line: &str) -> Option<(Tag, &str)> {
    TAGS.iter()
        .find_map(|(prefix, tag)| line.strip_prefix(prefix).map(|rest| (*tag, rest.trim())))
}

/// Lines collected for one block, keyed by tag.
#[derive(Default)]
struct Draft {
    introduction: Vec<String>,
    conversation: Vec<String>,
    situation: Vec<String>,
    question: Vec<String>,
    options: Vec<String>,
    answer: Vec<String>,
    current: Option<Tag>,
}

impl Draft {
    fn push(&mut self, tag: Tag, text: &str) {
        if text.is_empty() {
            return;
        }
        let lines = match tag {
            Tag::Introduction => &mut self.introduction,
            Tag::Conversation => &mut self.conversation,
            Tag::Situation => &mut self.situation,
            Tag::Question => &mut self.question,
            Tag::Options => &mut self.options,
            Tag::Answer => &mut self.answer,
        };
        lines.push(text.to_string());
    }

    fn read_options(&self) -> Option<[String; 4]> {
        let per_line = self.options.len() == 4
            && self.options.iter().all(|line| strip_marker(line).is_some());
        if per_line {
            options_from_lines(&self.options)
        } else {
            split_options(&self.options.join(" "))
        }
    }

    fn finish(self) -> Result<QuestionRecord, &'static str> {
        let question = self.question.join(" ");
        if question.is_empty() {
            return Err("missing question");
        }

        let options = self.read_options().ok_or("options are not a. to d.")?;

        let answer = if self.answer.is_empty() {
            None
        } else {
            Some(parse_answer(&self.answer.join(" ")).ok_or("unreadable answer")?)
        };

        // `Situation:` is the older spelling of the scenario text.
        let introduction = if self.introduction.is_empty() {
            self.situation.join(" ")
        } else {
            self.introduction.join(" ")
        };

        let conversation = Some(self.conversation.join(" ")).filter(|c| !c.is_empty());

        Ok(QuestionRecord {
            introduction,
            conversation,
            question,
            options,
            answer,
        })
    }
}

/// Parse every well-formed `<question>` block in `text`, in order.
pub fn parse_questions(text: &str) -> Vec<QuestionRecord> {
    let mut records = Vec::new();
    let mut draft: Option<Draft> = None;
    let mut block = 0usize;

    for line in text.lines().map(str::trim) {
        if line.starts_with("<question>") {
            if draft.is_some() {
                log::warn!("store: block {block} never closed, dropping it");
            }
            block += 1;
            draft = Some(Draft::default());
            continue;
        }

        if line.starts_with("</question>") {
            match draft.take().map(Draft::finish) {
                Some(Ok(record)) => records.push(record),
                Some(Err(reason)) => log::warn!("store: dropping block {block}: {reason}"),
                None => log::debug!("store: stray </question> ignored"),
            }
            continue;
        }

        let Some(open) = draft.as_mut() else {
            continue;
        };

        if let Some((tag, rest)) = split_tag(line) {
            open.current = Some(tag);
            open.push(tag, rest);
        } else if let Some(tag) = open.current {
            open.push(tag, line);
        }
    }

    if draft.is_some() {
        log::warn!("store: block {block} never closed, dropping it");
    }

    records
}

const OPTION_MARKER: &str = r"(?:^|\s)([a-dA-D])[.)](?:\s+|$)";

/// Compiled [`OPTION_MARKER`]. The pattern is a literal covered by
/// `option_marker_pattern_compiles`; this is the library's only panic site.
fn option_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(OPTION_MARKER).expect("option marker pattern is valid"))
}

/// Split a leading `a.`/`b)` marker off `line`.
fn strip_marker(line: &str) -> Option<(AnswerLetter, &str)> {
    let mut chars = line.char_indices();
    let (_, first) = chars.next()?;
    let letter = AnswerLetter::from_char(first)?;
    let (_, punct) = chars.next()?;
    if punct != '.' && punct != ')' {
        return None;
    }
    let rest = chars.as_str();
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((letter, rest.trim()))
}

/// One option per line, markers `a` to `d` in order, none empty.
fn options_from_lines(lines: &[String]) -> Option<[String; 4]> {
    let mut options: [String; 4] = Default::default();
    for (i, line) in lines.iter().enumerate() {
        let (letter, text) = strip_marker(line)?;
        if letter != AnswerLetter::ALL[i] || text.is_empty() {
            return None;
        }
        options[i] = text.to_string();
    }
    Some(options)
}

/// Split `"a. Jean b. Martin c. Pierre d. Philippe"` into its four option
/// texts. Markers must appear in `a`, `b`, `c`, `d` order and every option
/// must be non-empty.
pub fn split_options(text: &str) -> Option<[String; 4]> {
    // (marker start, content start) for each letter in order.
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(4);

    for caps in option_marker().captures_iter(text) {
        let (Some(whole), Some(letter)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let expected = AnswerLetter::ALL[spans.len()].as_char();
        if letter.as_str().eq_ignore_ascii_case(&expected.to_string()) {
            spans.push((whole.start(), whole.end()));
            if spans.len() == 4 {
                break;
            }
        }
    }

    if spans.len() != 4 {
        return None;
    }

    let mut options: [String; 4] = Default::default();
    for (i, &(_, content_start)) in spans.iter().enumerate() {
        let end = spans.get(i + 1).map_or(text.len(), |&(marker_start, _)| marker_start);
        let option = text[content_start..end].trim();
        if option.is_empty() {
            return None;
        }
        options[i] = option.to_string();
    }
    Some(options)
}

/// Read `"b"`, `"b."`, `"b)"` or `"b. Martin"` as an answer letter.
pub fn parse_answer(text: &str) -> Option<AnswerLetter> {
    let mut chars = text.trim().chars();
    let letter = AnswerLetter::from_char(chars.next()?)?;
    match chars.next() {
        None => Some(letter),
        Some(c) if c == '.' || c == ')' || c == ':' || c.is_whitespace() => Some(letter),
        Some(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
