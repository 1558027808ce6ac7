//! Conversation turn data types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Speaker name of the narrator that opens every question.
pub const ANNOUNCER: &str = "Annonceur";

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Voice gender of a speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Accepts English and French spellings (`male`, `homme`, `masculin`,
    /// `m`, and the feminine equivalents), case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "male" | "homme" | "masculin" | "m" => Some(Self::Male),
            "female" | "femme" | "féminin" | "feminin" | "f" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// Phase of a listening question a turn belongs to.
///
/// Unrecognised labels are kept as [`Section::Other`] so validation can warn
/// about them without rejecting the turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Introduction,
    Conversation,
    Question,
    Other(String),
}

impl Section {
    /// `"Introduction"`, `"[Question]"`, `"conversation"` … are all accepted.
    pub fn from_label(label: &str) -> Self {
        let label = label
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim()
            .to_lowercase();
        match label.as_str() {
            "introduction" => Self::Introduction,
            "conversation" | "dialogue" => Self::Conversation,
            "question" => Self::Question,
            _ => Self::Other(label),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Introduction => f.write_str("introduction"),
            Self::Conversation => f.write_str("conversation"),
            Self::Question => f.write_str("question"),
            Self::Other(label) => f.write_str(label),
        }
    }
}

// ---------------------------------------------------------------------------
// ConversationTurn
// ---------------------------------------------------------------------------

/// One utterance of the synthesized script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: String,
    pub text: String,
    pub gender: Gender,
    pub section: Section,
}

impl ConversationTurn {
    pub fn new(
        speaker: impl Into<String>,
        text: impl Into<String>,
        gender: Gender,
        section: Section,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            gender,
            section,
        }
    }

    pub fn is_announcer(&self) -> bool {
        is_announcer(&self.speaker)
    }
}

pub fn is_announcer(speaker: &str) -> bool {
    speaker.trim().eq_ignore_ascii_case(ANNOUNCER)
}

/// Map English role names to their French form; other names pass through
/// trimmed.
pub fn normalize_speaker(name: &str) -> String {
    let name = name.trim();
    match name.to_lowercase().as_str() {
        "announcer" | "annonceur" => ANNOUNCER.to_string(),
        "student" => "Étudiant".to_string(),
        "teacher" => "Professeur".to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_synonyms() {
        assert_eq!(Gender::from_label("Homme"), Some(Gender::Male));
        assert_eq!(Gender::from_label(" m "), Some(Gender::Male));
        assert_eq!(Gender::from_label("féminin"), Some(Gender::Female));
        assert_eq!(Gender::from_label("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::from_label("robot"), None);
    }

    #[test]
    fn section_labels() {
        assert_eq!(Section::from_label("[Introduction]"), Section::Introduction);
        assert_eq!(Section::from_label("Question"), Section::Question);
        assert_eq!(
            Section::from_label("Annonce"),
            Section::Other("annonce".into())
        );
        assert!(!Section::from_label("Annonce").is_known());
    }

    #[test]
    fn speaker_names_are_normalised() {
        assert_eq!(normalize_speaker("announcer"), ANNOUNCER);
        assert_eq!(normalize_speaker(" Student "), "Étudiant");
        assert_eq!(normalize_speaker("teacher"), "Professeur");
        assert_eq!(normalize_speaker("Marie"), "Marie");
        assert!(is_announcer("annonceur"));
    }
}
