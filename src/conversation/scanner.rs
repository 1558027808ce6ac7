//! Line scanner for the tagged turn format the model is asked to produce:
//!
//! ```text
//! Section: Introduction
//! Intervenant: Annonceur (Genre: male)
//! Texte: Écoutez la conversation suivante.
//! ---
//! ```
//!
//! Recognised prefixes are `Section:`, `Intervenant:`/`Speaker:`,
//! `Texte:`/`Text:` and the `---` separator. A turn is closed when the next
//! speaker line opens or a separator is seen; unprefixed lines continue the
//! open turn's text.
//!
//! Section assignment: a turn takes the most recent explicit `Section:`
//! label. When no label has been seen yet, the unset-section rule applies:
//! the first turn is `introduction` and every later one is `conversation`.

use std::collections::HashMap;

use crate::conversation::turn::{normalize_speaker, ConversationTurn, Gender, Section};
use crate::error::ParseError;

const SPEAKER_PREFIXES: [&str; 2] = ["Intervenant:", "Speaker:"];
const TEXT_PREFIXES: [&str; 2] = ["Texte:", "Text:"];
const GENDER_TAGS: [&str; 2] = ["Genre:", "Gender:"];
const SEPARATOR: &str = "---";

// ---------------------------------------------------------------------------
// GenderRegistry
// ---------------------------------------------------------------------------

/// First-seen gender per speaker name.
#[derive(Debug, Default)]
pub struct GenderRegistry {
    genders: HashMap<String, Gender>,
}

impl GenderRegistry {
    /// Returns the authoritative gender for `speaker`, registering `claimed`
    /// if the speaker is new. A conflicting claim is logged and overridden.
    pub fn resolve(&mut self, speaker: &str, claimed: Gender) -> Gender {
        match self.genders.get(speaker) {
            Some(&known) if known != claimed => {
                log::warn!(
                    "conversation: {speaker} was {known}, overriding later claim of {claimed}"
                );
                known
            }
            Some(&known) => known,
            None => {
                self.genders.insert(speaker.to_string(), claimed);
                claimed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TurnScanner
// ---------------------------------------------------------------------------

struct OpenTurn {
    speaker: String,
    gender: Gender,
    section: Option<Section>,
    text: String,
}

#[derive(Default)]
pub struct TurnScanner {
    turns: Vec<ConversationTurn>,
    open: Option<OpenTurn>,
    current_section: Option<Section>,
    genders: GenderRegistry,
}

impl TurnScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_line(&mut self, line: &str) -> Result<(), ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(label) = line.strip_prefix("Section:") {
            let section = Section::from_label(label);
            // A section line between a speaker line and its text still
            // belongs to that turn.
            if let Some(open) = self.open.as_mut().filter(|o| o.text.is_empty()) {
                open.section = Some(section.clone());
            }
            self.current_section = Some(section);
        } else if let Some(rest) = strip_any(line, &SPEAKER_PREFIXES) {
            self.close();
            let (speaker, claimed) = parse_speaker(rest.trim())?;
            let gender = self.genders.resolve(&speaker, claimed);
            self.open = Some(OpenTurn {
                speaker,
                gender,
                section: self.current_section.clone(),
                text: String::new(),
            });
        } else if let Some(text) = strip_any(line, &TEXT_PREFIXES) {
            match self.open.as_mut() {
                Some(open) => open.text = text.trim().to_string(),
                None => log::debug!("conversation: text without speaker ignored: {line:?}"),
            }
        } else if line == SEPARATOR {
            self.close();
        } else if let Some(open) = self.open.as_mut().filter(|o| !o.text.is_empty()) {
            open.text.push(' ');
            open.text.push_str(line);
        } else {
            log::debug!("conversation: ignoring line {line:?}");
        }
        Ok(())
    }

    pub fn finish(mut self) -> Vec<ConversationTurn> {
        self.close();
        self.turns
    }

    fn close(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        if open.text.is_empty() {
            log::debug!("conversation: dropping {} turn with no text", open.speaker);
            return;
        }
        let section = open.section.unwrap_or_else(|| self.unset_section());
        self.turns
            .push(ConversationTurn::new(open.speaker, open.text, open.gender, section));
    }

    /// Section for a turn closed before any `Section:` label was seen.
    fn unset_section(&self) -> Section {
        if self.turns.is_empty() {
            Section::Introduction
        } else {
            Section::Conversation
        }
    }
}

/// Scan a full model response into turns.
pub fn parse_turns(text: &str) -> Result<Vec<ConversationTurn>, ParseError> {
    let mut scanner = TurnScanner::new();
    for line in text.lines() {
        scanner.feed_line(line)?;
    }
    Ok(scanner.finish())
}

fn strip_any<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| line.strip_prefix(p))
}

/// `"Étudiant (Genre: female)"` → `("Étudiant", Female)`.
fn parse_speaker(rest: &str) -> Result<(String, Gender), ParseError> {
    let name = rest.split('(').next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(ParseError::MissingSpeaker(rest.to_string()));
    }

    let label = GENDER_TAGS
        .iter()
        .find_map(|tag| rest.split_once(tag).map(|(_, after)| after))
        .map(|after| after.split(')').next().unwrap_or_default().trim())
        .ok_or_else(|| ParseError::MissingGender(rest.to_string()))?;
    let gender =
        Gender::from_label(label).ok_or_else(|| ParseError::UnknownGender(label.to_string()))?;

    Ok((normalize_speaker(name), gender))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::turn::ANNOUNCER;

    const SCRIPT: &str = "\
Section: Introduction
Intervenant: Annonceur (Genre: male)
Texte: Écoutez la conversation suivante et répondez à la question.
---
Section: Conversation
Intervenant: Étudiant (Genre: female)
Texte: Excusez-moi, ce train s'arrête-t-il à la gare de Lyon?
---
Intervenant: Professeur (Genre: male)
Texte: Oui, dans dix minutes.
---
Section: Question
Intervenant: Annonceur (Genre: male)
Texte: Où va le train?
---
";

    #[test]
    fn scans_tagged_script() {
        let turns = parse_turns(SCRIPT).unwrap();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].speaker, ANNOUNCER);
        assert_eq!(turns[0].section, Section::Introduction);
        assert_eq!(turns[1].gender, Gender::Female);
        assert_eq!(turns[2].section, Section::Conversation);
        assert_eq!(turns[3].section, Section::Question);
        assert_eq!(turns[3].text, "Où va le train?");
    }

    #[test]
    fn unset_sections_follow_position_rule() {
        let text = "\
Speaker: announcer (Gender: male)
Text: Écoutez.
Speaker: student (Gender: f)
Text: Bonjour.
Speaker: teacher (Gender: homme)
Text: Salut.
";
        let turns = parse_turns(text).unwrap();
        let sections: Vec<_> = turns.iter().map(|t| t.section.clone()).collect();
        assert_eq!(
            sections,
            [Section::Introduction, Section::Conversation, Section::Conversation]
        );
        assert_eq!(turns[1].speaker, "Étudiant");
        assert_eq!(turns[2].speaker, "Professeur");
    }

    #[test]
    fn first_seen_gender_wins() {
        let text = "\
Intervenant: Annonceur (Genre: male)
Texte: Écoutez.
---
Intervenant: Marie (Genre: female)
Texte: Bonjour.
---
Intervenant: Marie (Genre: male)
Texte: Au revoir.
---
";
        let turns = parse_turns(text).unwrap();
        assert_eq!(turns[1].gender, Gender::Female);
        assert_eq!(turns[2].gender, Gender::Female);
    }

    #[test]
    fn continuation_lines_extend_text() {
        let text = "\
Intervenant: Annonceur (Genre: male)
Texte: Première phrase.
Deuxième phrase.
---
";
        let turns = parse_turns(text).unwrap();
        assert_eq!(turns[0].text, "Première phrase. Deuxième phrase.");
    }

    #[test]
    fn speaker_without_text_is_dropped() {
        let text = "\
Intervenant: Annonceur (Genre: male)
---
Intervenant: Annonceur (Genre: male)
Texte: Écoutez.
";
        assert_eq!(parse_turns(text).unwrap().len(), 1);
    }

    #[test]
    fn malformed_speaker_lines_are_parse_errors() {
        assert_eq!(
            parse_turns("Intervenant: Annonceur"),
            Err(ParseError::MissingGender("Annonceur".into()))
        );
        assert_eq!(
            parse_turns("Intervenant: (Genre: male)"),
            Err(ParseError::MissingSpeaker("(Genre: male)".into()))
        );
        assert_eq!(
            parse_turns("Intervenant: Paul (Genre: neutre)"),
            Err(ParseError::UnknownGender("neutre".into()))
        );
    }
}
