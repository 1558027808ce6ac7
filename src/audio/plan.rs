//! Ordering of speech and silence clips for a turn sequence.

use crate::config::PauseConfig;
use crate::conversation::ConversationTurn;

/// Kind of silence inserted between speech clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pause {
    /// Before the first turn of a new section.
    Section,
    /// Before a different speaker within the same section.
    Speaker,
    /// After every turn except the last.
    Sentence,
}

impl Pause {
    pub fn duration_ms(self, pauses: &PauseConfig) -> u64 {
        match self {
            Pause::Section => pauses.section_ms,
            Pause::Speaker => pauses.speaker_ms,
            Pause::Sentence => pauses.sentence_ms,
        }
    }
}

/// One clip of the final audio, in playback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Synthesized speech for the turn at this index.
    Speech(usize),
    Silence(Pause),
}

/// Interleave speech with pauses.
///
/// A section change inserts a section pause (never before the first turn)
/// and resets the speaker, so it is never followed by a speaker pause as
/// well.
pub fn plan_segments(turns: &[ConversationTurn]) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(turns.len() * 3);
    let mut current_section = None;
    let mut current_speaker: Option<&str> = None;

    for (i, turn) in turns.iter().enumerate() {
        if current_section != Some(&turn.section) {
            if i > 0 {
                segments.push(Segment::Silence(Pause::Section));
            }
            current_section = Some(&turn.section);
            current_speaker = None;
        } else if current_speaker.is_some_and(|s| s != turn.speaker) {
            segments.push(Segment::Silence(Pause::Speaker));
        }
        current_speaker = Some(turn.speaker.as_str());

        segments.push(Segment::Speech(i));
        if i + 1 < turns.len() {
            segments.push(Segment::Silence(Pause::Sentence));
        }
    }
    segments
}
