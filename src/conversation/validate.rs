use crate::conversation::turn::ConversationTurn;
use crate::error::ValidationError;

/// Check the structural rules every turn sequence must satisfy.
///
/// Unknown sections are tolerated with a warning.
pub fn check(turns: &[ConversationTurn]) -> Result<(), ValidationError> {
    let first = turns.first().ok_or(ValidationError::NoTurns)?;
    if !first.is_announcer() {
        return Err(ValidationError::FirstSpeakerNotAnnouncer(first.speaker.clone()));
    }

    for (i, turn) in turns.iter().enumerate() {
        if turn.speaker.trim().is_empty() {
            return Err(ValidationError::EmptySpeaker(i));
        }
        if turn.text.trim().is_empty() {
            return Err(ValidationError::EmptyText(i));
        }
        if !turn.section.is_known() {
            log::warn!("conversation: turn {i} has unknown section {:?}", turn.section.to_string());
        }
    }
    Ok(())
}

/// `true` when [`check`] passes; the failure reason is logged otherwise.
pub fn validate(turns: &[ConversationTurn]) -> bool {
    match check(turns) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("conversation: invalid turns: {e}");
            false
        }
    }
}
