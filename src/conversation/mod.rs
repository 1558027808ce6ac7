//! Conversion of question records into ordered speaker turns.
//!
//! * [`ConversationParser`] — prompts the model for a tagged script and
//!   retries until it scans and validates.
//! * [`parse_turns`] / [`TurnScanner`] — the line scanner for that script.
//! * [`validate`] / [`check`] — structural rules on a turn sequence.

pub mod parser;
pub mod prompt;
pub mod scanner;
pub mod turn;
pub mod validate;

pub use parser::ConversationParser;
pub use scanner::{parse_turns, GenderRegistry, TurnScanner};
pub use turn::{is_announcer, normalize_speaker, ConversationTurn, Gender, Section, ANNOUNCER};
pub use validate::{check, validate};
