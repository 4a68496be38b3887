//! Protocol types and messages.

mod messages;
mod types;

pub use messages::{CommitMessage, RevealMessage};
pub use types::{Outcome, Player, RoundKind, SessionId};
