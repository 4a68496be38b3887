//! Protocol messages.

use crate::crypto::{Commitment, Opening};
use crate::protocol::{RoundKind, SessionId};
use serde::{Deserialize, Serialize};

/// Published before the counterparty acts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    pub session_id: SessionId,
    pub round: RoundKind,
    pub commitment: Commitment,
}

/// Sent once the counterparty has acted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealMessage {
    pub session_id: SessionId,
    pub round: RoundKind,
    pub opening: Opening,
}

impl RevealMessage {
    /// Check that this reveal belongs to `commit` and opens it
    pub fn verify(&self, commit: &CommitMessage) -> bool {
        self.session_id == commit.session_id
            && self.round == commit.round
            && self.opening.verify(&commit.commitment)
    }
}
