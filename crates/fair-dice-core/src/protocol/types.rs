//! Protocol types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique game session identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Participant in a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// The counterparty who guesses and contributes values
    User,
    /// The committing side
    House,
}

impl Player {
    /// Get the opponent
    pub fn opponent(&self) -> Player {
        match self {
            Player::User => Player::House,
            Player::House => Player::User,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::User => write!(f, "user"),
            Player::House => write!(f, "house"),
        }
    }
}

/// Which step of a session a commit-reveal round belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundKind {
    /// Decides who selects a die first
    FirstMove,
    /// Rolls the die of the given player
    Roll(Player),
}

/// Final game outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    UserWins,
    HouseWins,
    Draw,
}

impl Outcome {
    /// Compare the two final faces
    pub fn from_faces(user: u64, house: u64) -> Self {
        match user.cmp(&house) {
            std::cmp::Ordering::Greater => Outcome::UserWins,
            std::cmp::Ordering::Less => Outcome::HouseWins,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::UserWins => "User wins",
            Outcome::HouseWins => "House wins",
            Outcome::Draw => "Draw",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
