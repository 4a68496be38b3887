//! Fair Dice Core Library
//!
//! This crate provides the commit-reveal protocol, dice, and win probability
//! estimation behind a provably fair dice game, plus a medium-independent
//! game session that sequences them.

pub mod crypto;
pub mod dice;
pub mod error;
pub mod estimator;
pub mod game;
pub mod protocol;
pub mod random;

pub use crypto::{Commitment, Opening, Proof, ProofAlgorithm, ProofKey, PublishedRound, SealedRound};
pub use dice::Dice;
pub use error::{Error, Result};
pub use estimator::{ProbabilityEntry, ProbabilityEstimator, ProbabilityTable};
pub use game::{parse_choice, Choice, CombineRule, DiceCollection, GameConfig, GameSession};
pub use protocol::{CommitMessage, Outcome, Player, RevealMessage, RoundKind, SessionId};
pub use random::SecureRandom;
