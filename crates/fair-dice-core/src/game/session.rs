//! Game session state machine.
//!
//! A session sequences one game without doing any I/O:
//!
//! 1. The house commits to a bit; the user guesses it. A correct guess lets
//!    the user select a die first.
//! 2. The first mover selects a die, then the other player selects one of the
//!    remaining dice.
//! 3. Each die is rolled with a commit-reveal round: the house commits to a
//!    value, the user contributes a value, and the combine rule maps both to
//!    a face. The house rolls first.
//! 4. The higher face wins.
//!
//! Every step checks that the session is in the phase it expects and
//! returns [`Error::UnexpectedPhase`] without changing state otherwise. A
//! reveal that fails to verify aborts the session.

use super::collection::DiceCollection;
use super::rules::GameConfig;
use crate::crypto::{Opening, PublishedRound, SealedRound};
use crate::dice::Dice;
use crate::error::{Error, Result};
use crate::estimator::{analytic_win_probability, ProbabilityEstimator, ProbabilityTable};
use crate::protocol::{CommitMessage, Outcome, Player, RevealMessage, RoundKind, SessionId};
use crate::random::SecureRandom;
use tracing::{debug, info};

const FIRST_MOVE_RANGE: u64 = 2;

enum Phase {
    FirstMove(PublishedRound),
    Selecting(Player),
    AwaitingRoll(Player),
    Rolling { roller: Player, round: PublishedRound },
    Finished(Outcome),
    Aborted,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::FirstMove(_) => "first move",
            Phase::Selecting(_) => "dice selection",
            Phase::AwaitingRoll(_) => "awaiting roll",
            Phase::Rolling { .. } => "rolling",
            Phase::Finished(_) => "finished",
            Phase::Aborted => "aborted",
        }
    }
}

/// Result of the first-move round
#[derive(Clone, Debug)]
pub struct FirstMoveReport {
    pub reveal: RevealMessage,
    pub guess: u64,
    pub first_mover: Player,
}

/// Result of one die roll
#[derive(Clone, Debug)]
pub struct RollReport {
    pub roller: Player,
    pub reveal: RevealMessage,
    pub user_value: u64,
    pub face_index: usize,
    pub face: u64,
}

/// One game between the user and the house
pub struct GameSession {
    id: SessionId,
    dice: DiceCollection,
    config: GameConfig,
    random: SecureRandom,
    phase: Phase,
    first_mover: Option<Player>,
    user_dice: Option<usize>,
    house_dice: Option<usize>,
    user_face: Option<u64>,
    house_face: Option<u64>,
}

impl GameSession {
    /// Start a session by committing to the first-move bit
    pub fn start(
        dice: DiceCollection,
        config: GameConfig,
        random: SecureRandom,
    ) -> Result<(Self, CommitMessage)> {
        for dice in dice.as_slice() {
            config.combine_rule.modulus(dice)?;
        }
        let id = SessionId::new();
        let (round, commitment) = SealedRound::new(&random, FIRST_MOVE_RANGE)?
            .with_algorithm(config.proof_algorithm)
            .publish();
        info!(session = %id, dice = dice.len(), "started game session");

        let session = Self {
            id,
            dice,
            config,
            random,
            phase: Phase::FirstMove(round),
            first_mover: None,
            user_dice: None,
            house_dice: None,
            user_face: None,
            house_face: None,
        };
        let commit = CommitMessage {
            session_id: id,
            round: RoundKind::FirstMove,
            commitment,
        };
        Ok((session, commit))
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn dice(&self) -> &DiceCollection {
        &self.dice
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn first_mover(&self) -> Option<Player> {
        self.first_mover
    }

    /// Dice index selected by `player`, if any
    pub fn selection(&self, player: Player) -> Option<usize> {
        match player {
            Player::User => self.user_dice,
            Player::House => self.house_dice,
        }
    }

    /// Player whose turn it is to select a die
    pub fn selecting(&self) -> Option<Player> {
        match self.phase {
            Phase::Selecting(player) => Some(player),
            _ => None,
        }
    }

    /// Player whose die is rolled next or is being rolled
    pub fn roller(&self) -> Option<Player> {
        match self.phase {
            Phase::AwaitingRoll(player) | Phase::Rolling { roller: player, .. } => Some(player),
            _ => None,
        }
    }

    /// Range the user's contribution must fall in during a roll
    pub fn roll_range(&self) -> Option<u64> {
        match &self.phase {
            Phase::Rolling { round, .. } => Some(round.range()),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Dice nobody has selected yet
    pub fn available_dice(&self) -> Vec<usize> {
        let taken: Vec<usize> = self.user_dice.into_iter().chain(self.house_dice).collect();
        self.dice.available(&taken)
    }

    /// Estimated win probabilities for the whole dice set
    pub fn help_table(&self) -> ProbabilityTable {
        ProbabilityEstimator::new(self.random.clone())
            .with_trials(self.config.trials)
            .estimate_all(self.dice.as_slice())
    }

    /// Reveal the first-move bit and resolve who selects first
    pub fn guess_first_move(&mut self, guess: u64) -> Result<FirstMoveReport> {
        if !matches!(self.phase, Phase::FirstMove(_)) {
            return Err(self.unexpected("first move"));
        }
        if guess >= FIRST_MOVE_RANGE {
            return Err(Error::InvalidInput {
                input: guess.to_string(),
            });
        }

        let round = match std::mem::replace(&mut self.phase, Phase::Aborted) {
            Phase::FirstMove(round) => round,
            other => {
                self.phase = other;
                return Err(self.unexpected("first move"));
            }
        };
        let commitment = *round.commitment();
        let opening = round.reveal();
        opening.verify_against(&commitment)?;

        let first_mover = if opening.value == guess {
            Player::User
        } else {
            Player::House
        };
        self.first_mover = Some(first_mover);
        self.phase = Phase::Selecting(first_mover);
        info!(session = %self.id, guess, value = opening.value, %first_mover, "resolved first move");

        Ok(FirstMoveReport {
            reveal: self.reveal_message(RoundKind::FirstMove, opening),
            guess,
            first_mover,
        })
    }

    /// Select a die for the user
    pub fn user_selects(&mut self, index: usize) -> Result<()> {
        if !matches!(self.phase, Phase::Selecting(Player::User)) {
            return Err(self.unexpected("user dice selection"));
        }
        if !self.available_dice().contains(&index) {
            return Err(Error::DiceUnavailable { index });
        }
        self.user_dice = Some(index);
        debug!(session = %self.id, index, "user selected dice");
        self.advance_selection(Player::User);
        Ok(())
    }

    /// Select a die for the house and return its index.
    ///
    /// Moving first, the house picks at random. Moving second, it picks the
    /// remaining die with the highest exact win probability against the
    /// user's die.
    pub fn house_selects(&mut self) -> Result<usize> {
        if !matches!(self.phase, Phase::Selecting(Player::House)) {
            return Err(self.unexpected("house dice selection"));
        }
        let available = self.available_dice();
        let index = match self.user_dice.and_then(|user| self.dice.get(user)) {
            Some(user_dice) => best_response(&self.dice, user_dice, &available),
            None => available[self.random.index(available.len())],
        };
        self.house_dice = Some(index);
        debug!(session = %self.id, index, "house selected dice");
        self.advance_selection(Player::House);
        Ok(index)
    }

    fn advance_selection(&mut self, selected: Player) {
        let next = selected.opponent();
        self.phase = if self.selection(next).is_none() {
            Phase::Selecting(next)
        } else {
            Phase::AwaitingRoll(Player::House)
        };
    }

    /// Commit to the house's contribution for the next roll
    pub fn begin_roll(&mut self) -> Result<CommitMessage> {
        let roller = match self.phase {
            Phase::AwaitingRoll(roller) => roller,
            _ => return Err(self.unexpected("awaiting roll")),
        };
        let range = self.config.combine_rule.modulus(self.rolled_dice(roller)?)?;
        let (round, commitment) = SealedRound::new(&self.random, range)?
            .with_algorithm(self.config.proof_algorithm)
            .publish();
        self.phase = Phase::Rolling { roller, round };
        debug!(session = %self.id, %roller, range, "committed roll");

        Ok(CommitMessage {
            session_id: self.id,
            round: RoundKind::Roll(roller),
            commitment,
        })
    }

    /// Add the user's value, reveal the house's value and roll the die
    pub fn contribute_roll(&mut self, user_value: u64) -> Result<RollReport> {
        let (roller, range) = match &self.phase {
            Phase::Rolling { roller, round } => (*roller, round.range()),
            _ => return Err(self.unexpected("rolling")),
        };
        if user_value >= range {
            return Err(Error::InvalidInput {
                input: user_value.to_string(),
            });
        }
        let index = self.selection(roller).ok_or_else(|| self.unexpected("dice selected"))?;
        let dice = self.dice.get(index).ok_or(Error::DiceUnavailable { index })?;
        self.config.combine_rule.modulus(dice)?;

        let round = match std::mem::replace(&mut self.phase, Phase::Aborted) {
            Phase::Rolling { round, .. } => round,
            other => {
                self.phase = other;
                return Err(self.unexpected("rolling"));
            }
        };
        let commitment = *round.commitment();
        let opening = round.reveal();
        opening.verify_against(&commitment)?;

        let face_index = self.config.combine_rule.face_index(opening.value, user_value, dice)?;
        let face = dice.faces()[face_index];
        info!(session = %self.id, %roller, house_value = opening.value, user_value, face, "rolled dice");

        match roller {
            Player::House => {
                self.house_face = Some(face);
                self.phase = Phase::AwaitingRoll(Player::User);
            }
            Player::User => {
                self.user_face = Some(face);
                let outcome = Outcome::from_faces(face, self.house_face.unwrap_or_default());
                info!(session = %self.id, %outcome, "game finished");
                self.phase = Phase::Finished(outcome);
            }
        }

        Ok(RollReport {
            roller,
            reveal: self.reveal_message(RoundKind::Roll(roller), opening),
            user_value,
            face_index,
            face,
        })
    }

    /// Face rolled for `player`, once rolled
    pub fn face(&self, player: Player) -> Option<u64> {
        match player {
            Player::User => self.user_face,
            Player::House => self.house_face,
        }
    }

    fn rolled_dice(&self, roller: Player) -> Result<&Dice> {
        self.selection(roller)
            .and_then(|index| self.dice.get(index))
            .ok_or(Error::UnexpectedPhase {
                expected: "dice selected",
                actual: self.phase.name(),
            })
    }

    fn reveal_message(&self, round: RoundKind, opening: Opening) -> RevealMessage {
        RevealMessage {
            session_id: self.id,
            round,
            opening,
        }
    }

    fn unexpected(&self, expected: &'static str) -> Error {
        Error::UnexpectedPhase {
            expected,
            actual: self.phase.name(),
        }
    }
}

fn best_response(dice: &DiceCollection, against: &Dice, available: &[usize]) -> usize {
    let mut best = available[0];
    let mut best_probability = f64::MIN;
    for &index in available {
        if let Some(candidate) = dice.get(index) {
            let probability = analytic_win_probability(candidate, against);
            if probability > best_probability {
                best = index;
                best_probability = probability;
            }
        }
    }
    best
}
