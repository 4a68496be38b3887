//! Fair Dice Demo
//!
//! Plays one complete game between the house and a scripted player and logs
//! every published commitment, reveal and verification.
//!
//! Configuration (environment):
//! - `FAIR_DICE_SET` - dice separated by `;` or whitespace, faces by `,`
//!   (default: the intransitive set `2,2,4,4,9,9 1,1,6,6,8,8 3,3,5,5,7,7`)
//! - `FAIR_DICE_TRIALS` - simulated rolls per pair for the help table
//! - `FAIR_DICE_MODULUS` - `faces` or a fixed modulus for combining rolls;
//!   must be a multiple of every die's face count
//! - `FAIR_DICE_SEED` - 64 hex characters; replaces the OS source with a
//!   reproducible one

mod render;

use anyhow::{bail, Context, Result};
use fair_dice_core::{
    estimator::DEFAULT_TRIALS,
    game::{parse_choice, Choice, CombineRule, DiceCollection, GameConfig, GameSession},
    protocol::{CommitMessage, Player, RevealMessage},
    random::SecureRandom,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_SET: &str = "2,2,4,4,9,9 1,1,6,6,8,8 3,3,5,5,7,7";

// Each value in the range becomes a menu option
const MAX_MENU_MODULUS: u64 = 100;

struct DemoConfig {
    dice_set: String,
    game: GameConfig,
    seed: Option<[u8; 32]>,
}

impl DemoConfig {
    fn from_env() -> Result<Self> {
        let dice_set = std::env::var("FAIR_DICE_SET").unwrap_or_else(|_| DEFAULT_SET.to_string());

        let trials = match std::env::var("FAIR_DICE_TRIALS") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("FAIR_DICE_TRIALS is not a number: {}", value))?,
            Err(_) => DEFAULT_TRIALS,
        };

        let combine_rule = match std::env::var("FAIR_DICE_MODULUS").as_deref() {
            Err(_) | Ok("faces") => CombineRule::FaceCount,
            Ok(value) => {
                let modulus: u64 = value
                    .parse()
                    .with_context(|| format!("FAIR_DICE_MODULUS is not a number: {}", value))?;
                if modulus == 0 || modulus > MAX_MENU_MODULUS {
                    bail!("FAIR_DICE_MODULUS must be between 1 and {}", MAX_MENU_MODULUS);
                }
                CombineRule::Fixed(modulus)
            }
        };

        let seed = match std::env::var("FAIR_DICE_SEED") {
            Ok(value) => {
                let bytes = hex::decode(value.trim()).context("FAIR_DICE_SEED is not hex")?;
                let seed: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("FAIR_DICE_SEED must be 32 bytes"))?;
                Some(seed)
            }
            Err(_) => None,
        };

        Ok(Self {
            dice_set,
            game: GameConfig {
                trials,
                combine_rule,
                ..GameConfig::default()
            },
            seed,
        })
    }
}

/// Stands in for a human at the keyboard: produces raw menu input and
/// checks every reveal against what was published.
struct ScriptedPlayer {
    random: SecureRandom,
    asked_for_help: bool,
}

impl ScriptedPlayer {
    fn new(random: SecureRandom) -> Self {
        Self {
            random,
            asked_for_help: false,
        }
    }

    /// Raw input for a menu of `count` numbered options
    fn answer(&mut self, count: u64, help_offered: bool) -> String {
        if help_offered && !self.asked_for_help {
            self.asked_for_help = true;
            return "?".to_string();
        }
        self.random.below(count).to_string()
    }

    fn check(&self, commit: &CommitMessage, reveal: &RevealMessage) -> bool {
        let verified = reveal.verify(commit);
        if verified {
            info!(
                proof = %commit.commitment.proof,
                key = %reveal.opening.key,
                value = reveal.opening.value,
                "player verified reveal"
            );
        } else {
            warn!(proof = %commit.commitment.proof, "player could not verify reveal");
        }
        verified
    }
}

/// Ask the player until the answer parses, showing help on request
fn prompt(session: &GameSession, player: &mut ScriptedPlayer, valid: &[Choice]) -> Result<Choice> {
    let count = valid.iter().filter(|c| matches!(c, Choice::Index(_))).count() as u64;
    let help_offered = valid.contains(&Choice::Help);
    loop {
        let raw = player.answer(count, help_offered);
        match parse_choice(&raw, valid) {
            Ok(Choice::Help) => {
                let table = session.help_table();
                info!("Probability of the win for the user:\n{}", render::table(&table, session.dice()));
            }
            Ok(choice) => return Ok(choice),
            Err(e) => warn!("{}; try again", e),
        }
    }
}

fn index_of(choice: Choice) -> Result<u64> {
    match choice {
        Choice::Index(index) => Ok(index),
        Choice::Exit => bail!("player left the game"),
        Choice::Help => bail!("help is not an answer"),
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = DemoConfig::from_env()?;
    let random = match config.seed {
        Some(seed) => {
            warn!("Using a seeded random source; commitments are only as secret as the seed");
            SecureRandom::from_seed(seed)
        }
        None => SecureRandom::os(),
    };

    let configs: Vec<&str> = config
        .dice_set
        .split(|c: char| c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    let dice = DiceCollection::parse(&configs, &random).context("invalid dice set")?;
    for (index, die) in dice.iter() {
        config
            .game
            .combine_rule
            .modulus(die)
            .with_context(|| format!("FAIR_DICE_MODULUS does not fit dice {} {}", index, die))?;
        info!("Dice {}: {}", index, die);
    }

    let mut player = ScriptedPlayer::new(random.fork());
    let (mut session, commit) = GameSession::start(dice, config.game, random)?;
    info!("Session {}", session.id());

    // First move
    info!(
        "I selected a random value in the range 0..1 (HMAC={}).",
        commit.commitment.proof
    );
    info!("Published: {}", serde_json::to_string(&commit)?);
    let guess = index_of(prompt(&session, &mut player, &Choice::menu(2, true))?)?;
    info!("Player guessed {}", guess);
    let report = session.guess_first_move(guess)?;
    info!(
        "My selection: {} (KEY={}).",
        report.reveal.opening.value, report.reveal.opening.key
    );
    if !player.check(&commit, &report.reveal) {
        bail!("first move reveal did not verify");
    }
    info!("{} makes the first move.", report.first_mover);

    // Dice selection
    while let Some(selecting) = session.selecting() {
        match selecting {
            Player::House => {
                let index = session.house_selects()?;
                info!("House selected dice {} {}", index, render::dice_at(session.dice(), index));
            }
            Player::User => {
                let available = session.available_dice();
                let choice = prompt(&session, &mut player, &Choice::menu(available.len() as u64, true))?;
                let position = usize::try_from(index_of(choice)?)?;
                let index = available[position];
                session.user_selects(index)?;
                info!("Player selected dice {} {}", index, render::dice_at(session.dice(), index));
            }
        }
    }

    // Rolls
    while session.outcome().is_none() {
        let commit = session.begin_roll()?;
        let roller = session.roller().context("no roller after commit")?;
        let range = session.roll_range().context("no roll range after commit")?;
        info!(
            "Rolling for {}: I selected a random value in the range 0..{} (HMAC={}).",
            roller,
            range - 1,
            commit.commitment.proof
        );

        let contribution = index_of(prompt(&session, &mut player, &Choice::menu(range, false))?)?;
        let roll = session.contribute_roll(contribution)?;
        info!(
            "My number is {} (KEY={}). The result is {} + {} = {} (mod {}).",
            roll.reveal.opening.value,
            roll.reveal.opening.key,
            roll.reveal.opening.value,
            contribution,
            roll.face_index,
            range
        );
        if !player.check(&commit, &roll.reveal) {
            bail!("roll reveal did not verify");
        }
        info!("{} rolled {}", roller, roll.face);
    }

    if let Some(outcome) = session.outcome() {
        info!(
            "{} ({} vs {})",
            outcome,
            session.face(Player::User).unwrap_or_default(),
            session.face(Player::House).unwrap_or_default()
        );
    }
    Ok(())
}
