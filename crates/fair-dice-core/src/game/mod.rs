//! Game orchestration over the fair-round, dice and estimator primitives.

mod choice;
mod collection;
mod rules;
mod session;

pub use choice::{parse_choice, Choice};
pub use collection::{DiceCollection, MIN_DICE};
pub use rules::{CombineRule, GameConfig};
pub use session::{FirstMoveReport, GameSession, RollReport};
