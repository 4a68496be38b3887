//! The dice set a game is played with.

use crate::dice::Dice;
use crate::error::{Error, Result};
use crate::random::SecureRandom;

/// Fewest dice a game can be played with
pub const MIN_DICE: usize = 3;

/// Ordered dice set; indices identify dice for the whole session
#[derive(Clone, Debug)]
pub struct DiceCollection {
    dice: Vec<Dice>,
}

impl DiceCollection {
    pub fn new(dice: Vec<Dice>) -> Result<Self> {
        if dice.len() < MIN_DICE {
            return Err(Error::InsufficientDistributions {
                required: MIN_DICE,
                actual: dice.len(),
            });
        }
        Ok(Self { dice })
    }

    /// Parse one comma-separated face list per die
    pub fn parse<I, S>(configs: I, random: &SecureRandom) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dice = configs
            .into_iter()
            .map(|config| Dice::parse(config.as_ref(), random.clone()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(dice)
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Dice> {
        self.dice.get(index)
    }

    pub fn as_slice(&self) -> &[Dice] {
        &self.dice
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Dice)> {
        self.dice.iter().enumerate()
    }

    /// Indices not in `taken`, in order
    pub fn available(&self, taken: &[usize]) -> Vec<usize> {
        (0..self.dice.len()).filter(|i| !taken.contains(i)).collect()
    }
}
