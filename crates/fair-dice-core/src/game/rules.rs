//! Game configuration and the rule that turns two contributions into a face.

use crate::crypto::ProofAlgorithm;
use crate::dice::Dice;
use crate::error::{Error, Result};
use crate::estimator::DEFAULT_TRIALS;
use serde::{Deserialize, Serialize};

/// How the house's committed value and the user's value pick a face.
///
/// Both values are drawn from `[0, modulus)` and the face index is
/// `(house + user) mod modulus`, reduced again by the face count. A fixed
/// modulus must be a multiple of the face count so every face stays equally
/// likely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineRule {
    /// Modulus equals the rolled die's face count
    #[default]
    FaceCount,
    /// Fixed modulus regardless of the die
    Fixed(u64),
}

impl CombineRule {
    /// Range both parties draw from when rolling `dice`
    pub fn modulus(&self, dice: &Dice) -> Result<u64> {
        let faces = dice.face_count();
        match *self {
            CombineRule::FaceCount => Ok(faces as u64),
            CombineRule::Fixed(modulus) if modulus > 0 && modulus % faces as u64 == 0 => Ok(modulus),
            CombineRule::Fixed(modulus) => Err(Error::InvalidModulus { modulus, faces }),
        }
    }

    /// Face index selected by the two contributions
    pub fn face_index(&self, house: u64, user: u64, dice: &Dice) -> Result<usize> {
        let modulus = u128::from(self.modulus(dice)?);
        let sum = (u128::from(house) + u128::from(user)) % modulus;
        Ok((sum % dice.face_count() as u128) as usize)
    }
}

/// Settings for one game session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Simulated rolls per pair for the help table
    pub trials: u32,
    pub combine_rule: CombineRule,
    pub proof_algorithm: ProofAlgorithm,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            combine_rule: CombineRule::default(),
            proof_algorithm: ProofAlgorithm::default(),
        }
    }
}
