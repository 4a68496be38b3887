//! One-shot commit-reveal rounds.
//!
//! A round moves through three states and cannot go back:
//!
//! 1. [`SealedRound`]: key and value are drawn, nothing is public yet.
//! 2. [`PublishedRound`]: the [`Commitment`] has been handed out; the value
//!    and key are still withheld.
//! 3. [`Opening`]: the value and key are revealed and the round is consumed.
//!
//! Only a published round can be revealed, and revealing consumes it, so a
//! reveal before publication or a second reveal with different data does not
//! type-check.

use super::commitment::{Commitment, Proof, ProofAlgorithm};
use super::key::ProofKey;
use crate::error::{Error, Result};
use crate::random::SecureRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Draw a value uniformly from `[0, range)`
pub fn generate_value(random: &SecureRandom, range: u64) -> Result<u64> {
    if range == 0 {
        return Err(Error::InvalidRange { range });
    }
    Ok(random.below(range))
}

/// A drawn but not yet published secret
pub struct SealedRound {
    range: u64,
    value: u64,
    key: ProofKey,
    algorithm: ProofAlgorithm,
}

impl SealedRound {
    /// Generate a fresh key, then a value in `[0, range)`
    pub fn new(random: &SecureRandom, range: u64) -> Result<Self> {
        if range == 0 {
            return Err(Error::InvalidRange { range });
        }
        let key = ProofKey::generate(random);
        let value = generate_value(random, range)?;
        Ok(Self {
            range,
            value,
            key,
            algorithm: ProofAlgorithm::default(),
        })
    }

    /// Seal a known value and key
    pub fn from_parts(value: u64, key: ProofKey, range: u64) -> Result<Self> {
        if range == 0 {
            return Err(Error::InvalidRange { range });
        }
        if value >= range {
            return Err(Error::ValueOutOfRange { value, range });
        }
        Ok(Self {
            range,
            value,
            key,
            algorithm: ProofAlgorithm::default(),
        })
    }

    /// Use a different keyed hash for the proof
    pub fn with_algorithm(mut self, algorithm: ProofAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn range(&self) -> u64 {
        self.range
    }

    /// Compute the proof and move to the published state
    pub fn publish(self) -> (PublishedRound, Commitment) {
        let commitment = Commitment {
            range: self.range,
            proof: Proof::compute_with(self.algorithm, self.value, &self.key),
            algorithm: self.algorithm,
        };
        debug!(range = self.range, proof = %commitment.proof, "published commitment");

        let round = PublishedRound {
            commitment,
            value: self.value,
            key: self.key,
        };
        (round, commitment)
    }
}

impl fmt::Debug for SealedRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealedRound(range={})", self.range)
    }
}

/// A round whose commitment is public and whose secret is still withheld
pub struct PublishedRound {
    commitment: Commitment,
    value: u64,
    key: ProofKey,
}

impl PublishedRound {
    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    pub fn range(&self) -> u64 {
        self.commitment.range
    }

    /// Reveal the value and key, consuming the round
    pub fn reveal(self) -> Opening {
        debug!(range = self.commitment.range, value = self.value, "revealed round");
        Opening {
            value: self.value,
            key: self.key,
        }
    }
}

impl fmt::Debug for PublishedRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublishedRound({:?})", self.commitment)
    }
}

/// Revealed value and key of a finished round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub value: u64,
    pub key: ProofKey,
}

impl Opening {
    /// Check this opening against a published commitment
    pub fn verify(&self, commitment: &Commitment) -> bool {
        commitment.verify(self.value, &self.key)
    }

    /// Like [`Opening::verify`], but as a result the caller can propagate
    pub fn verify_against(&self, commitment: &Commitment) -> Result<()> {
        if self.verify(commitment) {
            Ok(())
        } else {
            warn!(proof = %commitment.proof, value = self.value, "opening does not match commitment");
            Err(Error::VerificationFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_range_is_rejected() {
        let random = SecureRandom::os();

        assert_eq!(generate_value(&random, 0), Err(Error::InvalidRange { range: 0 }));
        assert!(matches!(
            SealedRound::new(&random, 0),
            Err(Error::InvalidRange { range: 0 })
        ));
    }

    #[test]
    fn test_values_stay_in_range() {
        let random = SecureRandom::os();
        for range in [1u64, 2, 3, 6, 7, 100, u64::MAX] {
            for _ in 0..200 {
                assert!(generate_value(&random, range).unwrap() < range);
            }
        }
    }

    #[test]
    fn test_values_are_roughly_uniform() {
        const RANGE: u64 = 6;
        const DRAWS: usize = 60_000;

        let random = SecureRandom::from_seed([21u8; 32]);
        let mut counts = [0usize; RANGE as usize];
        for _ in 0..DRAWS {
            counts[generate_value(&random, RANGE).unwrap() as usize] += 1;
        }

        let expected = DRAWS as f64 / RANGE as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();

        // 5 degrees of freedom; 20.5 is the 0.999 quantile
        assert!(chi_square < 20.5, "chi-square {} for {:?}", chi_square, counts);
    }

    #[test]
    fn test_publish_then_reveal_verifies() {
        let random = SecureRandom::os();
        let (round, commitment) = SealedRound::new(&random, 2).unwrap().publish();

        assert_eq!(round.range(), 2);
        let opening = round.reveal();

        assert!(opening.value < 2);
        assert!(opening.verify(&commitment));
        assert_eq!(opening.verify_against(&commitment), Ok(()));
    }

    #[test]
    fn test_tampered_opening_fails() {
        let key = ProofKey::from_bytes([8u8; 32]);
        let (round, commitment) = SealedRound::from_parts(1, key, 2).unwrap().publish();

        let mut opening = round.reveal();
        opening.value = 0;

        assert!(!opening.verify(&commitment));
        assert_eq!(opening.verify_against(&commitment), Err(Error::VerificationFailure));
    }

    #[test]
    fn test_from_parts_validates_value() {
        let key = ProofKey::from_bytes([0u8; 32]);

        assert!(matches!(
            SealedRound::from_parts(2, key.clone(), 2),
            Err(Error::ValueOutOfRange { value: 2, range: 2 })
        ));
        assert!(matches!(
            SealedRound::from_parts(0, key, 0),
            Err(Error::InvalidRange { range: 0 })
        ));
    }

    #[test]
    fn test_algorithm_travels_with_commitment() {
        let key = ProofKey::from_bytes([2u8; 32]);
        let (round, commitment) = SealedRound::from_parts(4, key, 6)
            .unwrap()
            .with_algorithm(ProofAlgorithm::HmacSha256)
            .publish();

        assert_eq!(commitment.algorithm, ProofAlgorithm::HmacSha256);
        assert!(round.reveal().verify(&commitment));
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = ProofKey::from_bytes([1u8; 32]);
        let sealed = SealedRound::from_parts(3, key, 6).unwrap();

        assert_eq!(format!("{:?}", sealed), "SealedRound(range=6)");
    }
}
