//! Proof and Commitment for the commit-reveal scheme.

use super::key::ProofKey;
use crate::error::Error;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::Sha3_256;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

/// Length of a proof in bytes
pub const PROOF_LEN: usize = 32;

/// Keyed hash used to compute proofs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofAlgorithm {
    /// HMAC over SHA3-256
    #[default]
    HmacSha3_256,
    /// HMAC over SHA-256
    HmacSha256,
}

impl ProofAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofAlgorithm::HmacSha3_256 => "HMAC-SHA3-256",
            ProofAlgorithm::HmacSha256 => "HMAC-SHA256",
        }
    }
}

impl fmt::Display for ProofAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof = HMAC(key, decimal(value))
///
/// `key` is the raw [`ProofKey`] bytes, not its hex text, and the message is
/// the value in base 10 without padding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proof(#[serde(with = "super::hex_bytes")] [u8; PROOF_LEN]);

impl Proof {
    /// Compute the proof of `value` under `key` with the default algorithm
    pub fn compute(value: u64, key: &ProofKey) -> Self {
        Self::compute_with(ProofAlgorithm::default(), value, key)
    }

    /// Compute the proof of `value` under `key`
    pub fn compute_with(algorithm: ProofAlgorithm, value: u64, key: &ProofKey) -> Self {
        let message = value.to_string();
        let bytes = match algorithm {
            ProofAlgorithm::HmacSha3_256 => hmac_sha3_256(key.as_bytes(), message.as_bytes()),
            ProofAlgorithm::HmacSha256 => hmac_sha256(key.as_bytes(), message.as_bytes()),
        };
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; PROOF_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; PROOF_LEN] {
        &self.0
    }

    /// Verify that the given value and key produce this proof (default algorithm)
    pub fn verify(&self, value: u64, key: &ProofKey) -> bool {
        self.verify_with(ProofAlgorithm::default(), value, key)
    }

    /// Verify that the given value and key produce this proof.
    ///
    /// The digest comparison runs in constant time.
    pub fn verify_with(&self, algorithm: ProofAlgorithm, value: u64, key: &ProofKey) -> bool {
        let expected = Self::compute_with(algorithm, value, key);
        bool::from(expected.0.ct_eq(&self.0))
    }
}

fn hmac_sha3_256(key: &[u8], message: &[u8]) -> [u8; PROOF_LEN] {
    let mut mac = Hmac::<Sha3_256>::new_from_slice(key).expect("HMAC takes keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; PROOF_LEN] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC takes keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

impl fmt::Debug for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proof({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Proof {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::decode_hex32(s).map(Self)
    }
}

/// What the committer publishes before revealing: the range the secret was
/// drawn from and the proof binding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub range: u64,
    pub proof: Proof,
    #[serde(default)]
    pub algorithm: ProofAlgorithm,
}

impl Commitment {
    /// Check a revealed value and key against this commitment.
    ///
    /// A value outside the published range never verifies.
    pub fn verify(&self, value: u64, key: &ProofKey) -> bool {
        value < self.range && self.proof.verify_with(self.algorithm, value, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SecureRandom;
    use proptest::prelude::*;

    fn random_key() -> ProofKey {
        ProofKey::generate(&SecureRandom::os())
    }

    #[test]
    fn test_proof_verification() {
        let key = random_key();
        let proof = Proof::compute(3, &key);

        assert!(proof.verify(3, &key));
    }

    #[test]
    fn test_verifier_keys_with_decoded_hex() {
        let key = random_key();
        let proof = Proof::compute(4, &key);
        let published = key.to_string();

        let decoded: ProofKey = published.parse().unwrap();
        assert!(proof.verify(4, &decoded));
        assert_ne!(&hmac_sha3_256(published.as_bytes(), b"4"), proof.as_bytes());
        assert_eq!(&hmac_sha3_256(decoded.as_bytes(), b"4"), proof.as_bytes());
    }

    #[test]
    fn test_proof_is_deterministic() {
        let key = ProofKey::from_bytes([5u8; 32]);

        assert_eq!(Proof::compute(42, &key), Proof::compute(42, &key));
    }

    #[test]
    fn test_different_values_different_proofs() {
        let key = random_key();

        assert_ne!(Proof::compute(0, &key), Proof::compute(1, &key));
    }

    #[test]
    fn test_different_keys_different_proofs() {
        assert_ne!(Proof::compute(1, &random_key()), Proof::compute(1, &random_key()));
    }

    #[test]
    fn test_wrong_value_fails_verification() {
        let key = random_key();
        let proof = Proof::compute(1, &key);

        assert!(!proof.verify(0, &key));
    }

    #[test]
    fn test_wrong_key_fails_verification() {
        let proof = Proof::compute(1, &random_key());

        assert!(!proof.verify(1, &random_key()));
    }

    #[test]
    fn test_algorithms_are_not_interchangeable() {
        let key = random_key();
        let sha3 = Proof::compute_with(ProofAlgorithm::HmacSha3_256, 7, &key);
        let sha2 = Proof::compute_with(ProofAlgorithm::HmacSha256, 7, &key);

        assert_ne!(sha3, sha2);
        assert!(sha2.verify_with(ProofAlgorithm::HmacSha256, 7, &key));
        assert!(!sha2.verify_with(ProofAlgorithm::HmacSha3_256, 7, &key));
    }

    #[test]
    fn test_proof_text_is_64_lowercase_hex() {
        let text = Proof::compute(12, &random_key()).to_string();

        assert_eq!(text.len(), 64);
        assert!(text.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        assert!(text.parse::<Proof>().is_ok());
    }

    #[test]
    fn test_malformed_proof_text() {
        assert!(matches!("zz".parse::<Proof>(), Err(Error::InvalidEncoding(_))));
        assert!(matches!("abcd".parse::<Proof>(), Err(Error::InvalidEncoding(_))));
    }

    #[test]
    fn test_commitment_rejects_out_of_range_value() {
        let key = random_key();
        let commitment = Commitment {
            range: 2,
            proof: Proof::compute(5, &key),
            algorithm: ProofAlgorithm::default(),
        };

        assert!(!commitment.verify(5, &key));
    }

    #[test]
    fn test_single_byte_mutations_change_proof() {
        let random = SecureRandom::from_seed([11u8; 32]);
        let mut matches = 0;

        for _ in 0..128 {
            let key = ProofKey::generate(&random);
            let value = random.below(1_000_000);
            let proof = Proof::compute(value, &key);

            let mut mutated = *key.as_bytes();
            let position = random.index(mutated.len());
            mutated[position] ^= 1 + random.below(255) as u8;
            if Proof::compute(value, &ProofKey::from_bytes(mutated)) == proof {
                matches += 1;
            }
            if Proof::compute(value + 1, &key) == proof {
                matches += 1;
            }
        }

        assert_eq!(matches, 0);
    }

    proptest! {
        #[test]
        fn prop_commit_then_verify(value in any::<u64>(), key in any::<[u8; 32]>()) {
            let key = ProofKey::from_bytes(key);
            prop_assert!(Proof::compute(value, &key).verify(value, &key));
        }

        #[test]
        fn prop_other_value_fails(value in any::<u64>(), other in any::<u64>(), key in any::<[u8; 32]>()) {
            prop_assume!(value != other);
            let key = ProofKey::from_bytes(key);
            prop_assert!(!Proof::compute(value, &key).verify(other, &key));
        }

        #[test]
        fn prop_other_key_fails(value in any::<u64>(), key in any::<[u8; 32]>(), other in any::<[u8; 32]>()) {
            prop_assume!(key != other);
            let proof = Proof::compute(value, &ProofKey::from_bytes(key));
            prop_assert!(!proof.verify(value, &ProofKey::from_bytes(other)));
        }
    }
}
