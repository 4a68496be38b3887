//! Cryptographic primitives for provably fair rounds.
//!
//! This module provides:
//! - ProofKey, the per-round secret HMAC key
//! - Proof and Commitment, the published keyed hash of a secret value
//! - SealedRound, PublishedRound and Opening for the commit-reveal sequence

mod commitment;
mod key;
mod round;

pub use commitment::{Commitment, Proof, ProofAlgorithm, PROOF_LEN};
pub use key::{ProofKey, KEY_LEN};
pub use round::{generate_value, Opening, PublishedRound, SealedRound};

use crate::error::Error;

fn decode_hex32(s: &str) -> Result<[u8; 32], Error> {
    let bytes = hex::decode(s.trim()).map_err(|e| Error::InvalidEncoding(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| Error::InvalidEncoding(format!("expected 32 bytes, got {}", bytes.len())))
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        hex::encode(bytes).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let hex_str = String::deserialize(d)?;
        super::decode_hex32(&hex_str).map_err(serde::de::Error::custom)
    }
}
