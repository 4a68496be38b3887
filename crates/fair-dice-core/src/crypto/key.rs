//! Per-round proof keys.

use crate::error::Error;
use crate::random::SecureRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a proof key in bytes (256 bits)
pub const KEY_LEN: usize = 32;

/// Secret HMAC key for one commit-reveal round.
///
/// The MAC is keyed with the 32 raw bytes. The published text form is their
/// hex encoding, so a verifier must hex-decode it before keying the HMAC;
/// using the 64 hex characters as the key gives a different proof.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofKey(#[serde(with = "super::hex_bytes")] [u8; KEY_LEN]);

impl ProofKey {
    /// Generate a fresh key from the secure source
    pub fn generate(random: &SecureRandom) -> Self {
        let mut bytes = [0u8; KEY_LEN];
        random.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for ProofKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofKey({}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ProofKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ProofKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::decode_hex32(s).map(Self)
    }
}
