//! Error types for the fair dice core.

use thiserror::Error;

/// Errors from fair dice operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid range {range}: range must be positive")]
    InvalidRange { range: u64 },

    #[error("Value {value} is outside the range 0..{range}")]
    ValueOutOfRange { value: u64, range: u64 },

    #[error("Invalid dice configuration: {0}")]
    InvalidDice(String),

    #[error("At least {required} dice are required, got {actual}")]
    InsufficientDistributions { required: usize, actual: usize },

    #[error("Modulus {modulus} is not a positive multiple of the face count {faces}")]
    InvalidModulus { modulus: u64, faces: usize },

    #[error("Invalid input: {input:?}")]
    InvalidInput { input: String },

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Dice {index} is not available")]
    DiceUnavailable { index: usize },

    #[error("Unexpected phase: expected {expected}, session is in {actual}")]
    UnexpectedPhase {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Verification failed: revealed value and key do not match the proof")]
    VerificationFailure,
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
