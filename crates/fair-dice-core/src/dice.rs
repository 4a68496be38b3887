//! Dice: immutable discrete distributions sampled uniformly by face index.

use crate::error::{Error, Result};
use crate::random::SecureRandom;
use std::fmt;

/// A die with an ordered, non-empty list of non-negative faces.
///
/// Sampling picks a face index uniformly, so repeated face values count once
/// per occurrence.
#[derive(Clone)]
pub struct Dice {
    faces: Vec<u64>,
    random: SecureRandom,
}

impl Dice {
    /// Create a die from its faces
    pub fn new(faces: Vec<u64>, random: SecureRandom) -> Result<Self> {
        if faces.is_empty() {
            return Err(Error::InvalidDice("a die needs at least one face".to_string()));
        }
        Ok(Self { faces, random })
    }

    /// Create a die from signed faces, rejecting negative values
    pub fn from_signed(faces: &[i64], random: SecureRandom) -> Result<Self> {
        let faces = faces
            .iter()
            .map(|&face| {
                u64::try_from(face)
                    .map_err(|_| Error::InvalidDice(format!("face {} is negative", face)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(faces, random)
    }

    /// Parse a comma-separated face list such as `1,2,3,4,5,6`
    pub fn parse(config: &str, random: SecureRandom) -> Result<Self> {
        let faces = config
            .split(',')
            .map(|item| parse_face(item.trim()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(faces, random)
    }

    pub fn faces(&self) -> &[u64] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, index: usize) -> Option<u64> {
        self.faces.get(index).copied()
    }

    /// Roll the die with its own random source
    pub fn sample(&self) -> u64 {
        self.sample_with(&self.random)
    }

    /// Roll the die with a caller-owned random source
    pub fn sample_with(&self, random: &SecureRandom) -> u64 {
        self.faces[random.index(self.faces.len())]
    }
}

fn parse_face(item: &str) -> Result<u64> {
    if item.is_empty() {
        return Err(Error::InvalidDice("empty face".to_string()));
    }
    item.parse::<u64>().map_err(|_| {
        if item.parse::<i64>().is_ok() {
            Error::InvalidDice(format!("face {} is negative", item))
        } else {
            Error::InvalidDice(format!("face {:?} is not an integer", item))
        }
    })
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, face) in self.faces.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", face)?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dice({})", self)
    }
}
