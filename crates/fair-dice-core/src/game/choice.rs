//! Validation of raw menu input, independent of where the input comes from.

use crate::error::{Error, Result};
use std::fmt;

/// A menu entry the user can pick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Choice {
    /// Numbered option
    Index(u64),
    /// Leave the game
    Exit,
    /// Show the probability table
    Help,
}

impl Choice {
    /// Options `0..count`, exit, and help when `with_help` is set
    pub fn menu(count: u64, with_help: bool) -> Vec<Choice> {
        let mut options: Vec<Choice> = (0..count).map(Choice::Index).collect();
        options.push(Choice::Exit);
        if with_help {
            options.push(Choice::Help);
        }
        options
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Index(index) => write!(f, "{}", index),
            Choice::Exit => write!(f, "X"),
            Choice::Help => write!(f, "?"),
        }
    }
}

/// Parse `raw` and accept it only if it is one of `valid`.
///
/// Re-prompting on error is up to the caller.
pub fn parse_choice(raw: &str, valid: &[Choice]) -> Result<Choice> {
    let token = raw.trim();
    let choice = match token {
        "X" | "x" => Some(Choice::Exit),
        "?" => Some(Choice::Help),
        digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            digits.parse().ok().map(Choice::Index)
        }
        _ => None,
    };

    choice
        .filter(|choice| valid.contains(choice))
        .ok_or_else(|| Error::InvalidInput {
            input: raw.to_string(),
        })
}
