use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

/// The kind of countdown a cycle runs, which selects the configured duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerPhase {
    /// All phases in ordinal order.
    pub const ALL: [TimerPhase; 3] = [Self::Work, Self::ShortBreak, Self::LongBreak];

    /// Get the phase the engine starts with.
    pub fn initial() -> Self {
        Self::Work
    }

    /// Returns the ordinal index of this [`TimerPhase`].
    pub fn index(self) -> u8 {
        match self {
            Self::Work => 0,
            Self::ShortBreak => 1,
            Self::LongBreak => 2,
        }
    }

    /// Returns `true` if this phase is one of the breaks.
    pub fn is_break(self) -> bool {
        !matches!(self, Self::Work)
    }
}

impl TryFrom<u8> for TimerPhase {
    type Error = InvalidPhaseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .context(OutOfRangeSnafu { index: value })
    }
}

impl FromStr for TimerPhase {
    type Err = InvalidPhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "work" => Ok(Self::Work),
            "short-break" | "short" => Ok(Self::ShortBreak),
            "long-break" | "long" => Ok(Self::LongBreak),
            _ => UnknownNameSnafu { name: s }.fail(),
        }
    }
}

impl Display for TimerPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Work => f.write_str("Work"),
            Self::ShortBreak => f.write_str("Short Break"),
            Self::LongBreak => f.write_str("Long Break"),
        }
    }
}

/// An error type of decoding a [`TimerPhase`] at a boundary.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidPhaseError {
    #[snafu(display("Phase index {index} is out of range"))]
    #[non_exhaustive]
    OutOfRange { index: u8 },
    #[snafu(display("Unknown phase name `{name}`"))]
    #[non_exhaustive]
    UnknownName { name: String },
}
