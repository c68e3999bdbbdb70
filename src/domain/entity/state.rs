use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::domain::entity::TimerPhase;

/// Total duration of the state reported when nothing better is known.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(25 * 60);

/// The variant of a [`TimerState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl Display for TimerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Running => f.write_str("Running"),
            Self::Paused => f.write_str("Paused"),
            Self::Completed => f.write_str("Completed"),
        }
    }
}

/// An immutable snapshot of the timer engine.
///
/// The invariant `remaining <= total` is upheld by every constructor, and a
/// [`Completed`](TimerStatus::Completed) state always has nothing remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimerStateContent")]
pub struct TimerState {
    status: TimerStatus,
    phase: TimerPhase,
    remaining_millis: u64,
    total_millis: u64,
}

impl TimerState {
    /// A freshly configured countdown.
    pub fn idle(phase: TimerPhase, total_millis: u64) -> Self {
        Self {
            status: TimerStatus::Idle,
            phase,
            remaining_millis: total_millis,
            total_millis,
        }
    }

    pub fn running(phase: TimerPhase, remaining_millis: u64, total_millis: u64) -> Self {
        Self::clamped(TimerStatus::Running, phase, remaining_millis, total_millis)
    }

    pub fn paused(phase: TimerPhase, remaining_millis: u64, total_millis: u64) -> Self {
        Self::clamped(TimerStatus::Paused, phase, remaining_millis, total_millis)
    }

    pub fn completed(phase: TimerPhase, total_millis: u64) -> Self {
        Self {
            status: TimerStatus::Completed,
            phase,
            remaining_millis: 0,
            total_millis,
        }
    }

    fn clamped(status: TimerStatus, phase: TimerPhase, remaining: u64, total: u64) -> Self {
        Self {
            status,
            phase,
            remaining_millis: remaining.min(total),
            total_millis: total,
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn remaining_millis(&self) -> u64 {
        self.remaining_millis
    }

    pub fn total_millis(&self) -> u64 {
        self.total_millis
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_millis)
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_millis)
    }

    /// Time already counted down in this cycle.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.total_millis - self.remaining_millis)
    }

    /// Fraction of the cycle already counted down, within `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        match self.status {
            TimerStatus::Completed => 1.0,
            _ if self.total_millis == 0 => 0.0,
            _ => (self.total_millis - self.remaining_millis) as f64 / self.total_millis as f64,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle(TimerPhase::initial(), DEFAULT_DURATION.as_millis() as u64)
    }
}

impl Display for TimerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} ({}) {}ms/{}ms",
            self.status, self.phase, self.remaining_millis, self.total_millis
        )
    }
}

/// Unchecked wire form of a [`TimerState`].
#[derive(Debug, Clone, Deserialize)]
struct TimerStateContent {
    status: TimerStatus,
    phase: TimerPhase,
    remaining_millis: u64,
    total_millis: u64,
}

impl TryFrom<TimerStateContent> for TimerState {
    type Error = InvalidStateError;

    fn try_from(value: TimerStateContent) -> Result<Self, Self::Error> {
        let TimerStateContent {
            status,
            phase,
            remaining_millis,
            total_millis,
        } = value;

        ensure!(
            remaining_millis <= total_millis,
            ExceedsTotalSnafu {
                remaining_millis,
                total_millis,
            }
        );

        match status {
            TimerStatus::Idle => {
                ensure!(remaining_millis == total_millis, IdleInProgressSnafu);
                Ok(Self::idle(phase, total_millis))
            }
            TimerStatus::Completed => {
                ensure!(remaining_millis == 0, CompletedWithRemainingSnafu);
                Ok(Self::completed(phase, total_millis))
            }
            TimerStatus::Running => Ok(Self::running(phase, remaining_millis, total_millis)),
            TimerStatus::Paused => Ok(Self::paused(phase, remaining_millis, total_millis)),
        }
    }
}

/// An error type of decoding a [`TimerState`] received from a peer.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidStateError {
    #[snafu(display("Remaining {remaining_millis}ms exceeds total {total_millis}ms"))]
    ExceedsTotal {
        remaining_millis: u64,
        total_millis: u64,
    },
    #[snafu(display("An idle state must not have progress"))]
    IdleInProgress,
    #[snafu(display("A completed state must not have remaining time"))]
    CompletedWithRemaining,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_progress() {
        let state = TimerState::running(TimerPhase::Work, 750, 1000);
        assert_eq!(state.progress(), 0.25);

        let state = TimerState::idle(TimerPhase::Work, 1000);
        assert_eq!(state.progress(), 0.0);

        let state = TimerState::paused(TimerPhase::ShortBreak, 0, 1000);
        assert_eq!(state.progress(), 1.0);

        let state = TimerState::idle(TimerPhase::Work, 0);
        assert_eq!(state.progress(), 0.0);

        let state = TimerState::running(TimerPhase::Work, 0, 0);
        assert_eq!(state.progress(), 0.0);

        let state = TimerState::completed(TimerPhase::LongBreak, 0);
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn state_progress_formula() {
        for total in [1u64, 7, 1000, 1_500_000] {
            for remaining in [0, total / 3, total / 2, total] {
                let state = TimerState::running(TimerPhase::Work, remaining, total);
                let expected = (total - remaining) as f64 / total as f64;
                assert_eq!(state.progress(), expected);
            }
        }
    }

    #[test]
    fn state_constructors_uphold_invariants() {
        let state = TimerState::running(TimerPhase::Work, 2000, 1000);
        assert_eq!(state.remaining_millis(), 1000);

        let state = TimerState::paused(TimerPhase::Work, 5000, 1000);
        assert_eq!(state.remaining_millis(), 1000);

        let state = TimerState::completed(TimerPhase::Work, 1000);
        assert_eq!(state.remaining_millis(), 0);
        assert_eq!(state.elapsed(), Duration::from_secs(1));

        let state = TimerState::idle(TimerPhase::ShortBreak, 300_000);
        assert_eq!(state.remaining_millis(), state.total_millis());
    }

    #[test]
    fn state_default() {
        let state = TimerState::default();
        assert_eq!(state.status(), TimerStatus::Idle);
        assert_eq!(state.phase(), TimerPhase::Work);
        assert_eq!(state.remaining_millis(), 1_500_000);
        assert_eq!(state.total_millis(), 1_500_000);
    }

    #[test]
    fn state_deserialize() {
        let state: TimerState = serde_json::from_value(serde_json::json!({
            "status": "Paused",
            "phase": "short_break",
            "remaining_millis": 1000,
            "total_millis": 300000,
        }))
        .unwrap();
        assert_eq!(state, TimerState::paused(TimerPhase::ShortBreak, 1000, 300_000));

        let text = serde_json::to_string(&state).unwrap();
        assert_eq!(serde_json::from_str::<TimerState>(&text).unwrap(), state);
    }

    #[test]
    fn state_deserialize_rejects_invalid() {
        let exceeding = serde_json::json!({
            "status": "Running",
            "phase": "work",
            "remaining_millis": 2000,
            "total_millis": 1000,
        });
        assert!(serde_json::from_value::<TimerState>(exceeding).is_err());

        let completed = serde_json::json!({
            "status": "Completed",
            "phase": "work",
            "remaining_millis": 10,
            "total_millis": 1000,
        });
        assert!(serde_json::from_value::<TimerState>(completed).is_err());

        let idle = serde_json::json!({
            "status": "Idle",
            "phase": "work",
            "remaining_millis": 10,
            "total_millis": 1000,
        });
        assert!(serde_json::from_value::<TimerState>(idle).is_err());
    }
}
