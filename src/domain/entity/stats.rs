use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::entity::TimerPhase;

/// A phase that counted down to zero without being discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub phase: TimerPhase,
    pub duration_millis: u64,
}

impl CompletedSession {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_millis)
    }
}

/// Aggregated sessions of a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    date: NaiveDate,
    completed_sessions: u32,
    total_work_millis: u64,
    total_break_millis: u64,
}

impl DailyStats {
    /// Creates empty statistics of `date`.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            completed_sessions: 0,
            total_work_millis: 0,
            total_break_millis: 0,
        }
    }

    /// Returns these statistics if they belong to `today`, otherwise empty
    /// statistics of `today`.
    pub fn on(self, today: NaiveDate) -> Self {
        if self.date == today {
            self
        } else {
            Self::empty(today)
        }
    }

    /// Add a completed session.
    pub fn record(&mut self, session: &CompletedSession) {
        self.completed_sessions = self.completed_sessions.saturating_add(1);
        let counter = if session.phase.is_break() {
            &mut self.total_break_millis
        } else {
            &mut self.total_work_millis
        };
        *counter = counter.saturating_add(session.duration_millis);
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn total_work_millis(&self) -> u64 {
        self.total_work_millis
    }

    pub fn total_break_millis(&self) -> u64 {
        self.total_break_millis
    }

    pub fn total_work_minutes(&self) -> u64 {
        self.total_work_millis / 60_000
    }

    pub fn total_break_minutes(&self) -> u64 {
        self.total_break_millis / 60_000
    }

    pub fn total_minutes(&self) -> u64 {
        self.total_work_minutes() + self.total_break_minutes()
    }
}
