use snafu::prelude::*;

use crate::domain::entity::TimerPhase;

/// Text of a one-shot desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    summary: String,
    body: Option<String>,
}

impl NotificationMessage {
    /// Try to create a [`NotificationMessage`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the summary is empty.
    pub fn try_new(
        summary: String,
        body: Option<String>,
    ) -> Result<Self, TryNewNotificationMessageError> {
        ensure!(!summary.trim().is_empty(), EmptySummarySnafu);
        Ok(Self { summary, body })
    }

    /// The message shown when a phase counts down to zero, if nothing else is
    /// configured.
    pub fn completion(phase: TimerPhase) -> Self {
        let (summary, body) = match phase {
            TimerPhase::Work => ("Work Complete!", "Time for a break"),
            TimerPhase::ShortBreak | TimerPhase::LongBreak => ("Break Over!", "Ready to focus?"),
        };
        Self {
            summary: summary.to_owned(),
            body: Some(body.to_owned()),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl From<NotificationMessage> for (String, Option<String>) {
    fn from(val: NotificationMessage) -> Self {
        (val.summary, val.body)
    }
}

/// An error type of creating a [`NotificationMessage`].
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum TryNewNotificationMessageError {
    #[snafu(display("Summary of a notification must be non-empty."))]
    #[non_exhaustive]
    EmptySummary,
}
