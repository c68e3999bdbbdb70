use std::error::Error as StdError;
use std::time::Duration;

use snafu::prelude::*;

use crate::domain::entity::{NotificationMessage, TimerPhase, TimerState};

/// Vibration pattern of a completion alert, as alternating off/on
/// milliseconds.
pub const COMPLETION_VIBRATION: [u64; 6] = [0, 500, 200, 500, 200, 500];

/// A public port for the persistent progress indication.
#[async_trait::async_trait]
pub trait ProgressPort: Send + Sync + 'static {
    /// Show the progress indication.
    ///
    /// # Errors
    ///
    /// This function will return an error if the indication could not be
    /// shown.
    async fn show_progress(&self, request: ProgressRequest) -> Result<(), SideEffectError>;

    /// Refresh an already shown progress indication.
    ///
    /// # Errors
    ///
    /// This function will return an error if the indication could not be
    /// refreshed.
    async fn update_progress(&self, request: ProgressRequest) -> Result<(), SideEffectError>;

    /// Hide the progress indication if it is shown.
    ///
    /// # Errors
    ///
    /// This function will return an error if the indication could not be
    /// hidden.
    async fn hide_progress(&self) -> Result<(), SideEffectError>;
}

/// Progress of the running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressRequest {
    pub phase: TimerPhase,
    pub remaining: Duration,
    pub total: Duration,
}

impl ProgressRequest {
    /// Elapsed share of the countdown in whole percents.
    pub fn percent(&self) -> u8 {
        let total = self.total.as_millis();
        if total == 0 {
            return 0;
        }
        let elapsed = total - self.remaining.as_millis().min(total);
        (elapsed * 100 / total) as u8
    }
}

impl From<&TimerState> for ProgressRequest {
    fn from(state: &TimerState) -> Self {
        Self {
            phase: state.phase(),
            remaining: state.remaining(),
            total: state.total(),
        }
    }
}

/// A public port for the alert raised when a countdown completes.
#[async_trait::async_trait]
pub trait AlertPort: Send + Sync + 'static {
    /// Raise a tactile alert together with a one-shot notification. This
    /// method is not intended to be implemented by adapters directly.
    ///
    /// # Errors
    ///
    /// This function will return an error if failed to raise the alert.
    async fn alert_complete(
        &self,
        phase: TimerPhase,
        message: &NotificationMessage,
    ) -> Result<(), SideEffectError> {
        let request = AlertRequest {
            phase,
            summary: message.summary().to_owned(),
            body: message.body().map(|body| body.to_owned()),
            vibration: COMPLETION_VIBRATION.to_vec(),
        };
        self.alert_impl(request).await
    }

    /// Actual implementation of the alert.
    ///
    /// # Errors
    ///
    /// This function will return an error if failed to raise the alert.
    async fn alert_impl(&self, request: AlertRequest) -> Result<(), SideEffectError>;
}

/// A structure that stores required data of an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    pub phase: TimerPhase,
    pub summary: String,
    pub body: Option<String>,
    pub vibration: Vec<u64>,
}

/// An error type of side effect collaborators.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SideEffectError {
    #[snafu(whatever, display("Could not perform side effect: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}
