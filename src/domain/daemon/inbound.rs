use snafu::prelude::*;
use tokio::sync::broadcast::Receiver;
use tokio::time::Duration;

use crate::domain::entity::settings::{InvalidSettingsError, SettingsPatch};
use crate::domain::entity::{DailyStats, PomodoroSettings, TimerPhase, TimerState};
use crate::domain::repository::settings::{GetSettingsError, UpdateSettingsError};
use crate::domain::repository::stats::StatsStoreError;

/// A public port for starting or resuming the countdown.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StartPort: Send + Sync + 'static {
    /// Do the start operation and return the settled state.
    async fn start(&self) -> TimerState;
}

/// A public port for suspending the countdown.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PausePort: Send + Sync + 'static {
    /// Do the pause operation and return the settled state.
    async fn pause(&self) -> TimerState;
}

/// A public port for discarding the current cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ResetPort: Send + Sync + 'static {
    /// Do the reset operation and return the settled state.
    async fn reset(&self) -> TimerState;
}

/// A public port for switching to another phase.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SetPhasePort: Send + Sync + 'static {
    /// Switch to `phase`, using `duration` instead of the configured one if
    /// given, and return the settled state.
    async fn set_phase(&self, phase: TimerPhase, duration: Option<Duration>) -> TimerState;
}

/// A public port for querying the current state.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryPort: Send + Sync + 'static {
    /// Do the query operation.
    async fn query(&self) -> TimerState;
}

/// A public port for following every published state.
#[cfg_attr(test, mockall::automock)]
pub trait WatchPort: Send + Sync + 'static {
    /// Subscribe to states published from now on.
    fn subscribe(&self) -> Receiver<TimerState>;

    /// The latest published state.
    fn snapshot(&self) -> TimerState;
}

/// A public port for reading and changing the settings.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SettingsPort: Send + Sync + 'static {
    /// Read the stored settings.
    ///
    /// # Errors
    ///
    /// This function will return an error if the settings store fails.
    async fn settings(&self) -> Result<PomodoroSettings, SettingsRequestError>;

    /// Replace some fields of the stored settings.
    ///
    /// # Errors
    ///
    /// This function will return an error if the patched settings are invalid
    /// or the settings store fails.
    async fn update_settings(
        &self,
        patch: SettingsPatch,
    ) -> Result<PomodoroSettings, SettingsRequestError>;
}

/// A public port for reading today's statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StatsPort: Send + Sync + 'static {
    /// Do the statistics query.
    ///
    /// # Errors
    ///
    /// This function will return an error if the statistics store fails.
    async fn stats(&self) -> Result<DailyStats, StatsRequestError>;
}

/// An error type of the settings operations.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum SettingsRequestError {
    #[snafu(display("Could not accept invalid settings"))]
    Invalid { source: InvalidSettingsError },
    #[snafu(display("Could not load settings"))]
    Load { source: GetSettingsError },
    #[snafu(display("Could not save settings"))]
    Save { source: UpdateSettingsError },
}

/// An error type of the statistics query.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum StatsRequestError {
    #[snafu(display("Could not access statistics"))]
    Store { source: StatsStoreError },
}
