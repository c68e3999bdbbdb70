use std::error::Error as StdError;

use snafu::prelude::*;
use tokio::sync::mpsc::Receiver;
use tokio::time::Duration;

use crate::domain::entity::settings::SettingsPatch;
use crate::domain::entity::{DailyStats, PomodoroSettings, TimerPhase, TimerState};

/// A public port for launching and initializing a daemon.
#[async_trait::async_trait]
pub trait InitPort: Send + Sync + 'static {
    /// Do the initialization operation.
    ///
    /// # Errors
    ///
    /// This function will return an error if daemon is already running or the
    /// initialization failed.
    async fn init(&self) -> Result<(), InitDaemonError>;
}

/// An error type of initializing a daemon.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InitDaemonError {
    #[snafu(display("Daemon is already running"))]
    AlreadyRunning,
    #[snafu(whatever, display("Initialization failed: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

/// A public port for requesting the daemon to start or resume the timer.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StartPort: Send + Sync + 'static {
    /// Do the start operation and return the settled state.
    ///
    /// # Errors
    ///
    /// This function will return an error if the operation failed.
    async fn start(&self) -> Result<TimerState, RequestDaemonError>;
}

/// A public port for requesting the daemon to pause the timer.
#[async_trait::async_trait]
pub trait PausePort: Send + Sync + 'static {
    /// Do the pause operation and return the settled state.
    ///
    /// # Errors
    ///
    /// This function will return an error if the operation failed.
    async fn pause(&self) -> Result<TimerState, RequestDaemonError>;
}

/// A public port for requesting the daemon to reset the current phase.
#[async_trait::async_trait]
pub trait ResetPort: Send + Sync + 'static {
    /// Do the reset operation and return the settled state.
    ///
    /// # Errors
    ///
    /// This function will return an error if the operation failed.
    async fn reset(&self) -> Result<TimerState, RequestDaemonError>;
}

/// A public port for requesting the daemon to switch to another phase.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SetPhasePort: Send + Sync + 'static {
    /// Switch to `phase`, optionally with a custom `duration`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the operation failed.
    async fn set_phase(
        &self,
        phase: TimerPhase,
        duration: Option<Duration>,
    ) -> Result<TimerState, RequestDaemonError>;
}

/// A public port for requesting the daemon to query the current state.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryPort: Send + Sync + 'static {
    /// Do the query operation.
    ///
    /// # Errors
    ///
    /// This function will return an error if the operation failed.
    async fn query(&self) -> Result<TimerState, RequestDaemonError>;
}

/// A public port for following every state the daemon publishes.
#[async_trait::async_trait]
pub trait WatchPort: Send + Sync + 'static {
    /// Open a stream of states, beginning with the current one. The stream
    /// ends when the daemon goes away.
    ///
    /// # Errors
    ///
    /// This function will return an error if the stream could not be opened.
    async fn watch(&self) -> Result<Receiver<TimerState>, RequestDaemonError>;
}

/// A public port for reading and changing the daemon's settings.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SettingsPort: Send + Sync + 'static {
    /// Read the current settings.
    ///
    /// # Errors
    ///
    /// This function will return an error if the operation failed.
    async fn settings(&self) -> Result<PomodoroSettings, RequestDaemonError>;

    /// Apply `patch` and return the resulting settings.
    ///
    /// # Errors
    ///
    /// This function will return an error if the operation failed or the
    /// daemon rejected the values.
    async fn update_settings(
        &self,
        patch: SettingsPatch,
    ) -> Result<PomodoroSettings, RequestDaemonError>;
}

/// A public port for reading today's statistics.
#[async_trait::async_trait]
pub trait StatsPort: Send + Sync + 'static {
    /// Do the stats operation.
    ///
    /// # Errors
    ///
    /// This function will return an error if the operation failed.
    async fn stats(&self) -> Result<DailyStats, RequestDaemonError>;
}

/// An error type of sending requests to daemon.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub))]
pub enum RequestDaemonError {
    #[snafu(display("Endpoint {endpoint} is unavailable"))]
    Unavailable { endpoint: String },
    #[snafu(display("Could not receive a valid response"))]
    BadResponse,
    #[snafu(display("Daemon rejected the request: {message}"))]
    Rejected { message: String },
    #[snafu(whatever, display("Request failed: {message}"))]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}
