use std::error::Error as StdError;

use snafu::prelude::*;
use tokio::sync::watch::Receiver;

use crate::domain::entity::settings::{InvalidSettingsError, PomodoroSettings, SettingsPatch};

/// An abstract interface of the durable settings store.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SettingsRepository: Send + Sync + 'static {
    /// Read the current settings.
    ///
    /// # Errors
    ///
    /// This function will return an error if the settings could not be read.
    async fn load(&self) -> Result<PomodoroSettings, GetSettingsError>;

    /// Apply `patch` to the stored settings as one step, so concurrent
    /// updates never lose each other's fields, and notify subscribers if
    /// anything changed. Returns the resulting settings.
    ///
    /// # Errors
    ///
    /// This function will return an error if the patched settings are invalid
    /// or could not be written.
    async fn update(&self, patch: SettingsPatch) -> Result<PomodoroSettings, UpdateSettingsError>;

    /// Subscribe to full snapshots of the settings, starting with the current
    /// one.
    fn subscribe(&self) -> Receiver<PomodoroSettings>;
}

/// An error type of reading [`PomodoroSettings`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum GetSettingsError {
    #[snafu(display("Stored settings are invalid"))]
    #[non_exhaustive]
    Invalid { source: InvalidSettingsError },
    #[snafu(whatever, display("Load settings failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

/// An error type of updating [`PomodoroSettings`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum UpdateSettingsError {
    #[snafu(display("Patched settings are invalid"), context(name(UpdateInvalidSnafu)))]
    Invalid { source: InvalidSettingsError },
    #[snafu(whatever, display("Save settings failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}
