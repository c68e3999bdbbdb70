use std::error::Error as StdError;

use snafu::prelude::*;

use crate::domain::entity::DailyStats;

/// An abstract interface of the durable statistics store.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StatsRepository: Send + Sync + 'static {
    /// Read the last stored statistics, whatever day they belong to.
    ///
    /// # Errors
    ///
    /// This function will return an error if the statistics could not be read.
    async fn load(&self) -> Result<Option<DailyStats>, StatsStoreError>;

    /// Replace the stored statistics.
    ///
    /// # Errors
    ///
    /// This function will return an error if the statistics could not be
    /// written.
    async fn save(&self, stats: &DailyStats) -> Result<(), StatsStoreError>;
}

/// An error type of accessing the repository of [`DailyStats`].
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum StatsStoreError {
    #[snafu(whatever, display("Access statistics failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}
