use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::prelude::*;

use crate::domain::entity::DailyStats;
use crate::domain::repository::stats::StatsStoreError;
use crate::domain::repository::StatsRepository;

/// The statistics store backed by a JSON file holding the latest day.
pub struct StatsFile {
    path: PathBuf,
}

impl StatsFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl StatsRepository for StatsFile {
    async fn load(&self) -> Result<Option<DailyStats>, StatsStoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_whatever_context(|_| format!("Could not read {}", self.path.display()))
            }
        };
        match serde_json::from_str(&content) {
            Ok(stats) => Ok(Some(stats)),
            Err(err) => {
                // The next save overwrites the broken file.
                tracing::warn!(
                    %err,
                    path = %self.path.display(),
                    "Discarding corrupted statistics"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, stats: &DailyStats) -> Result<(), StatsStoreError> {
        let content = whatever!(
            serde_json::to_string_pretty(stats),
            "Could not serialize statistics"
        );
        whatever!(
            tokio::fs::write(&self.path, content).await,
            "Could not write {}",
            self.path.display()
        );
        Ok(())
    }
}
