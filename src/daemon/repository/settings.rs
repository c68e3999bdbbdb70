use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tokio::sync::watch::{self, Receiver, Sender};
use tokio::sync::Mutex;

use crate::daemon::config::{ContentReader, ReadContentError};
use crate::domain::entity::settings::SettingsPatch;
use crate::domain::entity::PomodoroSettings;
use crate::domain::repository::settings::{GetSettingsError, UpdateSettingsError};
use crate::domain::repository::SettingsRepository;

/// The settings store backed by a TOML file. Every successful write is
/// pushed to subscribers. Updates are serialised by `write`, which is held
/// from reading the current value until the new one is published.
pub struct SettingsFile {
    path: PathBuf,
    sender: Sender<PomodoroSettings>,
    write: Mutex<()>,
}

impl SettingsFile {
    /// Open the settings file at `path`, creating it with the default
    /// settings if it is missing.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file could not be read or
    /// holds invalid settings.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenSettingsError> {
        let path = path.as_ref().to_path_buf();
        let template = toml::to_string(&PomodoroSettings::default()).context(SerializeSnafu)?;
        let content = ContentReader::new(&path)
            .or_create(template)
            .read()
            .context(ReadSnafu)?;
        let settings = toml::from_str(&content).context(ParseSnafu { path: path.as_path() })?;
        tracing::debug!(?settings, path = %path.display(), "Loaded settings");

        let (sender, _) = watch::channel(settings);
        Ok(Self {
            path,
            sender,
            write: Mutex::new(()),
        })
    }
}

#[async_trait::async_trait]
impl SettingsRepository for SettingsFile {
    async fn load(&self) -> Result<PomodoroSettings, GetSettingsError> {
        Ok(*self.sender.borrow())
    }

    async fn update(&self, patch: SettingsPatch) -> Result<PomodoroSettings, UpdateSettingsError> {
        let _guard = self.write.lock().await;
        let current = *self.sender.borrow();
        let settings = current
            .patch(patch)
            .map_err(|source| UpdateSettingsError::Invalid { source })?;
        if settings == current {
            return Ok(settings);
        }

        let content = whatever!(toml::to_string(&settings), "Could not serialize settings");
        whatever!(
            tokio::fs::write(&self.path, content).await,
            "Could not write {}",
            self.path.display()
        );
        self.sender.send_replace(settings);
        tracing::info!(?settings, "Updated settings");
        Ok(settings)
    }

    fn subscribe(&self) -> Receiver<PomodoroSettings> {
        self.sender.subscribe()
    }
}

/// An error type of opening the settings file.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum OpenSettingsError {
    #[snafu(display("Could not serialize default settings"))]
    Serialize { source: toml::ser::Error },
    #[snafu(display("Could not read settings file"))]
    Read { source: ReadContentError },
    #[snafu(display("Could not parse settings in {}", path.display()))]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
