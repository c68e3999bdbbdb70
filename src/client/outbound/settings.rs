use std::sync::Arc;

use crate::client::app::connector::Connector;
use crate::client::outbound::exchange;
use crate::domain::client::outbound::{RequestDaemonError, SettingsPort};
use crate::domain::entity::settings::SettingsPatch;
use crate::domain::entity::PomodoroSettings;
use crate::protocol::{Request, Response};

/// A [`SettingsPort`] implementation
pub struct SettingsService {
    connector: Arc<dyn Connector>,
}

impl SettingsService {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait::async_trait]
impl SettingsPort for SettingsService {
    async fn settings(&self) -> Result<PomodoroSettings, RequestDaemonError> {
        match exchange(self.connector.as_ref(), Request::Settings).await? {
            Response::Settings { settings } => Ok(settings),
            _ => Err(RequestDaemonError::BadResponse),
        }
    }

    async fn update_settings(
        &self,
        patch: SettingsPatch,
    ) -> Result<PomodoroSettings, RequestDaemonError> {
        let request = Request::UpdateSettings { patch };
        match exchange(self.connector.as_ref(), request).await? {
            Response::UpdateSettings { settings } => Ok(settings),
            _ => Err(RequestDaemonError::BadResponse),
        }
    }
}
