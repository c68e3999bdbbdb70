use std::sync::Arc;

use snafu::prelude::*;
use tokio::sync::broadcast::Receiver;
use tokio::time::Duration;

use crate::domain::daemon::inbound::{
    LoadSnafu, PausePort, QueryPort, ResetPort, SetPhasePort, SettingsPort, SettingsRequestError,
    StartPort, StatsPort, StatsRequestError, StoreSnafu, WatchPort,
};
use crate::domain::daemon::recorder::StatsRecorder;
use crate::domain::daemon::worker::WorkerHandle;
use crate::domain::entity::settings::SettingsPatch;
use crate::domain::entity::{DailyStats, PomodoroSettings, TimerPhase, TimerState};
use crate::domain::repository::settings::UpdateSettingsError;
use crate::domain::repository::SettingsRepository;

#[derive(Debug)]
pub struct StartService {
    worker: Arc<WorkerHandle>,
}

impl StartService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl StartPort for StartService {
    async fn start(&self) -> TimerState {
        self.worker.start().await
    }
}

#[derive(Debug)]
pub struct PauseService {
    worker: Arc<WorkerHandle>,
}

impl PauseService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl PausePort for PauseService {
    async fn pause(&self) -> TimerState {
        self.worker.pause().await
    }
}

#[derive(Debug)]
pub struct ResetService {
    worker: Arc<WorkerHandle>,
}

impl ResetService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl ResetPort for ResetService {
    async fn reset(&self) -> TimerState {
        self.worker.reset().await
    }
}

#[derive(Debug)]
pub struct SetPhaseService {
    worker: Arc<WorkerHandle>,
}

impl SetPhaseService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl SetPhasePort for SetPhaseService {
    async fn set_phase(&self, phase: TimerPhase, duration: Option<Duration>) -> TimerState {
        self.worker.set_phase(phase, duration).await
    }
}

#[derive(Debug)]
pub struct QueryService {
    worker: Arc<WorkerHandle>,
}

impl QueryService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

#[async_trait::async_trait]
impl QueryPort for QueryService {
    async fn query(&self) -> TimerState {
        self.worker.query().await
    }
}

#[derive(Debug)]
pub struct WatchService {
    worker: Arc<WorkerHandle>,
}

impl WatchService {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self { worker }
    }
}

impl WatchPort for WatchService {
    fn subscribe(&self) -> Receiver<TimerState> {
        self.worker.subscribe()
    }

    fn snapshot(&self) -> TimerState {
        self.worker.snapshot()
    }
}

/// Settings requests go to the store. The worker follows the store's change
/// stream on its own.
pub struct SettingsService {
    repository: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repository: Arc<dyn SettingsRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl SettingsPort for SettingsService {
    async fn settings(&self) -> Result<PomodoroSettings, SettingsRequestError> {
        self.repository.load().await.context(LoadSnafu)
    }

    async fn update_settings(
        &self,
        patch: SettingsPatch,
    ) -> Result<PomodoroSettings, SettingsRequestError> {
        self.repository
            .update(patch)
            .await
            .map_err(|err| match err {
                UpdateSettingsError::Invalid { source } => SettingsRequestError::Invalid { source },
                err => SettingsRequestError::Save { source: err },
            })
    }
}

pub struct StatsService {
    recorder: Arc<StatsRecorder>,
}

impl StatsService {
    pub fn new(recorder: Arc<StatsRecorder>) -> Self {
        Self { recorder }
    }
}

#[async_trait::async_trait]
impl StatsPort for StatsService {
    async fn stats(&self) -> Result<DailyStats, StatsRequestError> {
        self.recorder.current().await.context(StoreSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::repository::settings::MockSettingsRepository;

    #[tokio::test]
    async fn settings_service_update() {
        let mut repository = MockSettingsRepository::new();
        repository
            .expect_update()
            .withf(|patch| patch.work_minutes == Some(50))
            .times(1)
            .returning(|patch| Ok(PomodoroSettings::default().patch(patch).unwrap()));
        let service = SettingsService::new(Arc::new(repository));

        let settings = service
            .update_settings(SettingsPatch {
                work_minutes: Some(50),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(settings.minutes(TimerPhase::Work), 50);
        assert_eq!(settings.minutes(TimerPhase::ShortBreak), 5);
    }

    #[tokio::test]
    async fn settings_service_update_rejects_invalid() {
        let mut repository = MockSettingsRepository::new();
        repository.expect_update().times(1).returning(|patch| {
            let source = PomodoroSettings::default().patch(patch).unwrap_err();
            Err(UpdateSettingsError::Invalid { source })
        });
        let service = SettingsService::new(Arc::new(repository));

        let res = service
            .update_settings(SettingsPatch {
                short_break_minutes: Some(31),
                ..Default::default()
            })
            .await;
        assert!(matches!(res, Err(SettingsRequestError::Invalid { .. })));
    }

    #[tokio::test]
    async fn settings_service_update_error_save() {
        let mut repository = MockSettingsRepository::new();
        repository
            .expect_update()
            .returning(|_| snafu::whatever!("disk full"));
        let service = SettingsService::new(Arc::new(repository));

        let res = service.update_settings(SettingsPatch::default()).await;
        assert!(matches!(res, Err(SettingsRequestError::Save { .. })));
    }
}
