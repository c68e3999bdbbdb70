use std::sync::Arc;

use snafu::prelude::*;

use crate::domain::daemon::app::service::{
    PauseService, QueryService, ResetService, SetPhaseService, SettingsService, StartService,
    StatsService, WatchService,
};
use crate::domain::daemon::dispatcher::{CompletionMessages, Dispatcher};
use crate::domain::daemon::inbound::{
    PausePort, QueryPort, ResetPort, SetPhasePort, SettingsPort, StartPort, StatsPort, WatchPort,
};
use crate::domain::daemon::outbound::{AlertPort, ProgressPort};
use crate::domain::daemon::recorder::StatsRecorder;
use crate::domain::daemon::worker::{self, SpawnWorkerError};
use crate::domain::entity::{NotificationMessage, TimerPhase};
use crate::domain::repository::notification::GetNotificationError;
use crate::domain::repository::{NotificationRepository, SettingsRepository, StatsRepository};

/// Entrance to the domain logic, providing ports for external adapters.
pub struct ApplicationCore {
    pub start: Arc<dyn StartPort>,
    pub pause: Arc<dyn PausePort>,
    pub reset: Arc<dyn ResetPort>,
    pub set_phase: Arc<dyn SetPhasePort>,
    pub query: Arc<dyn QueryPort>,
    pub watch: Arc<dyn WatchPort>,
    pub settings: Arc<dyn SettingsPort>,
    pub stats: Arc<dyn StatsPort>,
}

impl ApplicationCore {
    /// Initialize the application by injecting external repositories and
    /// adapters. This spawns the timer worker together with the side effect
    /// dispatcher and the statistics recorder following it.
    ///
    /// # Errors
    ///
    /// This function will return an error if initialization failed.
    pub async fn setup(
        progress_port: Arc<dyn ProgressPort>,
        alert_port: Arc<dyn AlertPort>,
        settings_repository: Arc<dyn SettingsRepository>,
        stats_repository: Arc<dyn StatsRepository>,
        notification_repository: Arc<dyn NotificationRepository>,
    ) -> Result<ApplicationCore, SetupApplicationCoreError> {
        let messages = load_messages(notification_repository).await?;
        let worker = worker::spawn(Arc::clone(&settings_repository))
            .await
            .context(WorkerSnafu)?;

        Dispatcher::new(progress_port, alert_port, messages)
            .spawn(worker.subscribe(), worker.watch());
        let recorder = Arc::new(StatsRecorder::new(stats_repository));
        Arc::clone(&recorder).spawn(worker.completions());

        let worker = Arc::new(worker);
        let app = ApplicationCore {
            start: Arc::new(StartService::new(Arc::clone(&worker))),
            pause: Arc::new(PauseService::new(Arc::clone(&worker))),
            reset: Arc::new(ResetService::new(Arc::clone(&worker))),
            set_phase: Arc::new(SetPhaseService::new(Arc::clone(&worker))),
            query: Arc::new(QueryService::new(Arc::clone(&worker))),
            watch: Arc::new(WatchService::new(Arc::clone(&worker))),
            settings: Arc::new(SettingsService::new(settings_repository)),
            stats: Arc::new(StatsService::new(recorder)),
        };

        Ok(app)
    }
}

async fn load_messages(
    notification_repository: Arc<dyn NotificationRepository>,
) -> Result<CompletionMessages, SetupApplicationCoreError> {
    let repository = notification_repository.as_ref();
    Ok(CompletionMessages {
        work: load_message(repository, TimerPhase::Work).await?,
        short_break: load_message(repository, TimerPhase::ShortBreak).await?,
        long_break: load_message(repository, TimerPhase::LongBreak).await?,
    })
}

async fn load_message(
    repository: &dyn NotificationRepository,
    phase: TimerPhase,
) -> Result<NotificationMessage, SetupApplicationCoreError> {
    repository
        .completion_notification(phase)
        .await
        .context(NotificationSnafu { phase })
}

/// An error for initializing the application.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SetupApplicationCoreError {
    #[snafu(display("Could not spawn a background worker"))]
    Worker { source: SpawnWorkerError },
    #[snafu(display("Could not load notification for {phase} from repository"))]
    Notification {
        phase: TimerPhase,
        source: GetNotificationError,
    },
}
