mod handle;
mod publisher;
mod routine;
mod state;

pub use handle::WorkerHandle;
pub use routine::TICK_INTERVAL;

use std::sync::Arc;

use snafu::prelude::*;
use tokio::time::Duration;

use crate::domain::entity::PomodoroSettings;
use crate::domain::repository::settings::{GetSettingsError, SettingsRepository};

use publisher::Publisher;
use routine::WorkerRoutine;

const REQUEST_CAPACITY: usize = 8;

/// Spawn the background worker with the stored settings, and keep feeding it
/// later changes of the store.
///
/// # Errors
///
/// This function will return an error if the settings could not be loaded.
pub async fn spawn(
    settings_repository: Arc<dyn SettingsRepository>,
) -> Result<WorkerHandle, SpawnWorkerError> {
    let settings = settings_repository.load().await.context(SettingsSnafu)?;
    let handle = spawn_with(settings, TICK_INTERVAL);

    let mut changes = settings_repository.subscribe();
    changes.borrow_and_update();
    let forwarder = handle.clone();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let settings = *changes.borrow_and_update();
            tracing::debug!(?settings, "Settings changed");
            forwarder.apply_settings(settings).await;
        }
    });

    Ok(handle)
}

/// Spawn the background worker with fixed settings and tick length.
pub fn spawn_with(settings: PomodoroSettings, tick: Duration) -> WorkerHandle {
    let (requester, requests) = tokio::sync::mpsc::channel(REQUEST_CAPACITY);
    let initial = routine::initial_state(&settings);
    let (publisher, subscriptions) = Publisher::new(initial);
    WorkerRoutine::spawn(settings, tick, initial, requests, publisher);
    WorkerHandle::new(requester, subscriptions)
}

/// An error for spawning the background worker.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SpawnWorkerError {
    #[snafu(display("Could not load settings from repository"))]
    Settings { source: GetSettingsError },
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::broadcast::Receiver;
    use tokio::sync::watch;

    use crate::domain::entity::settings::TEST_MODE_DURATION;
    use crate::domain::entity::{TimerPhase, TimerState, TimerStatus};
    use crate::domain::repository::settings::MockSettingsRepository;

    #[tokio::test(start_paused = true)]
    async fn worker_initial_state() {
        let worker = spawn_with(PomodoroSettings::default(), TICK_INTERVAL);
        assert_eq!(worker.snapshot(), TimerState::default());
        assert_eq!(worker.query().await, TimerState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn worker_full_countdown() {
        let worker = spawn_with(PomodoroSettings::default(), TICK_INTERVAL);
        let mut states = worker.subscribe();

        let state = worker.start().await;
        assert_eq!(
            state,
            TimerState::running(TimerPhase::Work, 1_500_000, 1_500_000)
        );

        let published = collect_until_completed(&mut states).await;
        let mut previous = u64::MAX;
        for state in &published {
            assert!(state.remaining_millis() <= state.total_millis());
            assert!(state.remaining_millis() <= previous);
            previous = state.remaining_millis();
        }
        assert_eq!(
            published.last(),
            Some(&TimerState::completed(TimerPhase::Work, 1_500_000))
        );
        assert_eq!(
            worker.snapshot(),
            TimerState::completed(TimerPhase::Work, 1_500_000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn worker_start_while_running_is_idempotent() {
        let worker = spawn_with(PomodoroSettings::default(), TICK_INTERVAL);
        worker.start().await;
        tokio::time::sleep(Duration::from_millis(1_050)).await;

        let before = worker.query().await;
        let after = worker.start().await;
        assert_eq!(before, after);

        let mut states = worker.subscribe();
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        let mut ticks = 0;
        while let Ok(state) = states.try_recv() {
            assert_eq!(state.status(), TimerStatus::Running);
            ticks += 1;
        }
        assert_eq!(ticks, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_pause_then_start_resumes() {
        let worker = spawn_with(PomodoroSettings::default(), TICK_INTERVAL);
        worker.start().await;
        tokio::time::sleep(Duration::from_millis(3_050)).await;

        let paused = worker.pause().await;
        assert_eq!(paused.status(), TimerStatus::Paused);
        assert_eq!(paused.remaining_millis(), 1_500_000 - 3_000);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(worker.query().await, paused);

        let resumed = worker.start().await;
        assert_eq!(
            resumed,
            TimerState::running(TimerPhase::Work, paused.remaining_millis(), 1_500_000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn worker_cancelled_loop_never_ticks() {
        let worker = spawn_with(PomodoroSettings::default(), TICK_INTERVAL);
        worker.start().await;
        tokio::time::sleep(Duration::from_millis(550)).await;

        let state = worker.set_phase(TimerPhase::ShortBreak, None).await;
        assert_eq!(state, TimerState::idle(TimerPhase::ShortBreak, 300_000));

        let mut states = worker.subscribe();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(states.try_recv().is_err());
        assert_eq!(worker.snapshot(), state);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_start_after_completion_restarts() {
        let settings = PomodoroSettings::try_new(25, 5, 15, true, true).unwrap();
        let worker = spawn_with(settings, TICK_INTERVAL);
        let mut states = worker.subscribe();
        let mut completions = worker.completions();
        let total = TEST_MODE_DURATION.as_millis() as u64;

        worker.start().await;
        collect_until_completed(&mut states).await;
        let session = completions.recv().await.unwrap();
        assert_eq!(session.phase, TimerPhase::Work);
        assert_eq!(session.duration(), TEST_MODE_DURATION);

        let restarted = worker.start().await;
        assert_eq!(restarted, TimerState::running(TimerPhase::Work, total, total));
        assert_eq!(
            states.recv().await.unwrap(),
            TimerState::idle(TimerPhase::Work, total)
        );
        assert_eq!(states.recv().await.unwrap(), restarted);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_reset_discards_without_completion() {
        let worker = spawn_with(PomodoroSettings::default(), TICK_INTERVAL);
        let mut completions = worker.completions();
        worker.start().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        let state = worker.reset().await;
        assert_eq!(state, TimerState::idle(TimerPhase::Work, 1_500_000));
        assert!(completions.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn worker_custom_duration() {
        let worker = spawn_with(PomodoroSettings::default(), TICK_INTERVAL);
        let state = worker
            .set_phase(TimerPhase::Work, Some(Duration::from_secs(40 * 60)))
            .await;
        assert_eq!(state, TimerState::idle(TimerPhase::Work, 2_400_000));
    }

    #[tokio::test(start_paused = true)]
    async fn worker_follows_settings_store() {
        let initial = PomodoroSettings::default();
        let (sender, receiver) = watch::channel(initial);
        let mut repository = MockSettingsRepository::new();
        repository.expect_load().returning(move || Ok(initial));
        repository
            .expect_subscribe()
            .returning(move || receiver.clone());

        let worker = spawn(Arc::new(repository)).await.unwrap();
        let mut states = worker.subscribe();
        sender.send_replace(PomodoroSettings::try_new(45, 5, 15, false, true).unwrap());

        assert_eq!(
            states.recv().await.unwrap(),
            TimerState::idle(TimerPhase::Work, 2_700_000)
        );

        sender.send_replace(PomodoroSettings::try_new(45, 5, 15, true, true).unwrap());
        assert_eq!(
            states.recv().await.unwrap(),
            TimerState::idle(TimerPhase::Work, TEST_MODE_DURATION.as_millis() as u64)
        );
        let state = worker.set_phase(TimerPhase::LongBreak, None).await;
        assert_eq!(state.total(), TEST_MODE_DURATION);
    }

    #[tokio::test]
    async fn worker_spawn_fails_without_settings() {
        let mut repository = MockSettingsRepository::new();
        repository
            .expect_load()
            .returning(|| snafu::whatever!("unreadable"));

        assert!(spawn(Arc::new(repository)).await.is_err());
    }

    async fn collect_until_completed(states: &mut Receiver<TimerState>) -> Vec<TimerState> {
        let mut published = Vec::new();
        loop {
            let state = states.recv().await.unwrap();
            published.push(state);
            if state.status() == TimerStatus::Completed {
                return published;
            }
        }
    }
}
