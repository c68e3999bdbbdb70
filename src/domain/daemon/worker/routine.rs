use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::domain::daemon::worker::handle::Request;
use crate::domain::daemon::worker::publisher::Publisher;
use crate::domain::daemon::worker::state::WorkerState;
use crate::domain::entity::{PomodoroSettings, TimerPhase, TimerState};

/// Resolution of the countdown.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// A [`WorkerContext`] stores all objects relavent to the [`WorkerRoutine`]
/// and the business logic.
#[derive(Debug)]
pub struct WorkerContext {
    pub settings: PomodoroSettings,
    pub tick: Duration,
    pub requests: Receiver<Request>,
    pub publisher: Publisher,
}

impl WorkerContext {
    /// Total milliseconds of a fresh cycle in `phase`.
    pub fn total_millis(&self, phase: TimerPhase, custom: Option<Duration>) -> u64 {
        millis(custom.unwrap_or_else(|| self.settings.duration(phase)))
    }

    /// Tick length in milliseconds.
    pub fn tick_millis(&self) -> u64 {
        millis(self.tick)
    }
}

/// A type responsible for the countdown. A [`WorkerRoutine`] runs on
/// background, receiving [`Request`]s from [`WorkerHandle`]s and ticking
/// while running. Both are handled on this single task, so the state has one
/// writer only.
#[derive(Debug)]
pub struct WorkerRoutine {
    context: WorkerContext,
    state: WorkerState,
}

impl WorkerRoutine {
    /// Spawn a running [`WorkerRoutine`] on background, starting from
    /// `initial`, which the publisher is already seeded with.
    pub fn spawn(
        settings: PomodoroSettings,
        tick: Duration,
        initial: TimerState,
        requests: Receiver<Request>,
        publisher: Publisher,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut worker = Self {
                context: WorkerContext {
                    settings,
                    tick,
                    requests,
                    publisher,
                },
                state: WorkerState::new(initial),
            };
            worker.run().await;
            tracing::debug!("Worker stopped");
        })
    }

    /// Main part of its business logic.
    async fn run(&mut self) {
        while !self.state.is_stopped() {
            self.state.run(&mut self.context).await;
        }
    }
}

/// Idle state in the initial phase under `settings`.
pub fn initial_state(settings: &PomodoroSettings) -> TimerState {
    let phase = TimerPhase::initial();
    TimerState::idle(phase, millis(settings.duration(phase)))
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
