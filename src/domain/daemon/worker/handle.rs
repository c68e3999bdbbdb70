use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::{self, Sender as OneshotSender};
use tokio::sync::{broadcast, watch};
use tokio::time::Duration;

use crate::domain::daemon::worker::publisher::Subscriptions;
use crate::domain::entity::{CompletedSession, PomodoroSettings, TimerPhase, TimerState};

/// Transitions that a [`WorkerRoutine`] applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    SetPhase {
        phase: TimerPhase,
        duration: Option<Duration>,
    },
    ApplySettings {
        settings: PomodoroSettings,
    },
    Query,
}

/// A [`Command`] together with the channel receiving the settled state.
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    pub responder: OneshotSender<TimerState>,
}

/// Handle that controls a [`WorkerRoutine`].
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    requester: Sender<Request>,
    subscriptions: Subscriptions,
}

impl WorkerHandle {
    /// Creates a new [`WorkerHandle`].
    pub fn new(requester: Sender<Request>, subscriptions: Subscriptions) -> Self {
        Self {
            requester,
            subscriptions,
        }
    }

    /// Start or resume the countdown.
    pub async fn start(&self) -> TimerState {
        self.request(Command::Start).await
    }

    /// Suspend the countdown.
    pub async fn pause(&self) -> TimerState {
        self.request(Command::Pause).await
    }

    /// Discard the current cycle and go back to idle in the same phase.
    pub async fn reset(&self) -> TimerState {
        self.request(Command::Reset).await
    }

    /// Discard the current cycle and go idle in `phase`.
    pub async fn set_phase(&self, phase: TimerPhase, duration: Option<Duration>) -> TimerState {
        self.request(Command::SetPhase { phase, duration }).await
    }

    /// Replace the worker's copy of the settings.
    pub async fn apply_settings(&self, settings: PomodoroSettings) -> TimerState {
        self.request(Command::ApplySettings { settings }).await
    }

    /// Get the current state, serialized against the pending commands.
    pub async fn query(&self) -> TimerState {
        self.request(Command::Query).await
    }

    /// The latest published state, without waiting for the worker.
    pub fn snapshot(&self) -> TimerState {
        self.subscriptions.snapshot()
    }

    /// Every state published from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<TimerState> {
        self.subscriptions.states()
    }

    /// A receiver that always holds the latest published state.
    pub fn watch(&self) -> watch::Receiver<TimerState> {
        self.subscriptions.watch()
    }

    /// Every natural completion from now on.
    pub fn completions(&self) -> broadcast::Receiver<CompletedSession> {
        self.subscriptions.completions()
    }

    async fn request(&self, command: Command) -> TimerState {
        let (responder, receiver) = oneshot::channel();
        let request = Request { command, responder };

        if self.requester.send(request).await.is_err() {
            tracing::error!("Worker has stopped, answering with the last snapshot");
            return self.snapshot();
        }
        match receiver.await {
            Ok(state) => state,
            Err(_) => {
                tracing::error!("Worker dropped a request, answering with the last snapshot");
                self.snapshot()
            }
        }
    }
}
