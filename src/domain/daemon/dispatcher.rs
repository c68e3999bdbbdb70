use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::daemon::outbound::{AlertPort, ProgressPort, ProgressRequest};
use crate::domain::entity::{NotificationMessage, TimerPhase, TimerState, TimerStatus};
use crate::tracing_report;

/// Minimum decrease of the remaining time between two progress refreshes.
pub const PROGRESS_THRESHOLD_MILLIS: u64 = 1_000;

/// Messages of the completion notification per phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMessages {
    pub work: NotificationMessage,
    pub short_break: NotificationMessage,
    pub long_break: NotificationMessage,
}

impl CompletionMessages {
    /// Get the message corresponding to phase.
    pub fn get(&self, phase: TimerPhase) -> &NotificationMessage {
        match phase {
            TimerPhase::Work => &self.work,
            TimerPhase::ShortBreak => &self.short_break,
            TimerPhase::LongBreak => &self.long_break,
        }
    }
}

impl Default for CompletionMessages {
    fn default() -> Self {
        Self {
            work: NotificationMessage::completion(TimerPhase::Work),
            short_break: NotificationMessage::completion(TimerPhase::ShortBreak),
            long_break: NotificationMessage::completion(TimerPhase::LongBreak),
        }
    }
}

/// Turns published states into progress and alert side effects. Everything
/// it remembers can be rebuilt from the state stream.
pub struct Dispatcher {
    progress: Arc<dyn ProgressPort>,
    alert: Arc<dyn AlertPort>,
    messages: CompletionMessages,
    last: Option<TimerState>,
    last_notified: Option<u64>,
}

impl Dispatcher {
    /// Creates a new [`Dispatcher`] with injected collaborators.
    pub fn new(
        progress: Arc<dyn ProgressPort>,
        alert: Arc<dyn AlertPort>,
        messages: CompletionMessages,
    ) -> Self {
        Self {
            progress,
            alert,
            messages,
            last: None,
            last_notified: None,
        }
    }

    /// Run on background until the state stream closes. `current` seeds the
    /// dispatcher with the state published before it subscribed.
    pub fn spawn(
        mut self,
        mut states: Receiver<TimerState>,
        current: watch::Receiver<TimerState>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let initial = *current.borrow();
            self.attach(initial).await;
            loop {
                match states.recv().await {
                    Ok(state) => self.dispatch(state).await,
                    Err(RecvError::Lagged(skipped)) => {
                        // The receiver now points at the oldest retained state,
                        // so a Completed still in the backlog is dispatched.
                        tracing::warn!(skipped, "Dispatcher lagged behind, catching up");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("Dispatcher stopped");
        })
    }

    /// Adopt a state seen for the first time without alerting for anything
    /// that happened before.
    async fn attach(&mut self, state: TimerState) {
        if state.is_running() {
            self.show(&state).await;
        }
        self.last = Some(state);
    }

    /// React to one published state.
    pub async fn dispatch(&mut self, state: TimerState) {
        let previous = self.last.replace(state);
        let was_running = previous.is_some_and(|previous| previous.is_running());

        match state.status() {
            TimerStatus::Running => {
                if !was_running || starts_new_cycle(previous.as_ref(), &state) {
                    self.show(&state).await;
                } else if self.crossed_threshold(&state) {
                    self.update(&state).await;
                }
            }
            TimerStatus::Completed => {
                let already = previous.is_some_and(|previous| previous == state);
                if !already {
                    self.complete(state.phase()).await;
                }
                self.last_notified = None;
            }
            TimerStatus::Idle | TimerStatus::Paused => {
                if was_running {
                    self.hide().await;
                }
                self.last_notified = None;
            }
        }
    }

    fn crossed_threshold(&self, state: &TimerState) -> bool {
        self.last_notified.map_or(true, |notified| {
            notified.saturating_sub(state.remaining_millis()) >= PROGRESS_THRESHOLD_MILLIS
        })
    }

    async fn show(&mut self, state: &TimerState) {
        self.last_notified = Some(state.remaining_millis());
        if let Err(err) = self.progress.show_progress(ProgressRequest::from(state)).await {
            tracing_report!(err, "Could not show progress");
        }
    }

    async fn update(&mut self, state: &TimerState) {
        self.last_notified = Some(state.remaining_millis());
        if let Err(err) = self.progress.update_progress(ProgressRequest::from(state)).await {
            tracing_report!(err, "Could not update progress");
        }
    }

    async fn hide(&self) {
        if let Err(err) = self.progress.hide_progress().await {
            tracing_report!(err, "Could not hide progress");
        }
    }

    async fn complete(&self, phase: TimerPhase) {
        let message = self.messages.get(phase);
        if let Err(err) = self.alert.alert_complete(phase, message).await {
            tracing_report!(err, "Could not raise completion alert");
        }
        self.hide().await;
    }
}

/// A running state that cannot follow from `previous` by ticking alone.
fn starts_new_cycle(previous: Option<&TimerState>, state: &TimerState) -> bool {
    previous.map_or(true, |previous| {
        previous.phase() != state.phase()
            || previous.total_millis() != state.total_millis()
            || previous.remaining_millis() < state.remaining_millis()
    })
}
