use tokio::time::{Duration, Instant, Interval};

use crate::domain::daemon::worker::handle::{Command, Request};
use crate::domain::daemon::worker::routine::WorkerContext;
use crate::domain::entity::{CompletedSession, TimerPhase, TimerState};

#[derive(Debug)]
#[repr(transparent)]
pub struct WorkerState {
    inner: Option<WorkerStateInner>,
}

impl WorkerState {
    /// Creates a new [`WorkerState`] idle like `initial`.
    pub fn new(initial: TimerState) -> Self {
        Self {
            inner: Some(
                IdleState {
                    phase: initial.phase(),
                    total: initial.total_millis(),
                }
                .into(),
            ),
        }
    }

    /// Do the business logic based on its inner state.
    pub async fn run(&mut self, context: &mut WorkerContext) {
        self.inner = match self.inner.take() {
            Some(inner) => Some(inner.run(context).await),
            None => unreachable!("`WorkerState`'s inner should not be `None`"),
        };
    }

    /// Returns `true` if is stopped of this [`WorkerState`].
    pub fn is_stopped(&self) -> bool {
        matches!(self.inner, Some(WorkerStateInner::Stopped(_)))
    }
}

#[enum_dispatch::enum_dispatch]
trait StateRun {
    /// Wait for the next event and settle on the following state.
    async fn run(self, context: &mut WorkerContext) -> WorkerStateInner;

    /// The externally visible form of this state.
    fn snapshot(&self) -> TimerState;
}

/// Actual implementation of running state of [`WorkerRoutine`].
#[derive(Debug)]
#[enum_dispatch::enum_dispatch(StateRun)]
enum WorkerStateInner {
    Idle(IdleState),
    Running(RunningState),
    Paused(PausedState),
    Completed(CompletedState),
    Stopped(StoppedState),
}

/// Apply one request and answer with the settled state.
fn settle<S, F>(
    state: S,
    request: Request,
    context: &mut WorkerContext,
    handle: F,
) -> WorkerStateInner
where
    F: FnOnce(S, Command, &mut WorkerContext) -> WorkerStateInner,
{
    let Request { command, responder } = request;
    tracing::debug!(?command, "Received command");
    let next = handle(state, command, context);
    let _ = responder.send(next.snapshot());
    next
}

/// Go idle in `phase`, with a fresh total from the settings unless `custom`
/// is given.
fn enter_idle(
    context: &mut WorkerContext,
    phase: TimerPhase,
    custom: Option<Duration>,
) -> WorkerStateInner {
    let total = context.total_millis(phase, custom);
    let state = IdleState { phase, total };
    context.publisher.publish(state.snapshot());
    state.into()
}

/// Begin a countdown loop. The first tick fires one interval from now.
fn enter_running(
    context: &mut WorkerContext,
    phase: TimerPhase,
    remaining: u64,
    total: u64,
) -> WorkerStateInner {
    let timer = tokio::time::interval_at(Instant::now() + context.tick, context.tick);
    let state = RunningState {
        phase,
        remaining,
        total,
        timer,
    };
    context.publisher.publish(state.snapshot());
    tracing::info!(%phase, remaining, "Countdown running");
    state.into()
}

/// A state which indicates that a fresh cycle waits to be started.
#[derive(Debug)]
struct IdleState {
    phase: TimerPhase,
    total: u64,
}

impl StateRun for IdleState {
    async fn run(self, context: &mut WorkerContext) -> WorkerStateInner {
        match context.requests.recv().await {
            Some(request) => settle(self, request, context, Self::handle),
            None => StoppedState::from(self.snapshot()).into(),
        }
    }

    fn snapshot(&self) -> TimerState {
        TimerState::idle(self.phase, self.total)
    }
}

impl IdleState {
    fn handle(self, command: Command, context: &mut WorkerContext) -> WorkerStateInner {
        match command {
            Command::Start => enter_running(context, self.phase, self.total, self.total),
            Command::Pause | Command::Query => self.into(),
            Command::Reset => enter_idle(context, self.phase, None),
            Command::SetPhase { phase, duration } => enter_idle(context, phase, duration),
            Command::ApplySettings { settings } => {
                context.settings = settings;
                enter_idle(context, self.phase, None)
            }
        }
    }
}

/// A state which indicates that the countdown is running, with a timer
/// working internally. Dropping this state drops the timer, so a cancelled
/// loop can never tick again.
#[derive(Debug)]
struct RunningState {
    phase: TimerPhase,
    remaining: u64,
    total: u64,
    timer: Interval,
}

impl StateRun for RunningState {
    async fn run(mut self, context: &mut WorkerContext) -> WorkerStateInner {
        tokio::select! {
            biased;
            request = context.requests.recv() => match request {
                Some(request) => settle(self, request, context, Self::handle),
                None => StoppedState::from(self.snapshot()).into(),
            },
            _ = self.timer.tick() => self.handle_tick(context),
        }
    }

    fn snapshot(&self) -> TimerState {
        TimerState::running(self.phase, self.remaining, self.total)
    }
}

impl RunningState {
    fn handle(self, command: Command, context: &mut WorkerContext) -> WorkerStateInner {
        match command {
            Command::Start | Command::Query => self.into(),
            Command::Pause => {
                let state = PausedState {
                    phase: self.phase,
                    remaining: self.remaining,
                    total: self.total,
                };
                context.publisher.publish(state.snapshot());
                tracing::info!(phase = %self.phase, remaining = self.remaining, "Countdown paused");
                state.into()
            }
            Command::Reset => enter_idle(context, self.phase, None),
            Command::SetPhase { phase, duration } => enter_idle(context, phase, duration),
            Command::ApplySettings { settings } => {
                context.settings = settings;
                self.into()
            }
        }
    }

    fn handle_tick(mut self, context: &mut WorkerContext) -> WorkerStateInner {
        self.remaining = self.remaining.saturating_sub(context.tick_millis());
        if self.remaining > 0 {
            context.publisher.publish(self.snapshot());
            return self.into();
        }

        let state = CompletedState {
            phase: self.phase,
            total: self.total,
        };
        context.publisher.publish(state.snapshot());
        context.publisher.complete(CompletedSession {
            phase: self.phase,
            duration_millis: self.total,
        });
        tracing::info!(phase = %self.phase, "Countdown completed");
        state.into()
    }
}

/// A state which indicates that the countdown is suspended. The remaining
/// time is frozen at the last processed tick.
#[derive(Debug)]
struct PausedState {
    phase: TimerPhase,
    remaining: u64,
    total: u64,
}

impl StateRun for PausedState {
    async fn run(self, context: &mut WorkerContext) -> WorkerStateInner {
        match context.requests.recv().await {
            Some(request) => settle(self, request, context, Self::handle),
            None => StoppedState::from(self.snapshot()).into(),
        }
    }

    fn snapshot(&self) -> TimerState {
        TimerState::paused(self.phase, self.remaining, self.total)
    }
}

impl PausedState {
    fn handle(self, command: Command, context: &mut WorkerContext) -> WorkerStateInner {
        match command {
            Command::Start => enter_running(context, self.phase, self.remaining, self.total),
            Command::Pause | Command::Query => self.into(),
            Command::Reset => enter_idle(context, self.phase, None),
            Command::SetPhase { phase, duration } => enter_idle(context, phase, duration),
            Command::ApplySettings { settings } => {
                context.settings = settings;
                self.into()
            }
        }
    }
}

/// A state which indicates that the countdown reached zero.
#[derive(Debug)]
struct CompletedState {
    phase: TimerPhase,
    total: u64,
}

impl StateRun for CompletedState {
    async fn run(self, context: &mut WorkerContext) -> WorkerStateInner {
        match context.requests.recv().await {
            Some(request) => settle(self, request, context, Self::handle),
            None => StoppedState::from(self.snapshot()).into(),
        }
    }

    fn snapshot(&self) -> TimerState {
        TimerState::completed(self.phase, self.total)
    }
}

impl CompletedState {
    fn handle(self, command: Command, context: &mut WorkerContext) -> WorkerStateInner {
        match command {
            Command::Start => {
                let total = context.total_millis(self.phase, None);
                context.publisher.publish(TimerState::idle(self.phase, total));
                enter_running(context, self.phase, total, total)
            }
            Command::Pause | Command::Query => self.into(),
            Command::Reset => enter_idle(context, self.phase, None),
            Command::SetPhase { phase, duration } => enter_idle(context, phase, duration),
            Command::ApplySettings { settings } => {
                context.settings = settings;
                self.into()
            }
        }
    }
}

/// A state which indicates that every [`WorkerHandle`] is gone and the
/// [`WorkerRoutine`] should stop running.
#[derive(Debug)]
struct StoppedState {
    last: TimerState,
}

impl From<TimerState> for StoppedState {
    fn from(last: TimerState) -> Self {
        Self { last }
    }
}

impl StateRun for StoppedState {
    async fn run(self, _context: &mut WorkerContext) -> WorkerStateInner {
        self.into()
    }

    fn snapshot(&self) -> TimerState {
        self.last
    }
}
