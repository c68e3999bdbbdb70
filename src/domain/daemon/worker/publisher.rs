use tokio::sync::{broadcast, watch};

use crate::domain::entity::{CompletedSession, TimerState};

/// Capacity of the ordered state stream. Slow subscribers lag behind and skip
/// the oldest states, but the latest ones stay buffered.
const STATE_CAPACITY: usize = 64;
const COMPLETION_CAPACITY: usize = 16;

/// Writing half of everything the worker publishes. Only the worker owns it.
#[derive(Debug)]
pub struct Publisher {
    current: watch::Sender<TimerState>,
    states: broadcast::Sender<TimerState>,
    completions: broadcast::Sender<CompletedSession>,
}

impl Publisher {
    /// Creates a [`Publisher`] seeded with `initial`, together with the
    /// reading half handed out to observers.
    pub fn new(initial: TimerState) -> (Self, Subscriptions) {
        let (current, snapshot) = watch::channel(initial);
        let (states, _) = broadcast::channel(STATE_CAPACITY);
        let (completions, _) = broadcast::channel(COMPLETION_CAPACITY);

        let subscriptions = Subscriptions {
            snapshot,
            states: states.clone(),
            completions: completions.clone(),
        };
        let publisher = Self {
            current,
            states,
            completions,
        };
        (publisher, subscriptions)
    }

    /// Replace the snapshot and append `state` to the ordered stream.
    pub fn publish(&self, state: TimerState) {
        debug_assert!(state.remaining_millis() <= state.total_millis());
        self.current.send_replace(state);
        // Having no subscriber at the moment is fine.
        let _ = self.states.send(state);
        tracing::trace!(%state, "Published timer state");
    }

    /// Announce a natural completion to the statistics consumers.
    pub fn complete(&self, session: CompletedSession) {
        let _ = self.completions.send(session);
    }
}

/// Reading half of the worker's publications.
#[derive(Debug, Clone)]
pub struct Subscriptions {
    snapshot: watch::Receiver<TimerState>,
    states: broadcast::Sender<TimerState>,
    completions: broadcast::Sender<CompletedSession>,
}

impl Subscriptions {
    /// The latest published state.
    pub fn snapshot(&self) -> TimerState {
        *self.snapshot.borrow()
    }

    /// A receiver that always holds the latest published state.
    pub fn watch(&self) -> watch::Receiver<TimerState> {
        self.snapshot.clone()
    }

    /// Every state published from now on, in order.
    pub fn states(&self) -> broadcast::Receiver<TimerState> {
        self.states.subscribe()
    }

    /// Every natural completion from now on.
    pub fn completions(&self) -> broadcast::Receiver<CompletedSession> {
        self.completions.subscribe()
    }
}
