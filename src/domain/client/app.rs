use std::sync::Arc;

use tokio::time::Duration;

use crate::domain::client::outbound::{
    InitPort, PausePort, QueryPort, ResetPort, SetPhasePort, SettingsPort, StartPort, StatsPort,
    WatchPort,
};
use crate::domain::entity::TimerState;

/// Upper bound of waiting for a snapshot from the daemon.
pub const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(2);

/// Entrance to the domain logic, providing ports for external adapters.
pub struct ApplicationCore {
    pub init: Arc<dyn InitPort>,
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
    /// Take a snapshot of the daemon's state within [`SNAPSHOT_TIMEOUT`].
    ///
    /// Never fails: an unreachable daemon, a broken reply or a late reply all
    /// resolve to [`TimerState::default`].
    pub async fn snapshot(&self) -> TimerState {
        snapshot_within(self.query.as_ref(), SNAPSHOT_TIMEOUT).await
    }
}

/// Ask `query` for the current state, falling back to the default state when
/// no valid answer arrives within `timeout`.
pub async fn snapshot_within(query: &dyn QueryPort, timeout: Duration) -> TimerState {
    match tokio::time::timeout(timeout, query.query()).await {
        Ok(Ok(state)) => state,
        Ok(Err(err)) => {
            tracing::warn!(%err, "Could not query daemon, using default state");
            TimerState::default()
        }
        Err(_) => {
            tracing::warn!(?timeout, "Query timed out, using default state");
            TimerState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::client::outbound::{MockQueryPort, RequestDaemonError};
    use crate::domain::entity::TimerPhase;

    struct PendingQuery;

    #[async_trait::async_trait]
    impl QueryPort for PendingQuery {
        async fn query(&self) -> Result<TimerState, RequestDaemonError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn snapshot_within_success() {
        let state = TimerState::running(TimerPhase::LongBreak, 60_000, 900_000);
        let mut query = MockQueryPort::new();
        query.expect_query().times(1).returning(move || Ok(state));

        assert_eq!(snapshot_within(&query, SNAPSHOT_TIMEOUT).await, state);
    }

    #[tokio::test]
    async fn snapshot_within_error_falls_back() {
        let mut query = MockQueryPort::new();
        query.expect_query().times(1).returning(|| {
            Err(RequestDaemonError::Unavailable {
                endpoint: "pomowatch.socket".to_owned(),
            })
        });

        assert_eq!(
            snapshot_within(&query, SNAPSHOT_TIMEOUT).await,
            TimerState::idle(TimerPhase::Work, 1_500_000)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_within_timeout_falls_back() {
        let started = tokio::time::Instant::now();
        let state = snapshot_within(&PendingQuery, SNAPSHOT_TIMEOUT).await;
        assert_eq!(state, TimerState::default());
        assert_eq!(started.elapsed(), SNAPSHOT_TIMEOUT);
    }
}
