use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;

use crate::domain::entity::{CompletedSession, DailyStats};
use crate::domain::repository::stats::{StatsRepository, StatsStoreError};
use crate::tracing_report;

/// Source of the current calendar day.
pub type Calendar = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Persists every natural completion into today's statistics. Day rollover
/// happens lazily whenever the stored day differs from today.
pub struct StatsRecorder {
    repository: Arc<dyn StatsRepository>,
    today: Calendar,
}

impl StatsRecorder {
    /// Creates a [`StatsRecorder`] following the local calendar.
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self::with_calendar(repository, Box::new(|| Local::now().date_naive()))
    }

    /// Creates a [`StatsRecorder`] following `today`.
    pub fn with_calendar(repository: Arc<dyn StatsRepository>, today: Calendar) -> Self {
        Self { repository, today }
    }

    /// Today's statistics, empty if nothing was recorded today yet.
    ///
    /// # Errors
    ///
    /// This function will return an error if the store could not be read.
    pub async fn current(&self) -> Result<DailyStats, StatsStoreError> {
        let today = (self.today)();
        let stats = self.repository.load().await?;
        Ok(stats.map_or_else(|| DailyStats::empty(today), |stats| stats.on(today)))
    }

    /// Add one completed session to today's statistics.
    ///
    /// # Errors
    ///
    /// This function will return an error if the store could not be read or
    /// written.
    pub async fn record(&self, session: CompletedSession) -> Result<DailyStats, StatsStoreError> {
        let mut stats = self.current().await?;
        stats.record(&session);
        self.repository.save(&stats).await?;
        tracing::info!(
            phase = %session.phase,
            sessions = stats.completed_sessions(),
            "Recorded completed session"
        );
        Ok(stats)
    }

    /// Record completions on background until the stream closes.
    pub fn spawn(self: Arc<Self>, mut completions: Receiver<CompletedSession>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match completions.recv().await {
                    Ok(session) => {
                        if let Err(err) = self.record(session).await {
                            tracing_report!(err, "Could not record completed session");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Dropped completed sessions");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use crate::domain::entity::TimerPhase;
    use crate::domain::repository::stats::MockStatsRepository;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn new_recorder(
        stored: Option<DailyStats>,
        today: u32,
    ) -> (StatsRecorder, Arc<Mutex<Vec<DailyStats>>>) {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let mut repository = MockStatsRepository::new();
        repository.expect_load().returning(move || Ok(stored));
        let sink = Arc::clone(&saved);
        repository.expect_save().returning(move |stats| {
            sink.lock().unwrap().push(*stats);
            Ok(())
        });

        let recorder =
            StatsRecorder::with_calendar(Arc::new(repository), Box::new(move || date(today)));
        (recorder, saved)
    }

    #[tokio::test]
    async fn stats_recorder_record() {
        let (recorder, saved) = new_recorder(None, 5);
        let stats = recorder
            .record(CompletedSession {
                phase: TimerPhase::Work,
                duration_millis: 1_500_000,
            })
            .await
            .unwrap();

        assert_eq!(stats.date(), date(5));
        assert_eq!(stats.completed_sessions(), 1);
        assert_eq!(stats.total_work_millis(), 1_500_000);
        assert_eq!(saved.lock().unwrap().as_slice(), &[stats]);
    }

    #[tokio::test]
    async fn stats_recorder_rolls_over() {
        let mut yesterday = DailyStats::empty(date(4));
        yesterday.record(&CompletedSession {
            phase: TimerPhase::Work,
            duration_millis: 1_500_000,
        });
        let (recorder, _) = new_recorder(Some(yesterday), 5);

        assert_eq!(recorder.current().await.unwrap(), DailyStats::empty(date(5)));

        let stats = recorder
            .record(CompletedSession {
                phase: TimerPhase::ShortBreak,
                duration_millis: 300_000,
            })
            .await
            .unwrap();
        assert_eq!(stats.completed_sessions(), 1);
        assert_eq!(stats.total_work_millis(), 0);
        assert_eq!(stats.total_break_millis(), 300_000);
    }

    #[tokio::test]
    async fn stats_recorder_spawn() {
        let (recorder, saved) = new_recorder(None, 5);
        let (sender, completions) = tokio::sync::broadcast::channel(4);
        let task = Arc::new(recorder).spawn(completions);

        sender
            .send(CompletedSession {
                phase: TimerPhase::LongBreak,
                duration_millis: 900_000,
            })
            .unwrap();
        drop(sender);
        task.await.unwrap();

        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].total_break_millis(), 900_000);
    }
}
