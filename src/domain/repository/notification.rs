use std::error::Error as StdError;

use snafu::prelude::*;

use crate::domain::entity::notification::{NotificationMessage, TryNewNotificationMessageError};
use crate::domain::entity::TimerPhase;

/// An abstract interface for accessing completion notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NotificationRepository: Send + Sync + 'static {
    /// Get the message shown when `phase` completes.
    ///
    /// # Errors
    ///
    /// This function will return an error if failed to get the message.
    async fn completion_notification(
        &self,
        phase: TimerPhase,
    ) -> Result<NotificationMessage, GetNotificationError>;
}

/// An error type of accessing the repository of [`NotificationMessage`]s.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum GetNotificationError {
    #[snafu(display("Could not create an invalid notification"))]
    #[non_exhaustive]
    Invalid {
        source: TryNewNotificationMessageError,
    },
    #[snafu(whatever, display("Load notification failed: {message}"))]
    #[non_exhaustive]
    Unknown {
        message: String,
        #[snafu(source(from(Box<dyn StdError + Send + Sync>, Some)))]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notification_repository_get() {
        let mock = init_mock();
        assert_eq!(
            mock.completion_notification(TimerPhase::Work).await.unwrap(),
            NotificationMessage::try_new("summary".into(), Some("body".into())).unwrap()
        );
        assert!(mock
            .completion_notification(TimerPhase::LongBreak)
            .await
            .is_err());
    }

    fn init_mock() -> MockNotificationRepository {
        let mut mock = MockNotificationRepository::new();
        mock.expect_completion_notification()
            .withf(|phase| *phase == TimerPhase::Work)
            .returning(|_| {
                Ok(NotificationMessage::try_new("summary".into(), Some("body".into())).unwrap())
            });
        mock.expect_completion_notification()
            .returning(|_| whatever!("missing"));
        mock
    }
}
