use std::sync::Arc;

use snafu::prelude::*;

use crate::daemon::config::Configuration;
use crate::domain::entity::{NotificationMessage, TimerPhase};
use crate::domain::repository::notification::{GetNotificationError, InvalidSnafu};
use crate::domain::repository::NotificationRepository;

/// A [`NotificationRepository`] implementation which reads configuration files.
pub struct NotificationConfiguration {
    config: Arc<Configuration>,
}

impl NotificationConfiguration {
    /// Creates a new [`NotificationConfiguration`].
    pub fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl NotificationRepository for NotificationConfiguration {
    async fn completion_notification(
        &self,
        phase: TimerPhase,
    ) -> Result<NotificationMessage, GetNotificationError> {
        let section = self.config.notification.get(phase).clone();
        NotificationMessage::try_new(section.summary, section.body).context(InvalidSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = r#"
        [notification.work]
        summary = "Done"
        body = "Stretch a little"
        [notification.short_break]
        summary = "   "
        [notification.long_break]
        summary = "Back"
    "#;

    fn repository() -> NotificationConfiguration {
        NotificationConfiguration::new(Arc::new(toml::from_str(CONTENT).unwrap()))
    }

    #[tokio::test]
    async fn notification_configuration_get() {
        let message = repository()
            .completion_notification(TimerPhase::Work)
            .await
            .unwrap();
        assert_eq!(message.summary(), "Done");
        assert_eq!(message.body(), Some("Stretch a little"));

        let message = repository()
            .completion_notification(TimerPhase::LongBreak)
            .await
            .unwrap();
        assert_eq!(message.body(), None);
    }

    #[tokio::test]
    async fn notification_configuration_error_invalid() {
        assert!(matches!(
            repository()
                .completion_notification(TimerPhase::ShortBreak)
                .await,
            Err(GetNotificationError::Invalid { .. })
        ));
    }
}
