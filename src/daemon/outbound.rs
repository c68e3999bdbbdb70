use std::sync::Mutex;

use notify_rust::{Hint, Notification, NotificationHandle, Timeout, Urgency};
use snafu::prelude::*;

use crate::domain::daemon::outbound::{
    AlertPort, AlertRequest, ProgressPort, ProgressRequest, SideEffectError,
};
use crate::utils::time::format_clock;

const ALERT_SOUND: &str = "alarm-clock-elapsed";

/// Desktop notifications for the countdown. The progress indication is a
/// single persistent notification replaced in place on every update.
pub struct NotifyService {
    app_name: String,
    progress: Mutex<Option<NotificationHandle>>,
}

impl NotifyService {
    pub fn new(app_name: String) -> Self {
        Self {
            app_name,
            progress: Mutex::new(None),
        }
    }

    fn progress_notification(&self, request: &ProgressRequest) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&request.phase.to_string())
            .body(&progress_body(request))
            .hint(Hint::CustomInt("value".to_owned(), i32::from(request.percent())))
            .hint(Hint::Transient(true))
            .urgency(Urgency::Low)
            .timeout(Timeout::Never);
        notification
    }

    fn shown_id(&self) -> Option<u32> {
        self.lock_progress().as_ref().map(NotificationHandle::id)
    }

    fn lock_progress(&self) -> std::sync::MutexGuard<'_, Option<NotificationHandle>> {
        // The guarded handle stays consistent even if a holder panicked.
        self.progress
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn show(&self, request: ProgressRequest) -> Result<(), SideEffectError> {
        let mut notification = self.progress_notification(&request);
        if let Some(id) = self.shown_id() {
            notification.id(id);
        }

        let handle = whatever!(
            notification.show_async().await,
            "Could not show progress notification"
        );
        *self.lock_progress() = Some(handle);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProgressPort for NotifyService {
    async fn show_progress(&self, request: ProgressRequest) -> Result<(), SideEffectError> {
        self.show(request).await
    }

    async fn update_progress(&self, request: ProgressRequest) -> Result<(), SideEffectError> {
        if self.shown_id().is_none() {
            tracing::debug!("Progress is not shown, skipping update");
            return Ok(());
        }
        self.show(request).await
    }

    async fn hide_progress(&self) -> Result<(), SideEffectError> {
        let Some(handle) = self.lock_progress().take() else {
            return Ok(());
        };
        whatever!(
            tokio::task::spawn_blocking(move || handle.close()).await,
            "Could not close progress notification"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl AlertPort for NotifyService {
    async fn alert_impl(&self, request: AlertRequest) -> Result<(), SideEffectError> {
        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&request.summary)
            .urgency(Urgency::Critical)
            .hint(Hint::SoundName(ALERT_SOUND.to_owned()));

        if let Some(body) = &request.body {
            notification.body(body);
        }

        tracing::debug!(phase = %request.phase, vibration = ?request.vibration, "Raising alert");
        whatever!(
            notification.show_async().await,
            "Could not show completion notification"
        );
        Ok(())
    }
}

/// Body text such as `12:34 remaining (49%)`.
fn progress_body(request: &ProgressRequest) -> String {
    format!(
        "{} remaining ({}%)",
        format_clock(request.remaining),
        request.percent()
    )
}
