use tracing::{info, instrument};

use crate::{error::SchedulerError, scheduler::NotificationPayload};

/// Shows a notification right now.
pub trait Notifier: Send + Sync {
    fn deliver(&self, payload: &NotificationPayload) -> Result<(), SchedulerError>;
}

/// Native desktop notifications on macOS and Windows. Elsewhere the
/// notification only goes to the log.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    app_id: String,
}

impl DesktopNotifier {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("fyi.angelo.hydrate-reminder")
    }
}

impl Notifier for DesktopNotifier {
    #[instrument(skip(self))]
    fn deliver(&self, payload: &NotificationPayload) -> Result<(), SchedulerError> {
        #[cfg(target_os = "macos")]
        {
            mac_notification_sys::Notification::new()
                .title(&payload.title)
                .message(&payload.body)
                .send()
                .map_err(|e| SchedulerError::Delivery(e.to_string()))?;
        }

        #[cfg(target_os = "windows")]
        {
            winrt_notification::Toast::new(&self.app_id)
                .title(&payload.title)
                .text1(&payload.body)
                .duration(winrt_notification::Duration::Short)
                .sound(None)
                .show()
                .map_err(|e| SchedulerError::Delivery(e.to_string()))?;
        }

        // TODO: Add Linux support through the freedesktop notification spec
        info!(title = %payload.title, body = %payload.body, "Drink notification");

        Ok(())
    }
}
