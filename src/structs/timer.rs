use serde::{Deserialize, Serialize};

use crate::scheduler::ScheduleRef;

pub type TimerId = i64;

pub const DEFAULT_TIMER_NAME: &str = "Drink Water";

/// A daily reminder at a local time of day.
///
/// Serialized with the same field names the `notification_timers` key has
/// always used: `{id, name, hour, minute, isActive, notificationId?}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTimer {
    /// Creation timestamp in milliseconds, never reused
    pub id: TimerId,
    pub name: String,
    pub hour: u32,
    pub minute: u32,
    pub is_active: bool,

    /// Present only while a platform notification is scheduled for this timer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<ScheduleRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Inactive,
    ActiveScheduled,
    /// Flagged active, but the last schedule call failed so nothing will be
    /// delivered until the next reconciliation.
    ActiveFailed,
}

impl NotificationTimer {
    /// Falls back to [`DEFAULT_TIMER_NAME`] when `name` is blank.
    pub fn resolve_name(name: &str) -> String {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            DEFAULT_TIMER_NAME.to_owned()
        } else {
            trimmed.to_owned()
        }
    }

    pub fn status(&self) -> TimerStatus {
        match (self.is_active, &self.notification_id) {
            (false, _) => TimerStatus::Inactive,
            (true, Some(_)) => TimerStatus::ActiveScheduled,
            (true, None) => TimerStatus::ActiveFailed,
        }
    }
}
