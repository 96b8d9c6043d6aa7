//! Platform notification scheduling.
//!
//! The timer manager only ever talks to a [`NotificationScheduler`]. Two
//! backends exist: [`LocalScheduler`], which fires daily notifications from
//! tokio tasks while the process runs, and [`MemoryScheduler`], which only
//! keeps book and is used when notifications are turned off.

mod local;
mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

pub use local::LocalScheduler;
pub use memory::{MemoryScheduler, PendingEntry, SchedulerCall};

/// Opaque handle for one pending scheduled notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ScheduleRef(String);

impl ScheduleRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for ScheduleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
}

impl NotificationPayload {
    pub fn for_timer(name: &str) -> Self {
        Self {
            title: "Time to drink!".to_owned(),
            body: format!("{name}: grab a glass of water and stay hydrated."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

pub trait NotificationScheduler: Send + Sync {
    fn request_permission(&self) -> Permission;

    /// Schedules `payload` to fire every day at `hour:minute` local time.
    fn schedule_daily(
        &self,
        hour: u32,
        minute: u32,
        payload: NotificationPayload,
    ) -> Result<ScheduleRef, SchedulerError>;

    fn cancel(&self, schedule: &ScheduleRef) -> Result<(), SchedulerError>;

    /// Every pending notification the platform knows about, whoever created it.
    fn list_all_pending(&self) -> Result<Vec<ScheduleRef>, SchedulerError>;
}
