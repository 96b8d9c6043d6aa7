use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Mutex,
    },
};

use tracing::trace;

use super::{NotificationPayload, NotificationScheduler, Permission, ScheduleRef};
use crate::error::SchedulerError;

/// Every call made against a [`MemoryScheduler`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
    RequestPermission,
    Schedule { hour: u32, minute: u32 },
    Cancel(ScheduleRef),
    ListAllPending,
}

#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub hour: u32,
    pub minute: u32,
    pub payload: NotificationPayload,
}

/// Bookkeeping-only scheduler. Nothing is ever delivered.
#[derive(Default)]
pub struct MemoryScheduler {
    next_id: AtomicU64,
    deny_permission: AtomicBool,
    fail_schedules: AtomicBool,
    pending: Mutex<BTreeMap<ScheduleRef, PendingEntry>>,
    calls: Mutex<Vec<SchedulerCall>>,
}

impl MemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `schedule_daily` call fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail_schedules.store(failing, Ordering::SeqCst);
    }

    pub fn set_permission_denied(&self, denied: bool) {
        self.deny_permission.store(denied, Ordering::SeqCst);
    }

    /// Registers a notification that was not created through this crate.
    pub fn insert_foreign(&self, schedule: ScheduleRef, hour: u32, minute: u32) {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).insert(
            schedule,
            PendingEntry {
                hour,
                minute,
                payload: NotificationPayload {
                    title: String::new(),
                    body: String::new(),
                },
            },
        );
    }

    pub fn pending(&self) -> BTreeMap<ScheduleRef, PendingEntry> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn cancel_calls(&self) -> Vec<ScheduleRef> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SchedulerCall::Cancel(schedule) => Some(schedule),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn record(&self, call: SchedulerCall) {
        trace!(?call, "Scheduler call");
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl NotificationScheduler for MemoryScheduler {
    fn request_permission(&self) -> Permission {
        self.record(SchedulerCall::RequestPermission);
        if self.deny_permission.load(Ordering::SeqCst) {
            Permission::Denied
        } else {
            Permission::Granted
        }
    }

    fn schedule_daily(
        &self,
        hour: u32,
        minute: u32,
        payload: NotificationPayload,
    ) -> Result<ScheduleRef, SchedulerError> {
        self.record(SchedulerCall::Schedule { hour, minute });
        if self.fail_schedules.load(Ordering::SeqCst) {
            return Err(SchedulerError::Unavailable(
                "memory scheduler set to fail".to_owned(),
            ));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let schedule = ScheduleRef::new(format!("memory-{n}"));
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).insert(
            schedule.clone(),
            PendingEntry {
                hour,
                minute,
                payload,
            },
        );

        Ok(schedule)
    }

    fn cancel(&self, schedule: &ScheduleRef) -> Result<(), SchedulerError> {
        self.record(SchedulerCall::Cancel(schedule.clone()));
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(schedule);
        Ok(())
    }

    fn list_all_pending(&self) -> Result<Vec<ScheduleRef>, SchedulerError> {
        self.record(SchedulerCall::ListAllPending);
        Ok(self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect())
    }
}
