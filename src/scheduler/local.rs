use std::{collections::HashMap, sync::Arc, sync::Mutex};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, instrument, trace, warn};

use super::{NotificationPayload, NotificationScheduler, Permission, ScheduleRef};
use crate::{
    clock::{next_occurrence, Clock},
    error::SchedulerError,
    notifier::Notifier,
};

/// Fires daily notifications from tokio tasks, one task per schedule.
///
/// Schedules only live as long as the process; `list_all_pending` starts out
/// empty after every restart, which is why the timer manager reschedules
/// every active timer on load.
pub struct LocalScheduler {
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    tasks: Mutex<HashMap<ScheduleRef, JoinHandle<()>>>,
}

impl LocalScheduler {
    pub fn new(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            clock,
            notifier,
            tasks: Mutex::new(HashMap::new()),
        }
    }
}

impl Drop for LocalScheduler {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }
}

#[instrument(skip(clock, notifier, payload))]
async fn daily_notification(
    schedule: ScheduleRef,
    hour: u32,
    minute: u32,
    payload: NotificationPayload,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
) {
    loop {
        let now = clock.now();
        let wait = next_occurrence(now, hour, minute) - now;
        trace!("Seconds until next notification: {}", wait.num_seconds());

        // `next_occurrence` is strictly in the future, so this never spins
        tokio::time::sleep(wait.to_std().unwrap_or_default()).await;

        if let Err(e) = notifier.deliver(&payload) {
            warn!("Unable to show drink notification: {e}");
        }
    }
}

impl NotificationScheduler for LocalScheduler {
    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn schedule_daily(
        &self,
        hour: u32,
        minute: u32,
        payload: NotificationPayload,
    ) -> Result<ScheduleRef, SchedulerError> {
        let runtime = Handle::try_current()
            .map_err(|e| SchedulerError::Unavailable(e.to_string()))?;

        let schedule = ScheduleRef::new(format!("local-{}", uuid::Uuid::new_v4()));
        let handle = runtime.spawn(daily_notification(
            schedule.clone(),
            hour,
            minute,
            payload,
            self.clock.clone(),
            self.notifier.clone(),
        ));

        debug!(%schedule, hour, minute, "Scheduled daily notification");
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(schedule.clone(), handle);

        Ok(schedule)
    }

    fn cancel(&self, schedule: &ScheduleRef) -> Result<(), SchedulerError> {
        if let Some(handle) = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(schedule)
        {
            handle.abort();
            debug!(%schedule, "Cancelled daily notification");
        }
        Ok(())
    }

    fn list_all_pending(&self) -> Result<Vec<ScheduleRef>, SchedulerError> {
        let mut pending: Vec<ScheduleRef> = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(schedule, _)| schedule.clone())
            .collect();
        pending.sort();
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use tokio::sync::mpsc;

    use super::*;
    use crate::clock::ManualClock;

    struct ChannelNotifier(mpsc::UnboundedSender<NotificationPayload>);

    impl Notifier for ChannelNotifier {
        fn deliver(&self, payload: &NotificationPayload) -> Result<(), SchedulerError> {
            self.0
                .send(payload.clone())
                .map_err(|e| SchedulerError::Delivery(e.to_string()))
        }
    }

    fn morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    }

    fn scheduler() -> (LocalScheduler, mpsc::UnboundedReceiver<NotificationPayload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = LocalScheduler::new(
            Arc::new(ManualClock::new(morning())),
            Arc::new(ChannelNotifier(tx)),
        );
        (scheduler, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_at_the_scheduled_time() {
        let (scheduler, mut rx) = scheduler();
        let start = tokio::time::Instant::now();

        scheduler
            .schedule_daily(8, 0, NotificationPayload::for_timer("Morning"))
            .unwrap();

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered, NotificationPayload::for_timer("Morning"));
        assert_eq!(start.elapsed(), std::time::Duration::from_secs(60 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_task() {
        let (scheduler, mut rx) = scheduler();

        let schedule = scheduler
            .schedule_daily(8, 0, NotificationPayload::for_timer("Morning"))
            .unwrap();
        assert_eq!(scheduler.list_all_pending().unwrap(), vec![schedule.clone()]);

        scheduler.cancel(&schedule).unwrap();
        assert!(scheduler.list_all_pending().unwrap().is_empty());

        tokio::time::sleep(std::time::Duration::from_secs(2 * 60 * 60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn scheduling_outside_a_runtime_fails() {
        let (scheduler, _rx) = scheduler();
        let result = scheduler.schedule_daily(8, 0, NotificationPayload::for_timer("x"));
        assert!(matches!(result, Err(SchedulerError::Unavailable(_))));
    }
}
