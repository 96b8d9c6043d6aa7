use tracing::{debug, warn};

use crate::{
    scheduler::{NotificationPayload, NotificationScheduler, ScheduleRef},
    structs::timer::{NotificationTimer, TimerId},
};

/// What it takes to bring the scheduler in line with the stored timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Every pending notification, including ones this crate did not create.
    pub cancel: Vec<ScheduleRef>,
    /// Active timers to schedule afresh, in list order.
    pub schedule: Vec<TimerId>,
    /// Inactive timers still holding a stale reference.
    pub clear: Vec<TimerId>,
}

/// Plans a full wipe followed by one fresh schedule per active timer.
pub fn reconcile(pending: &[ScheduleRef], timers: &[NotificationTimer]) -> ReconcilePlan {
    ReconcilePlan {
        cancel: pending.to_vec(),
        schedule: timers
            .iter()
            .filter(|timer| timer.is_active)
            .map(|timer| timer.id)
            .collect(),
        clear: timers
            .iter()
            .filter(|timer| !timer.is_active && timer.notification_id.is_some())
            .map(|timer| timer.id)
            .collect(),
    }
}

/// Runs `plan` against `scheduler`. Every failure is logged and skipped.
pub fn apply_plan(
    plan: &ReconcilePlan,
    scheduler: &dyn NotificationScheduler,
    mut timers: Vec<NotificationTimer>,
) -> Vec<NotificationTimer> {
    for schedule in &plan.cancel {
        if let Err(e) = scheduler.cancel(schedule) {
            warn!(%schedule, "Unable to cancel pending notification: {e}");
        }
    }

    for timer in &mut timers {
        if plan.clear.contains(&timer.id) {
            timer.notification_id = None;
        }

        if plan.schedule.contains(&timer.id) {
            let payload = NotificationPayload::for_timer(&timer.name);
            let scheduled = scheduler.schedule_daily(timer.hour, timer.minute, payload);
            timer.notification_id = match scheduled {
                Ok(schedule) => Some(schedule),
                Err(e) => {
                    warn!(id = timer.id, "Unable to reschedule timer: {e}");
                    None
                }
            };
        }
    }

    debug!(
        cancelled = plan.cancel.len(),
        scheduled = plan.schedule.len(),
        "Reconciled timers with scheduler"
    );
    timers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scheduler::MemoryScheduler, structs::timer::TimerStatus};

    fn timer(id: TimerId, is_active: bool, notification_id: Option<&str>) -> NotificationTimer {
        NotificationTimer {
            id,
            name: format!("timer {id}"),
            hour: 8,
            minute: id as u32,
            is_active,
            notification_id: notification_id.map(ScheduleRef::new),
        }
    }

    #[test]
    fn plan_wipes_everything_and_reschedules_active() {
        let pending = vec![ScheduleRef::new("ours"), ScheduleRef::new("someone-elses")];
        let timers = vec![
            timer(1, true, Some("ours")),
            timer(2, false, Some("stale")),
            timer(3, true, None),
            timer(4, false, None),
        ];

        let plan = reconcile(&pending, &timers);
        assert_eq!(plan.cancel, pending);
        assert_eq!(plan.schedule, vec![1, 3]);
        assert_eq!(plan.clear, vec![2]);
    }

    #[test]
    fn planning_is_idempotent() {
        let pending = vec![ScheduleRef::new("a")];
        let timers = vec![timer(1, true, Some("a")), timer(2, false, None)];

        assert_eq!(reconcile(&pending, &timers), reconcile(&pending, &timers));
    }

    #[test]
    fn applying_leaves_one_ref_per_active_timer() {
        let scheduler = MemoryScheduler::new();
        scheduler.insert_foreign(ScheduleRef::new("foreign"), 6, 0);
        let timers = vec![
            timer(1, true, Some("old")),
            timer(2, false, Some("stale")),
            timer(3, true, None),
        ];

        let pending = scheduler.list_all_pending().unwrap();
        let plan = reconcile(&pending, &timers);
        let timers = apply_plan(&plan, &scheduler, timers);

        assert_eq!(scheduler.cancel_calls(), vec![ScheduleRef::new("foreign")]);
        assert_eq!(scheduler.pending().len(), 2);
        assert_eq!(timers[0].status(), TimerStatus::ActiveScheduled);
        assert_ne!(timers[0].notification_id, Some(ScheduleRef::new("old")));
        assert_eq!(timers[1].status(), TimerStatus::Inactive);
        assert_eq!(timers[1].notification_id, None);
        assert_eq!(timers[2].status(), TimerStatus::ActiveScheduled);

        // A second pass converges to the same shape.
        let pending = scheduler.list_all_pending().unwrap();
        let plan = reconcile(&pending, &timers);
        let timers = apply_plan(&plan, &scheduler, timers);
        assert_eq!(scheduler.pending().len(), 2);
        assert!(timers
            .iter()
            .filter(|t| t.is_active)
            .all(|t| t.notification_id.is_some()));
    }

    #[test]
    fn failed_reschedule_leaves_timer_active_without_ref() {
        let scheduler = MemoryScheduler::new();
        scheduler.set_failing(true);

        let plan = reconcile(&[], &[timer(1, true, Some("old"))]);
        let timers = apply_plan(&plan, &scheduler, vec![timer(1, true, Some("old"))]);

        assert!(timers[0].is_active);
        assert_eq!(timers[0].status(), TimerStatus::ActiveFailed);
    }
}
