use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use super::reconcile::{apply_plan, reconcile};
use crate::{
    clock::Clock,
    error::ValidationError,
    repository::Repository,
    scheduler::{NotificationPayload, NotificationScheduler, Permission, ScheduleRef},
    structs::timer::{NotificationTimer, TimerId},
};

/// Checks a user-supplied time of day.
pub fn validate_time(hour: i64, minute: i64) -> Result<(u32, u32), ValidationError> {
    if !(0..=23).contains(&hour) {
        return Err(ValidationError::HourOutOfRange(hour));
    }
    if !(0..=59).contains(&minute) {
        return Err(ValidationError::MinuteOutOfRange(minute));
    }
    Ok((hour as u32, minute as u32))
}

/// Owns the ordered timer list and keeps the scheduler in step with it.
///
/// Scheduler calls are best effort: a failed schedule leaves the timer active
/// with no reference (see [`crate::structs::timer::TimerStatus::ActiveFailed`])
/// and is not retried until the next [`TimerManager::load`].
pub struct TimerManager {
    timers: Vec<NotificationTimer>,
    scheduler: Arc<dyn NotificationScheduler>,
    repository: Repository,
    clock: Arc<dyn Clock>,
    permission: Permission,
    /// Largest id ever issued, deleted timers included
    last_id: TimerId,
}

impl TimerManager {
    /// Restores the stored timers, wipes every pending notification and
    /// schedules one fresh notification per active timer.
    #[instrument(skip_all)]
    pub fn load(
        repository: Repository,
        scheduler: Arc<dyn NotificationScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let permission = scheduler.request_permission();
        if permission == Permission::Denied {
            warn!("Notification permission denied, reminders will not be delivered");
        }

        let stored = repository.load_timers();
        let last_id = stored
            .iter()
            .map(|timer| timer.id)
            .chain(repository.load_last_timer_id())
            .max()
            .unwrap_or(0);
        let stored: Vec<NotificationTimer> = stored
            .into_iter()
            .filter(|timer| {
                let valid =
                    validate_time(i64::from(timer.hour), i64::from(timer.minute)).is_ok();
                if !valid {
                    warn!(
                        id = timer.id,
                        hour = timer.hour,
                        minute = timer.minute,
                        "Dropping stored timer with an out-of-range time"
                    );
                }
                valid
            })
            .collect();

        let pending = scheduler.list_all_pending().unwrap_or_else(|e| {
            warn!("Unable to list pending notifications: {e}");
            Vec::new()
        });

        let plan = reconcile(&pending, &stored);
        let timers = apply_plan(&plan, scheduler.as_ref(), stored);
        info!("Loaded {} timers", timers.len());

        let manager = Self {
            timers,
            scheduler,
            repository,
            clock,
            permission,
            last_id,
        };
        manager.persist();
        manager
    }

    pub fn timers(&self) -> &[NotificationTimer] {
        &self.timers
    }

    pub fn get(&self, id: TimerId) -> Option<&NotificationTimer> {
        self.timers.iter().find(|timer| timer.id == id)
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    fn position(&self, id: TimerId) -> Result<usize, ValidationError> {
        self.timers
            .iter()
            .position(|timer| timer.id == id)
            .ok_or(ValidationError::UnknownTimer(id))
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save_timers(&self.timers) {
            error!("Unable to save timers: {e}");
        }
    }

    fn schedule(&self, name: &str, hour: u32, minute: u32) -> Option<ScheduleRef> {
        match self
            .scheduler
            .schedule_daily(hour, minute, NotificationPayload::for_timer(name))
        {
            Ok(schedule) => {
                debug!(%schedule, "Scheduled timer notification");
                Some(schedule)
            }
            Err(e) => {
                warn!("Unable to schedule notification for '{name}': {e}");
                None
            }
        }
    }

    fn cancel(&self, schedule: &ScheduleRef) {
        if let Err(e) = self.scheduler.cancel(schedule) {
            warn!(%schedule, "Unable to cancel notification: {e}");
        }
    }

    /// Creation timestamp in UTC milliseconds, bumped past every id issued
    /// so far so that ids are never reused.
    fn next_id(&mut self) -> TimerId {
        let now = self.clock.now_utc().timestamp_millis();
        let id = now.max(self.last_id.saturating_add(1));
        self.last_id = id;

        if let Err(e) = self.repository.save_last_timer_id(id) {
            error!("Unable to save last timer id: {e}");
        }
        id
    }

    #[instrument(skip(self))]
    pub fn add_timer(
        &mut self,
        name: &str,
        hour: i64,
        minute: i64,
    ) -> Result<&NotificationTimer, ValidationError> {
        let (hour, minute) = validate_time(hour, minute)?;
        let name = NotificationTimer::resolve_name(name);

        let notification_id = self.schedule(&name, hour, minute);
        let timer = NotificationTimer {
            id: self.next_id(),
            name,
            hour,
            minute,
            is_active: true,
            notification_id,
        };
        info!(id = timer.id, "Added timer");

        self.timers.push(timer);
        self.persist();

        Ok(&self.timers[self.timers.len() - 1])
    }

    /// Updates a timer in place. An active timer gets its old notification
    /// cancelled and a new one scheduled.
    #[instrument(skip(self))]
    pub fn edit_timer(
        &mut self,
        id: TimerId,
        name: &str,
        hour: i64,
        minute: i64,
    ) -> Result<&NotificationTimer, ValidationError> {
        let (hour, minute) = validate_time(hour, minute)?;
        let index = self.position(id)?;
        let name = NotificationTimer::resolve_name(name);

        if let Some(old) = self.timers[index].notification_id.take() {
            self.cancel(&old);
        }

        let notification_id = if self.timers[index].is_active {
            self.schedule(&name, hour, minute)
        } else {
            None
        };

        let timer = &mut self.timers[index];
        timer.name = name;
        timer.hour = hour;
        timer.minute = minute;
        timer.notification_id = notification_id;
        info!(id, "Edited timer");

        self.persist();
        Ok(&self.timers[index])
    }

    #[instrument(skip(self))]
    pub fn toggle_timer(&mut self, id: TimerId) -> Result<&NotificationTimer, ValidationError> {
        let index = self.position(id)?;

        if self.timers[index].is_active {
            if let Some(old) = self.timers[index].notification_id.take() {
                self.cancel(&old);
            }
            self.timers[index].is_active = false;
        } else {
            let (name, hour, minute) = {
                let timer = &self.timers[index];
                (timer.name.clone(), timer.hour, timer.minute)
            };
            self.timers[index].notification_id = self.schedule(&name, hour, minute);
            self.timers[index].is_active = true;
        }
        info!(id, active = self.timers[index].is_active, "Toggled timer");

        self.persist();
        Ok(&self.timers[index])
    }

    /// Removes a timer after cancelling its notification. Callers are
    /// expected to have confirmed the deletion with the user.
    #[instrument(skip(self))]
    pub fn delete_timer(&mut self, id: TimerId) -> Result<NotificationTimer, ValidationError> {
        let index = self.position(id)?;

        if let Some(schedule) = &self.timers[index].notification_id {
            self.cancel(schedule);
        }
        let removed = self.timers.remove(index);
        info!(id, "Deleted timer");

        self.persist();
        Ok(removed)
    }
}
