use chrono::NaiveDate;
use tracing::{debug, error, info, instrument};

use crate::{
    error::ValidationError, repository::Repository, structs::hydration_state::HydrationState,
};

pub const MIN_GOAL: u32 = 1;
pub const MAX_GOAL: u32 = 20;

pub fn goal_in_range(value: i64) -> bool {
    (i64::from(MIN_GOAL)..=i64::from(MAX_GOAL)).contains(&value)
}

/// The canonical local-date string stored under `lastDate`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Glass counter with a daily goal.
pub struct HydrationTracker {
    state: HydrationState,
    repository: Repository,
    goal_reached: bool,
}

impl HydrationTracker {
    /// Restores the persisted counter and applies any rollover since it was
    /// last saved.
    pub fn load(repository: Repository, today: NaiveDate) -> Self {
        let state = repository.load_hydration();
        debug!(?state, "Loaded hydration state");

        let mut tracker = Self {
            state,
            repository,
            goal_reached: false,
        };
        tracker.check_day_rollover(today);
        tracker
    }

    pub fn state(&self) -> &HydrationState {
        &self.state
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save_hydration(&self.state) {
            error!("Unable to save hydration state: {e}");
        }
    }

    /// Logs one glass. Returns `true` when this glass is the one that hits
    /// the goal.
    #[instrument(skip(self))]
    pub fn add_glass(&mut self) -> bool {
        self.state.glasses_consumed = self.state.glasses_consumed.saturating_add(1);
        self.persist();

        let reached = self.state.daily_goal > 0
            && self.state.glasses_consumed == self.state.daily_goal;
        if reached {
            info!("Daily goal of {} glasses reached", self.state.daily_goal);
            self.goal_reached = true;
        }
        reached
    }

    #[instrument(skip(self))]
    pub fn reset_glasses(&mut self) {
        self.state.glasses_consumed = 0;
        self.goal_reached = false;
        self.persist();
    }

    #[instrument(skip(self))]
    pub fn set_goal(&mut self, value: i64) -> Result<(), ValidationError> {
        if !goal_in_range(value) {
            return Err(ValidationError::GoalOutOfRange(value));
        }

        self.state.daily_goal = value as u32;
        self.persist();
        Ok(())
    }

    /// Resets the counter if `today` is a different day than the last reset.
    /// Returns whether a reset happened.
    pub fn check_day_rollover(&mut self, today: NaiveDate) -> bool {
        let today = date_key(today);
        if self.state.last_reset_date.as_deref() == Some(today.as_str()) {
            return false;
        }

        info!(
            previous = ?self.state.last_reset_date,
            %today, "New day, resetting glass counter"
        );
        self.state.glasses_consumed = 0;
        self.state.last_reset_date = Some(today);
        self.goal_reached = false;
        self.persist();
        true
    }

    /// Share of the goal reached, capped at 100.
    pub fn progress_percent(&self) -> u32 {
        if self.state.daily_goal == 0 {
            return 0;
        }
        let percent =
            u64::from(self.state.glasses_consumed) * 100 / u64::from(self.state.daily_goal);
        percent.min(100) as u32
    }

    /// Whether the goal-reached notice is waiting to be dismissed.
    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn dismiss_completion(&mut self) {
        self.goal_reached = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        repository::LAST_DATE_KEY,
        storage::{KeyValueStore, MemoryStore},
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn tracker() -> (Arc<MemoryStore>, HydrationTracker) {
        let store = Arc::new(MemoryStore::new());
        let tracker = HydrationTracker::load(Repository::new(store.clone()), day(19));
        (store, tracker)
    }

    #[test]
    fn date_key_is_human_readable() {
        assert_eq!(date_key(day(19)), "Mon Oct 19 2026");
    }

    #[test]
    fn goal_bounds() {
        let (_, mut tracker) = tracker();

        for goal in [1, 8, 20] {
            assert_eq!(tracker.set_goal(goal), Ok(()));
            assert_eq!(tracker.state().daily_goal, goal as u32);
        }

        tracker.set_goal(8).unwrap();
        for goal in [-1, 0, 21, 25] {
            assert_eq!(
                tracker.set_goal(goal),
                Err(ValidationError::GoalOutOfRange(goal))
            );
            assert_eq!(tracker.state().daily_goal, 8);
        }
    }

    #[test]
    fn completion_fires_once_at_the_goal() {
        let (_, mut tracker) = tracker();
        tracker.set_goal(3).unwrap();

        let signals: Vec<bool> = (0..5).map(|_| tracker.add_glass()).collect();
        assert_eq!(signals, vec![false, false, true, false, false]);
        assert_eq!(tracker.state().glasses_consumed, 5);
        assert!(tracker.goal_reached());

        tracker.dismiss_completion();
        assert!(!tracker.goal_reached());
    }

    #[test]
    fn counter_going_back_to_zero_clears_the_notice() {
        let (_, mut tracker) = tracker();
        tracker.set_goal(1).unwrap();

        assert!(tracker.add_glass());
        tracker.reset_glasses();
        assert!(!tracker.goal_reached());

        assert!(tracker.add_glass());
        assert!(tracker.check_day_rollover(day(20)));
        assert!(!tracker.goal_reached());
    }

    #[test]
    fn progress_is_capped() {
        let (_, mut tracker) = tracker();
        tracker.set_goal(4).unwrap();

        tracker.add_glass();
        assert_eq!(tracker.progress_percent(), 25);

        for _ in 0..5 {
            tracker.add_glass();
        }
        assert_eq!(tracker.progress_percent(), 100);
    }

    #[test]
    fn rollover_resets_only_on_a_new_day() {
        let (store, mut tracker) = tracker();
        tracker.add_glass();
        tracker.add_glass();

        assert!(!tracker.check_day_rollover(day(19)));
        assert_eq!(tracker.state().glasses_consumed, 2);

        assert!(tracker.check_day_rollover(day(20)));
        assert_eq!(tracker.state().glasses_consumed, 0);
        assert_eq!(
            store.get(LAST_DATE_KEY).unwrap().as_deref(),
            Some("Tue Oct 20 2026")
        );
    }

    #[test]
    fn load_applies_pending_rollover() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut tracker = HydrationTracker::load(Repository::new(store.clone()), day(19));
            tracker.add_glass();
            tracker.set_goal(12).unwrap();
        }

        let same_day = HydrationTracker::load(Repository::new(store.clone()), day(19));
        assert_eq!(same_day.state().glasses_consumed, 1);
        assert_eq!(same_day.state().daily_goal, 12);

        let next_day = HydrationTracker::load(Repository::new(store), day(20));
        assert_eq!(next_day.state().glasses_consumed, 0);
        assert_eq!(next_day.state().daily_goal, 12);
    }
}
