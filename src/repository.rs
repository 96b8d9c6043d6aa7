//! Typed access to the persisted key-value entries.
//!
//! Loading never fails: missing or unreadable entries fall back to their
//! defaults. Saving returns the store error so callers can log it; in-memory
//! state stays authoritative either way.

use std::sync::Arc;

use tracing::warn;

use crate::{
    error::StorageError,
    storage::KeyValueStore,
    structs::{
        hydration_state::HydrationState,
        timer::{NotificationTimer, TimerId},
    },
    theme::Theme,
};

pub const GLASSES_KEY: &str = "glasses";
pub const GOAL_KEY: &str = "goal";
pub const THEME_KEY: &str = "theme";
pub const LAST_DATE_KEY: &str = "lastDate";
pub const TIMERS_KEY: &str = "notification_timers";
pub const LAST_TIMER_ID_KEY: &str = "lastTimerId";

#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KeyValueStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, "Unable to read stored value: {e}");
                None
            }
        }
    }

    fn read_u32(&self, key: &str) -> Option<u32> {
        let raw = self.read(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, %raw, "Ignoring unparsable stored number: {e}");
                None
            }
        }
    }

    pub fn load_hydration(&self) -> HydrationState {
        let defaults = HydrationState::default();
        HydrationState {
            glasses_consumed: self.read_u32(GLASSES_KEY).unwrap_or(defaults.glasses_consumed),
            daily_goal: self
                .read_u32(GOAL_KEY)
                .filter(|goal| crate::hydration::goal_in_range(i64::from(*goal)))
                .unwrap_or(defaults.daily_goal),
            last_reset_date: self.read(LAST_DATE_KEY),
        }
    }

    pub fn save_hydration(&self, state: &HydrationState) -> Result<(), StorageError> {
        self.store
            .set(GLASSES_KEY, &state.glasses_consumed.to_string())?;
        self.store.set(GOAL_KEY, &state.daily_goal.to_string())?;
        if let Some(date) = &state.last_reset_date {
            self.store.set(LAST_DATE_KEY, date)?;
        }
        Ok(())
    }

    pub fn load_timers(&self) -> Vec<NotificationTimer> {
        let Some(raw) = self.read(TIMERS_KEY) else {
            return Vec::new();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Stored timers are unreadable, starting with none: {e}");
            Vec::new()
        })
    }

    pub fn save_timers(&self, timers: &[NotificationTimer]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(timers)?;
        self.store.set(TIMERS_KEY, &serialized)
    }

    /// Largest timer id ever handed out, including deleted timers.
    pub fn load_last_timer_id(&self) -> Option<TimerId> {
        let raw = self.read(LAST_TIMER_ID_KEY)?;
        match raw.trim().parse() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(%raw, "Ignoring unparsable last timer id: {e}");
                None
            }
        }
    }

    pub fn save_last_timer_id(&self, id: TimerId) -> Result<(), StorageError> {
        self.store.set(LAST_TIMER_ID_KEY, &id.to_string())
    }

    pub fn load_theme(&self) -> Option<Theme> {
        let raw = self.read(THEME_KEY)?;
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(()) => {
                warn!(%raw, "Ignoring unknown stored theme");
                None
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(THEME_KEY, theme.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn repository() -> (Arc<MemoryStore>, Repository) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Repository::new(store))
    }

    #[test]
    fn empty_store_loads_defaults() {
        let (_, repository) = repository();

        assert_eq!(repository.load_hydration(), HydrationState::default());
        assert!(repository.load_timers().is_empty());
        assert_eq!(repository.load_theme(), None);
    }

    #[test]
    fn hydration_is_stored_as_decimal_strings() {
        let (store, repository) = repository();
        let state = HydrationState {
            glasses_consumed: 3,
            daily_goal: 10,
            last_reset_date: Some("Mon Oct 19 2026".into()),
        };

        repository.save_hydration(&state).unwrap();

        assert_eq!(store.get(GLASSES_KEY).unwrap().as_deref(), Some("3"));
        assert_eq!(store.get(GOAL_KEY).unwrap().as_deref(), Some("10"));
        assert_eq!(repository.load_hydration(), state);
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let (store, repository) = repository();
        store.set(GLASSES_KEY, "lots").unwrap();
        store.set(GOAL_KEY, "99").unwrap();
        store.set(TIMERS_KEY, "{").unwrap();
        store.set(THEME_KEY, "sepia").unwrap();

        let state = repository.load_hydration();
        assert_eq!(state.glasses_consumed, 0);
        assert_eq!(state.daily_goal, 8);
        assert!(repository.load_timers().is_empty());
        assert_eq!(repository.load_theme(), None);
    }

    #[test]
    fn last_timer_id_is_kept_as_decimal() {
        let (store, repository) = repository();
        assert_eq!(repository.load_last_timer_id(), None);

        repository.save_last_timer_id(1_792_393_200_000).unwrap();
        assert_eq!(
            store.get(LAST_TIMER_ID_KEY).unwrap().as_deref(),
            Some("1792393200000")
        );
        assert_eq!(repository.load_last_timer_id(), Some(1_792_393_200_000));

        store.set(LAST_TIMER_ID_KEY, "soon").unwrap();
        assert_eq!(repository.load_last_timer_id(), None);
    }

    #[test]
    fn theme_round_trips_as_plain_word() {
        let (store, repository) = repository();
        repository.save_theme(Theme::Dark).unwrap();

        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(repository.load_theme(), Some(Theme::Dark));
    }
}
