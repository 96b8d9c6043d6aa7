use serde::{Deserialize, Serialize};

pub const DEFAULT_GOAL: u32 = 8;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HydrationState {
    /// Glasses logged for the current local day
    pub glasses_consumed: u32,

    /// Target number of glasses per day, always within `1..=20`
    pub daily_goal: u32,

    /// Local date of the last reset, e.g. `"Mon Oct 19 2026"`
    pub last_reset_date: Option<String>,
}

impl Default for HydrationState {
    fn default() -> Self {
        Self {
            glasses_consumed: 0,
            daily_goal: DEFAULT_GOAL,
            last_reset_date: None,
        }
    }
}
