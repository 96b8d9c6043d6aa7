//! Named daily reminders mirrored onto the notification scheduler.

pub mod display;
pub mod manager;
pub mod reconcile;

pub use display::{format_remaining, format_time_12h, time_remaining};
pub use manager::TimerManager;
pub use reconcile::{apply_plan, reconcile, ReconcilePlan};
