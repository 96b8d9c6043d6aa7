use chrono::NaiveDateTime;

use crate::clock::next_occurrence;

/// `8:00 AM`, `12:05 PM`, `12:00 AM`.
pub fn format_time_12h(hour: u32, minute: u32) -> String {
    let period = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{minute:02} {period}")
}

/// Whole hours and whole minutes until the next `hour:minute`.
pub fn time_remaining(now: NaiveDateTime, hour: u32, minute: u32) -> (i64, i64) {
    let total_minutes = (next_occurrence(now, hour, minute) - now).num_minutes();
    (total_minutes / 60, total_minutes % 60)
}

pub fn format_remaining((hours, minutes): (i64, i64)) -> String {
    format!("{hours}h {minutes}m")
}
