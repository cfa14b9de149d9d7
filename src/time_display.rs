//! Clock labels for the time-of-day slider.

use chrono::NaiveTime;

use crate::model::MINUTES_PER_DAY;
use crate::traffic::TimeWindow;

/// Label shown when the slider is at "no filter".
pub const ANY_TIME_LABEL: &str = "(any time)";

/// Formats a minute of the day as a 12-hour clock, e.g. `750` → `"12:30 PM"`.
///
/// # Panics
///
/// Panics if `minutes` is not below 1440.
pub fn format_minutes(minutes: u16) -> String {
    assert!(
        minutes < MINUTES_PER_DAY,
        "minute of day out of range: {minutes}"
    );
    let hour = u32::from(minutes / 60);
    let minute = u32::from(minutes % 60);
    NaiveTime::from_hms_opt(hour, minute, 0)
        .expect("hour < 24 and minute < 60 for any minute of day below 1440")
        .format("%-I:%M %p")
        .to_string()
}

/// Text next to the slider for the given window.
pub fn window_label(window: &TimeWindow) -> String {
    match window.minute_of_day() {
        None => ANY_TIME_LABEL.to_string(),
        Some(minute) => format_minutes(minute),
    }
}
