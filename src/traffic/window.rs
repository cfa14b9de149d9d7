use anyhow::{Result, bail, ensure};
use serde::Serialize;

use crate::model::MINUTES_PER_DAY;

/// Default half-width of a bounded window, in minutes.
pub const DEFAULT_TOLERANCE: u16 = 60;

/// Slider value meaning "no time filter".
pub const ANY_TIME: i32 = -1;

/// Restricts aggregation to trips near a minute of the day.
///
/// Prefer [`TimeWindow::around`] or [`TimeWindow::from_slider`], which reject a
/// minute past the end of the day. A hand-built `Around` with such a minute is
/// read modulo 1440 by every consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeWindow {
    Any,
    Around { minute: u16, tolerance: u16 },
}

impl TimeWindow {
    /// A window of `tolerance` minutes either side of `minute`.
    pub fn around(minute: u16, tolerance: u16) -> Result<Self> {
        ensure!(
            minute < MINUTES_PER_DAY,
            "minute {minute} is outside [0, {}]",
            MINUTES_PER_DAY - 1
        );
        Ok(TimeWindow::Around { minute, tolerance })
    }

    /// Builds a window from a slider position in `[-1, 1439]`.
    pub fn from_slider(value: i32, tolerance: u16) -> Result<Self> {
        match value {
            ANY_TIME => Ok(TimeWindow::Any),
            v => match u16::try_from(v) {
                Ok(minute) if minute < MINUTES_PER_DAY => Self::around(minute, tolerance),
                _ => bail!("slider value {v} is outside [-1, {}]", MINUTES_PER_DAY - 1),
            },
        }
    }

    /// The target minute in `[0, 1440)`, or `None` for an unbounded window.
    pub fn minute_of_day(&self) -> Option<u16> {
        match self {
            TimeWindow::Any => None,
            TimeWindow::Around { minute, .. } => Some(minute % MINUTES_PER_DAY),
        }
    }

    /// The slider position this window corresponds to.
    pub fn slider_value(&self) -> i32 {
        self.minute_of_day().map_or(ANY_TIME, i32::from)
    }

    /// Whether a minute-of-day falls inside the window. Distance wraps at midnight.
    pub fn contains(&self, minute: u16) -> bool {
        match self {
            TimeWindow::Any => true,
            TimeWindow::Around { minute: target, tolerance } => {
                circular_distance(minute, *target) <= *tolerance
            }
        }
    }
}

fn circular_distance(a: u16, b: u16) -> u16 {
    let d = a.abs_diff(b) % MINUTES_PER_DAY;
    d.min(MINUTES_PER_DAY - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slider_bounds() {
        assert_eq!(TimeWindow::from_slider(-1, 60).unwrap(), TimeWindow::Any);
        assert_eq!(
            TimeWindow::from_slider(0, 60).unwrap(),
            TimeWindow::Around { minute: 0, tolerance: 60 }
        );
        assert_eq!(TimeWindow::from_slider(1439, 60).unwrap().minute_of_day(), Some(1439));
        assert!(TimeWindow::from_slider(1440, 60).is_err());
        assert!(TimeWindow::from_slider(-2, 60).is_err());
    }

    #[test]
    fn test_slider_value_round_trips() {
        for v in [-1, 0, 720, 1439] {
            assert_eq!(TimeWindow::from_slider(v, 30).unwrap().slider_value(), v);
        }
    }

    #[test]
    fn test_around_rejects_minute_past_end_of_day() {
        assert!(TimeWindow::around(1439, 60).is_ok());
        assert!(TimeWindow::around(1440, 60).is_err());
        assert!(TimeWindow::around(1500, 0).is_err());
    }

    #[test]
    fn test_hand_built_window_wraps_into_day() {
        let w = TimeWindow::Around { minute: 1500, tolerance: 0 };
        assert_eq!(w.minute_of_day(), Some(60));
        assert_eq!(w.slider_value(), 60);
        assert!(w.contains(60));
        assert_eq!(TimeWindow::Any.minute_of_day(), None);
    }

    #[test]
    fn test_any_contains_everything() {
        assert!(TimeWindow::Any.contains(0));
        assert!(TimeWindow::Any.contains(1439));
    }

    #[test]
    fn test_around_tolerance_is_inclusive() {
        let w = TimeWindow::Around { minute: 480, tolerance: 60 };
        assert!(w.contains(420));
        assert!(w.contains(540));
        assert!(!w.contains(419));
        assert!(!w.contains(541));
    }

    #[test]
    fn test_window_wraps_midnight() {
        let w = TimeWindow::Around { minute: 30, tolerance: 60 };
        assert!(w.contains(1410));
        assert!(!w.contains(1409));
    }

    #[test]
    fn test_zero_tolerance_is_exact() {
        let w = TimeWindow::Around { minute: 750, tolerance: 0 };
        assert!(w.contains(750));
        assert!(!w.contains(751));
    }
}
