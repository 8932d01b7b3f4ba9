// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Datetime tick generation and formatting.
//!
//! Datetime axes model time as milliseconds since the Unix epoch (UTC). Tick steps are picked
//! from a fixed ladder spanning one millisecond to one year; months and years are treated as
//! 30 and 365 days.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use chrono::{DateTime, Utc};

#[cfg(all(not(feature = "std"), not(test)))]
use crate::float::FloatExt;

/// One second in milliseconds.
pub const SECOND: f64 = 1_000.0;
/// One minute in milliseconds.
pub const MINUTE: f64 = 60.0 * SECOND;
/// One hour in milliseconds.
pub const HOUR: f64 = 60.0 * MINUTE;
/// One day in milliseconds.
pub const DAY: f64 = 24.0 * HOUR;
/// One week in milliseconds.
pub const WEEK: f64 = 7.0 * DAY;
/// A 30-day month in milliseconds.
pub const MONTH: f64 = 30.0 * DAY;
/// A 365-day year in milliseconds.
pub const YEAR: f64 = 365.0 * DAY;

const STEPS: &[f64] = &[
    1.0,
    2.0,
    5.0,
    10.0,
    20.0,
    50.0,
    100.0,
    200.0,
    500.0,
    SECOND,
    2.0 * SECOND,
    5.0 * SECOND,
    10.0 * SECOND,
    15.0 * SECOND,
    30.0 * SECOND,
    MINUTE,
    2.0 * MINUTE,
    5.0 * MINUTE,
    10.0 * MINUTE,
    15.0 * MINUTE,
    30.0 * MINUTE,
    HOUR,
    3.0 * HOUR,
    6.0 * HOUR,
    12.0 * HOUR,
    DAY,
    2.0 * DAY,
    WEEK,
    MONTH,
    3.0 * MONTH,
    6.0 * MONTH,
    YEAR,
];

/// Returns the smallest step on the ladder that is at least `step` milliseconds.
///
/// Steps beyond a year are whole numbers of years.
pub fn nice_time_step_ms(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    for &s in STEPS {
        if s >= step {
            return s;
        }
    }
    (step / YEAR).ceil().max(1.0) * YEAR
}

/// Returns tick values for a datetime domain, limited to the domain.
pub fn nice_time_ticks_ms(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let step = nice_time_step_ms((max - min) / count as f64);
    if step == 0.0 {
        return alloc::vec![min, max];
    }
    crate::scale::ticks_in_range(min, max, step)
}

/// Formats a timestamp tick with a pattern chosen from the tick step.
pub fn format_time_ms(v: f64, step: f64) -> String {
    if !v.is_finite() {
        return alloc::format!("{v}");
    }
    let millis = {
        let m = v.round().clamp(i64::MIN as f64, i64::MAX as f64);
        #[allow(clippy::cast_possible_truncation, reason = "clamped to the i64 range")]
        {
            m as i64
        }
    };
    let Some(date) = DateTime::<Utc>::from_timestamp_millis(millis) else {
        return alloc::format!("{v}");
    };
    date.format(time_pattern(step.abs())).to_string()
}

fn time_pattern(step: f64) -> &'static str {
    if step < SECOND {
        "%H:%M:%S%.3f"
    } else if step < MINUTE {
        "%H:%M:%S"
    } else if step < DAY {
        "%H:%M"
    } else if step < MONTH {
        "%d.%m"
    } else if step < YEAR {
        "%m.%Y"
    } else {
        "%Y"
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn ladder_picks_the_next_step_up() {
        assert_eq!(nice_time_step_ms(3.0), 5.0);
        assert_eq!(nice_time_step_ms(40.0 * SECOND), MINUTE);
        assert_eq!(nice_time_step_ms(20.0 * DAY), MONTH);
        assert_eq!(nice_time_step_ms(1.5 * YEAR), 2.0 * YEAR);
    }

    #[test]
    fn ticks_stay_inside_the_domain() {
        let ticks = nice_time_ticks_ms(500.0, 10_500.0, 5);
        assert_eq!(ticks, alloc::vec![2_000.0, 4_000.0, 6_000.0, 8_000.0, 10_000.0]);
    }

    #[test]
    fn format_depends_on_step() {
        assert_eq!(format_time_ms(0.0, 1.0), "00:00:00.000");
        assert_eq!(format_time_ms(90_000.0, MINUTE), "00:01");
        assert_eq!(format_time_ms(0.0, DAY), "01.01");
        assert_eq!(format_time_ms(0.0, MONTH), "01.1970");
        assert_eq!(format_time_ms(0.0, YEAR), "1970");
    }
}
