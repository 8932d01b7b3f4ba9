// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric tick formatting.

use alloc::string::String;

#[cfg(all(not(feature = "std"), not(test)))]
use crate::float::FloatExt;

/// Number of fractional digits needed to tell ticks `step` apart.
pub fn step_precision(step: f64) -> usize {
    let step = step.abs();
    if !step.is_finite() || step == 0.0 {
        return 0;
    }
    let digits = -step.log10().floor();
    if digits <= 0.0 {
        return 0;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "positive and capped at 20 fractional digits"
    )]
    {
        digits.min(20.0) as usize
    }
}

/// Formats `v` with the precision implied by `step`.
pub fn format_number(v: f64, step: f64) -> String {
    if !v.is_finite() {
        return alloc::format!("{v}");
    }
    let s = alloc::format!("{:.*}", step_precision(step), v);
    // Tiny negatives round to "-0".
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        return String::from(&s[1..]);
    }
    s
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn precision_follows_the_step() {
        assert_eq!(step_precision(10.0), 0);
        assert_eq!(step_precision(1.0), 0);
        assert_eq!(step_precision(0.5), 1);
        assert_eq!(step_precision(0.02), 2);
        assert_eq!(step_precision(0.0), 0);
    }

    #[test]
    fn numbers_are_formatted_with_step_precision() {
        assert_eq!(format_number(0.1 + 0.2, 0.1), "0.3");
        assert_eq!(format_number(1500.0, 500.0), "1500");
        assert_eq!(format_number(-0.000_01, 0.5), "0.0");
        assert_eq!(format_number(-2.5, 0.5), "-2.5");
    }
}
