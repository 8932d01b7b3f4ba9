// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Null-mode resolution.
//!
//! A series' [`NullMode`] is applied once to its whole point list, producing the indices of the
//! points that are drawn and the positions where a continuous stroke must be broken.

use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::series::{NullMode, Series};

/// A point that survives null resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedValue {
    /// Index of the point in its series.
    pub index: usize,
    /// The value to draw (zero for a zero-filled null).
    pub value: f64,
}

/// The drawable points of a series after applying its null mode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NullResolved {
    /// Drawn points in input order.
    pub points: Vec<ResolvedValue>,
    /// Positions in `points` where a new stroke segment starts.
    pub breaks: SmallVec<[usize; 4]>,
}

/// Applies `mode` to a sequence of optional values.
///
/// `value(i)` returns the value of point `i`, or `None` for a null. Breaks are only recorded for
/// continuous series under [`NullMode::Skip`], and only between two drawn points.
pub fn apply_null_mode(
    len: usize,
    value: impl Fn(usize) -> Option<f64>,
    mode: NullMode,
    continuous: bool,
) -> NullResolved {
    let mut out = NullResolved::default();
    let mut gap = false;
    for index in 0..len {
        match (value(index).filter(|v| v.is_finite()), mode) {
            (Some(v), _) => {
                if gap && !out.points.is_empty() {
                    out.breaks.push(out.points.len());
                }
                gap = false;
                out.points.push(ResolvedValue { index, value: v });
            }
            (None, NullMode::Zero) => {
                gap = false;
                out.points.push(ResolvedValue { index, value: 0.0 });
            }
            (None, NullMode::Skip) => gap = continuous,
            (None, NullMode::Connect) => {}
        }
    }
    out
}

/// Resolves the Cartesian points of `series` using its own null mode.
///
/// Points whose position coordinate is missing are treated like nulls. Non-Cartesian series
/// resolve to nothing.
pub fn resolve_series_nulls(series: &Series) -> NullResolved {
    let Some(points) = series.data.cartesian_points() else {
        return NullResolved::default();
    };
    apply_null_mode(
        points.len(),
        |i| {
            let p = &points[i];
            series.position_of(p)?;
            series.value_of(p)
        },
        series.null_mode,
        series.kind().is_continuous(),
    )
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::series::CartesianPoint;

    const VALUES: [Option<f64>; 6] = [Some(1.0), None, None, Some(2.0), None, Some(3.0)];

    fn run(mode: NullMode, continuous: bool) -> NullResolved {
        apply_null_mode(VALUES.len(), |i| VALUES[i], mode, continuous)
    }

    fn indices(r: &NullResolved) -> Vec<usize> {
        r.points.iter().map(|p| p.index).collect()
    }

    #[test]
    fn skip_drops_points_and_breaks_the_stroke() {
        let r = run(NullMode::Skip, true);
        assert_eq!(indices(&r), vec![0, 3, 5]);
        assert_eq!(r.breaks.as_slice(), &[1, 2]);
    }

    #[test]
    fn skip_on_point_series_records_no_breaks() {
        let r = run(NullMode::Skip, false);
        assert_eq!(indices(&r), vec![0, 3, 5]);
        assert!(r.breaks.is_empty());
    }

    #[test]
    fn zero_keeps_every_point() {
        let r = run(NullMode::Zero, true);
        assert_eq!(r.points.len(), 6);
        assert_eq!(r.points[1].value, 0.0);
        assert!(r.breaks.is_empty());
    }

    #[test]
    fn connect_bridges_the_gap() {
        let r = run(NullMode::Connect, true);
        assert_eq!(indices(&r), vec![0, 3, 5]);
        assert!(r.breaks.is_empty());
    }

    #[test]
    fn leading_nulls_do_not_break() {
        let s = Series::line(
            "s",
            vec![
                CartesianPoint::null_y(0.0),
                CartesianPoint::new(1.0, 1.0),
                CartesianPoint::new(2.0, 2.0),
            ],
        );
        let r = resolve_series_nulls(&s);
        assert_eq!(indices(&r), vec![1, 2]);
        assert!(r.breaks.is_empty());
    }
}
