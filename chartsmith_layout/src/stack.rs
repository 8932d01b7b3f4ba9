// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stacking engine.
//!
//! Visible series with a [`Stacking`] mode are grouped by `(kind, stack_id)`. Within a group,
//! series are walked in input order and each point is offset by the running sum of earlier
//! members at the same position. Positive and negative values keep separate running sums, so a
//! negative member stacks downward from zero. Waterfall series stack onto themselves and carry
//! their running-total spans alongside the groups.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::series::{
    AxisValue, NullMode, Series, SeriesData, SeriesKind, Stacking, WaterfallPoint,
};

/// The extent of one stacked (or waterfall) point in value space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    /// Baseline the point starts from.
    pub y0: f64,
    /// Top (or bottom, for negatives) of the point.
    pub y1: f64,
    /// The point's own contribution (percent of the category total in percent mode).
    pub value: f64,
}

/// Key identifying a stack group.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StackKey {
    /// Series kind; different kinds never share a group.
    pub kind: SeriesKind,
    /// Explicit stack id, if any.
    pub stack_id: Option<String>,
}

/// An ordered group of stacked series.
#[derive(Clone, Debug, PartialEq)]
pub struct StackGroup {
    /// Group key.
    pub key: StackKey,
    /// Accumulation mode, taken from the first member.
    pub stacking: Stacking,
    /// Indices into the series slice, in input order.
    pub members: Vec<usize>,
}

/// Position key used to line up points across series.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum PointKey {
    Number(u64),
    Category(String),
}

impl PointKey {
    fn of(value: &AxisValue) -> Option<Self> {
        match value {
            AxisValue::Number(n) if n.is_finite() => {
                // Normalize -0.0 so it shares a slot with 0.0.
                Some(Self::Number((n + 0.0).to_bits()))
            }
            AxisValue::Number(_) => None,
            AxisValue::Category(c) => Some(Self::Category(c.clone())),
        }
    }
}

/// Per-series stacked spans, aligned with the series slice passed to [`compute_stacks`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackedValues {
    spans: Vec<Option<Vec<Option<Span>>>>,
}

impl StackedValues {
    /// Returns the spans of series `index`, or `None` if it is not stacked.
    ///
    /// The returned slice is indexed by point index; unplaceable points are `None`.
    pub fn for_series(&self, index: usize) -> Option<&[Option<Span>]> {
        self.spans.get(index).and_then(|s| s.as_deref())
    }

    /// Whether series `index` takes part in a stack group or is a waterfall.
    pub fn is_stacked(&self, index: usize) -> bool {
        self.for_series(index).is_some()
    }

    /// Keeps, for every series, only the spans of the points listed in `indices`.
    ///
    /// `indices` is aligned with the series slice and lists original point indices, so spans
    /// computed over full series can follow the series through the zoom filter without their
    /// running sums restarting at the window edge.
    #[must_use]
    pub fn select<I: AsRef<[usize]>>(&self, indices: &[I]) -> Self {
        let spans = self
            .spans
            .iter()
            .zip(indices)
            .map(|(spans, picks)| {
                let spans = spans.as_ref()?;
                let picks = picks.as_ref().iter();
                Some(picks.map(|&i| spans.get(i).copied().flatten()).collect())
            })
            .collect();
        Self { spans }
    }
}

/// Groups the visible, stackable series that have a stacking mode.
pub fn stack_groups(series: &[&Series]) -> Vec<StackGroup> {
    let mut groups: Vec<StackGroup> = Vec::new();
    let mut lookup: HashMap<StackKey, usize> = HashMap::new();
    for (i, s) in series.iter().enumerate() {
        let Some(stacking) = s.stacking else {
            continue;
        };
        if !s.visible || !s.kind().is_stackable() {
            continue;
        }
        let key = StackKey {
            kind: s.kind(),
            stack_id: s.stack_id.clone(),
        };
        match lookup.get(&key) {
            Some(&g) => groups[g].members.push(i),
            None => {
                lookup.insert(key.clone(), groups.len());
                groups.push(StackGroup {
                    key,
                    stacking,
                    members: alloc::vec![i],
                });
            }
        }
    }
    groups
}

/// Computes stacked spans for every stack group among `series`, plus the running-total spans
/// of every visible waterfall series.
pub fn compute_stacks(series: &[&Series]) -> StackedValues {
    let mut spans: Vec<Option<Vec<Option<Span>>>> = alloc::vec![None; series.len()];
    for (i, s) in series.iter().enumerate() {
        if let SeriesData::Waterfall(points) = &s.data
            && s.visible
        {
            spans[i] = Some(waterfall_steps(points));
        }
    }
    for group in stack_groups(series) {
        log::debug!(
            "stacking {} series of kind {} ({:?})",
            group.members.len(),
            group.key.kind,
            group.stacking
        );
        let offsets = compute_stacked_offsets(series, &group);
        for (member, member_spans) in group.members.iter().zip(offsets) {
            spans[*member] = Some(member_spans);
        }
    }
    StackedValues { spans }
}

/// Computes the spans of one stack group, one list per member.
pub fn compute_stacked_offsets(series: &[&Series], group: &StackGroup) -> Vec<Vec<Option<Span>>> {
    let totals = match group.stacking {
        Stacking::Normal => None,
        Stacking::Percent => Some(absolute_totals(series, &group.members)),
    };

    let mut positive: HashMap<PointKey, f64> = HashMap::new();
    let mut negative: HashMap<PointKey, f64> = HashMap::new();
    let mut out = Vec::with_capacity(group.members.len());

    for &member in &group.members {
        let s = series[member];
        let points = s.data.cartesian_points().unwrap_or(&[]);
        let mut member_spans = Vec::with_capacity(points.len());
        for point in points {
            let key = s.position_of(point).and_then(PointKey::of);
            let value = stack_value(s, s.value_of(point));
            let (Some(key), Some(raw)) = (key, value) else {
                member_spans.push(None);
                continue;
            };
            let value = match &totals {
                Some(totals) => {
                    let total = totals.get(&key).copied().unwrap_or(0.0);
                    if total == 0.0 { 0.0 } else { raw / total * 100.0 }
                }
                None => raw,
            };
            let sums = if value < 0.0 {
                &mut negative
            } else {
                &mut positive
            };
            let base = sums.entry(key).or_insert(0.0);
            let y0 = *base;
            *base += value;
            member_spans.push(Some(Span {
                y0,
                y1: *base,
                value,
            }));
        }
        out.push(member_spans);
    }
    out
}

/// The value a point contributes to its stack, honoring zero-filled nulls.
fn stack_value(series: &Series, value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        _ if series.null_mode == NullMode::Zero => Some(0.0),
        _ => None,
    }
}

fn absolute_totals(series: &[&Series], members: &[usize]) -> HashMap<PointKey, f64> {
    let mut totals = HashMap::new();
    for &member in members {
        let s = series[member];
        for point in s.data.cartesian_points().unwrap_or(&[]) {
            let (Some(key), Some(v)) = (
                s.position_of(point).and_then(PointKey::of),
                stack_value(s, s.value_of(point)),
            ) else {
                continue;
            };
            *totals.entry(key).or_insert(0.0) += v.abs();
        }
    }
    totals
}

/// Computes the running-total spans of a waterfall series.
///
/// Regular steps span from the running sum before the step to the sum after it. A `total`
/// point spans from zero to the running sum and does not change it. Steps with a missing value
/// produce `None`.
pub fn waterfall_steps(points: &[WaterfallPoint]) -> Vec<Option<Span>> {
    let mut sum = 0.0;
    points
        .iter()
        .map(|p| {
            if p.total {
                return Some(Span {
                    y0: 0.0,
                    y1: sum,
                    value: sum,
                });
            }
            let y = p.y.filter(|y| y.is_finite())?;
            let y0 = sum;
            sum += y;
            Some(Span { y0, y1: sum, value: y })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::series::CartesianPoint;

    fn bars(name: &str, values: &[(&str, f64)]) -> Series {
        Series::bar_x(
            name,
            values
                .iter()
                .map(|(x, y)| CartesianPoint::new(*x, *y))
                .collect(),
        )
        .with_stacking(Stacking::Normal)
    }

    #[test]
    fn positive_and_negative_values_stack_independently() {
        let a = bars("a", &[("q1", 4.0), ("q2", -2.0)]);
        let b = bars("b", &[("q1", 6.0), ("q2", -3.0)]);
        let c = bars("c", &[("q1", -5.0), ("q2", 1.0)]);
        let stacks = compute_stacks(&[&a, &b, &c]);

        let a = stacks.for_series(0).unwrap();
        let b = stacks.for_series(1).unwrap();
        let c = stacks.for_series(2).unwrap();
        assert_eq!(b[0].unwrap().y0, 4.0);
        assert_eq!(b[0].unwrap().y1, 10.0);
        assert_eq!(c[0].unwrap().y0, 0.0, "negative stacks below zero, not below the top");
        assert_eq!(c[0].unwrap().y1, -5.0);
        assert_eq!(a[1].unwrap().y1, -2.0);
        assert_eq!(b[1].unwrap().y1, -5.0);
        assert_eq!(c[1].unwrap().y0, 0.0);
        assert_eq!(c[1].unwrap().y1, 1.0);
    }

    #[test]
    fn percent_stack_sums_to_one_hundred() {
        let a = bars("a", &[("q1", 1.0)]).with_stacking(Stacking::Percent);
        let b = bars("b", &[("q1", 3.0)]).with_stacking(Stacking::Percent);
        let stacks = compute_stacks(&[&a, &b]);
        let top = stacks.for_series(1).unwrap()[0].unwrap();
        assert!((top.y1 - 100.0).abs() < 1e-9);
        assert!((top.value - 75.0).abs() < 1e-9);
    }

    #[test]
    fn kinds_and_stack_ids_form_separate_groups() {
        let a = bars("a", &[("q1", 1.0)]);
        let b = bars("b", &[("q1", 1.0)]).with_stack_id("other");
        let c = Series::area("c", vec![CartesianPoint::new("q1", 1.0)])
            .with_stacking(Stacking::Normal);
        let d = bars("d", &[("q1", 1.0)]);
        let groups = stack_groups(&[&a, &b, &c, &d]);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].members, vec![0, 3]);

        let stacks = compute_stacks(&[&a, &b, &c, &d]);
        assert_eq!(stacks.for_series(1).unwrap()[0].unwrap().y0, 0.0);
        assert_eq!(stacks.for_series(3).unwrap()[0].unwrap().y0, 1.0);
    }

    #[test]
    fn unstacked_and_hidden_series_are_excluded() {
        let a = bars("a", &[("q1", 1.0)]).with_visible(false);
        let b = Series::bar_x("b", vec![CartesianPoint::new("q1", 1.0)]);
        let stacks = compute_stacks(&[&a, &b]);
        assert!(!stacks.is_stacked(0));
        assert!(!stacks.is_stacked(1));
    }

    #[test]
    fn waterfalls_carry_spans_and_selection_keeps_running_sums() {
        let w = Series::new(
            "w",
            SeriesData::Waterfall(vec![
                WaterfallPoint::step("a", 10.0),
                WaterfallPoint::step("b", 5.0),
                WaterfallPoint::total("sum"),
            ]),
        );
        let b = bars("b", &[("q1", 1.0), ("q2", 2.0)]);
        let stacks = compute_stacks(&[&w, &b]);
        assert!(stacks.is_stacked(0));

        let picked = stacks.select(&[vec![1, 2], vec![1]]);
        let w = picked.for_series(0).unwrap();
        assert_eq!(w[0], Some(Span { y0: 10.0, y1: 15.0, value: 5.0 }));
        assert_eq!(w[1], Some(Span { y0: 0.0, y1: 15.0, value: 15.0 }));
        let b = picked.for_series(1).unwrap();
        assert_eq!(b, &[Some(Span { y0: 0.0, y1: 2.0, value: 2.0 })]);
    }

    #[test]
    fn waterfall_tracks_running_subtotals() {
        let steps = waterfall_steps(&[
            WaterfallPoint::step("start", 10.0),
            WaterfallPoint::step("loss", -4.0),
            WaterfallPoint::total("sum"),
            WaterfallPoint::step("gain", 2.0),
        ]);
        assert_eq!(steps[1], Some(Span { y0: 10.0, y1: 6.0, value: -4.0 }));
        assert_eq!(steps[2], Some(Span { y0: 0.0, y1: 6.0, value: 6.0 }));
        assert_eq!(steps[3], Some(Span { y0: 6.0, y1: 8.0, value: 2.0 }));
    }
}
