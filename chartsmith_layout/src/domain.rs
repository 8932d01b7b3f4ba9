// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The domain aggregator.
//!
//! Every axis-related series kind has an explicit rule for each axis role; kinds that are not
//! placed on Cartesian axes have none and are rejected with [`LayoutError::NoDomainRule`].

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::axis::{AxisConfig, AxisType};
use crate::error::{AxisRole, LayoutError};
use crate::series::{AxisValue, Series, SeriesData};
use crate::stack::{StackedValues, Span, compute_stacks, waterfall_steps};
use crate::time;

/// The numeric extent of the data on one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataDomain {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Smallest strictly positive value, used to clamp logarithmic domains.
    pub min_positive: Option<f64>,
}

/// Collects distinct finite values.
#[derive(Default)]
struct DomainValues {
    seen: HashSet<u64>,
    values: Vec<f64>,
}

impl DomainValues {
    fn push(&mut self, v: f64) {
        if !v.is_finite() {
            return;
        }
        let v = v + 0.0;
        if self.seen.insert(v.to_bits()) {
            self.values.push(v);
        }
    }

    fn push_value(&mut self, v: Option<&AxisValue>) {
        if let Some(n) = v.and_then(AxisValue::as_number) {
            self.push(n);
        }
    }

    fn push_spans(&mut self, spans: &[Option<Span>]) {
        for span in spans.iter().flatten() {
            self.push(span.y0);
            self.push(span.y1);
        }
    }

    fn finish(self) -> Option<DataDomain> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let min_positive = self
            .values
            .iter()
            .copied()
            .filter(|v| *v > 0.0)
            .reduce(f64::min);
        Some(DataDomain {
            min,
            max,
            min_positive,
        })
    }
}

/// Aggregates the data extent of `series` along `role`.
///
/// Hidden series are ignored. Returns `Ok(None)` when no series contributes a value.
pub fn compute_domain(
    series: &[&Series],
    role: AxisRole,
) -> Result<Option<DataDomain>, LayoutError> {
    let stacks = compute_stacks(series);
    compute_domain_with(series, &stacks, role)
}

/// Like [`compute_domain`], reusing stacks already computed for the same slice.
///
/// The spans of series `i` must line up with its points. When `series` are zoom-filtered
/// copies, pass full-series stacks narrowed with [`StackedValues::select`].
pub fn compute_domain_with(
    series: &[&Series],
    stacks: &StackedValues,
    role: AxisRole,
) -> Result<Option<DataDomain>, LayoutError> {
    let mut values = DomainValues::default();
    for (i, s) in series.iter().enumerate() {
        if !s.visible {
            continue;
        }
        contribute(&mut values, s, stacks.for_series(i), role)?;
    }
    let domain = values.finish();
    log::debug!("{role} domain over {} series: {domain:?}", series.len());
    Ok(domain)
}

fn contribute(
    values: &mut DomainValues,
    s: &Series,
    stacked: Option<&[Option<Span>]>,
    role: AxisRole,
) -> Result<(), LayoutError> {
    match (&s.data, role) {
        // Horizontal bars carry their value on X and touch the zero baseline.
        (SeriesData::BarY(points), AxisRole::X) => {
            match stacked {
                Some(spans) => values.push_spans(spans),
                None => points.iter().for_each(|p| values.push_value(p.x.as_ref())),
            }
            values.push(0.0);
        }
        (SeriesData::BarY(points), AxisRole::Y) => {
            points.iter().for_each(|p| values.push_value(p.y.as_ref()));
        }
        (SeriesData::BarX(points) | SeriesData::Area(points), AxisRole::Y) => {
            match stacked {
                Some(spans) => values.push_spans(spans),
                None => points.iter().for_each(|p| values.push_value(p.y.as_ref())),
            }
            values.push(0.0);
        }
        (SeriesData::Line(points) | SeriesData::Scatter(points), AxisRole::Y) => match stacked {
            Some(spans) => values.push_spans(spans),
            None => points.iter().for_each(|p| values.push_value(p.y.as_ref())),
        },
        (
            SeriesData::Line(points)
            | SeriesData::Scatter(points)
            | SeriesData::Area(points)
            | SeriesData::BarX(points),
            AxisRole::X,
        ) => points.iter().for_each(|p| values.push_value(p.x.as_ref())),
        (SeriesData::Waterfall(points), AxisRole::Y) => {
            match stacked {
                Some(spans) => values.push_spans(spans),
                None => values.push_spans(&waterfall_steps(points)),
            }
            values.push(0.0);
        }
        (SeriesData::Waterfall(points), AxisRole::X) => {
            points.iter().for_each(|p| values.push_value(p.x.as_ref()));
        }
        (SeriesData::Boxplot(points), AxisRole::Y) => {
            for p in points {
                for v in [p.low, p.q1, p.median, p.q3, p.high].into_iter().flatten() {
                    values.push(v);
                }
                p.outliers.iter().for_each(|v| values.push(*v));
            }
        }
        (SeriesData::Boxplot(points), AxisRole::X) => {
            points.iter().for_each(|p| values.push_value(p.x.as_ref()));
        }
        (SeriesData::Heatmap(points), AxisRole::X) => {
            points.iter().for_each(|p| values.push_value(p.x.as_ref()));
        }
        (SeriesData::Heatmap(points), AxisRole::Y) => {
            points.iter().for_each(|p| values.push_value(p.y.as_ref()));
        }
        (
            SeriesData::Pie(_)
            | SeriesData::Treemap(_)
            | SeriesData::Sankey(_)
            | SeriesData::Radar(_)
            | SeriesData::Funnel(_),
            _,
        ) => {
            return Err(LayoutError::NoDomainRule {
                kind: s.kind(),
                role,
            });
        }
    }
    Ok(())
}

/// Resolves the final numeric domain of an axis from the aggregated data extent.
///
/// Explicit `min`/`max` win. Y axes grow upward by `max_padding * span` unless `max` is
/// explicit. Degenerate spans are widened, and logarithmic domains never start at or below
/// zero.
pub fn resolve_domain(axis: &AxisConfig, role: AxisRole, data: Option<DataDomain>) -> (f64, f64) {
    let (mut min, mut max) = match data {
        Some(d) => (d.min, d.max),
        None => match axis.axis_type {
            AxisType::Logarithmic => (1.0, 10.0),
            _ => (0.0, 1.0),
        },
    };
    if let Some(m) = axis.min.filter(|m| m.is_finite()) {
        min = m;
    }
    if let Some(m) = axis.max.filter(|m| m.is_finite()) {
        max = m;
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }

    if axis.axis_type == AxisType::Logarithmic {
        if min <= 0.0 {
            let clamped = data.and_then(|d| d.min_positive).unwrap_or(1.0);
            log::warn!("logarithmic {role} axis minimum {min} clamped to {clamped}");
            min = clamped;
        }
        if max <= min {
            max = min * 10.0;
        }
        return (min, max);
    }

    if min == max {
        let pad = if axis.axis_type == AxisType::Datetime {
            time::HOUR
        } else {
            1.0
        };
        if axis.min.is_none() {
            min -= pad;
        }
        if axis.max.is_none() || axis.min.is_some() {
            max += pad;
        }
    }

    if axis.max.is_none() {
        max += (max - min) * axis.max_padding_for(role);
    }
    (min, max)
}
