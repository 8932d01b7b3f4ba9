// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scales: mappings from a data domain to a pixel range.
//!
//! Continuous scales (linear, log, time) map numbers; the band scale maps category indices to
//! slots of equal width. A scale is categorical exactly when [`ChartScale::bandwidth`] returns
//! `Some`, in which case point positions are centered in their slot.

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(all(not(feature = "std"), not(test)))]
use crate::float::FloatExt;

use crate::axis::{AxisConfig, AxisType};
use crate::format::format_number;
use crate::series::AxisValue;
use crate::time;

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Maps a range position back into domain space.
    pub fn invert(&self, y: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = r1 - r0;
        if denom == 0.0 {
            return d0;
        }
        d0 + (y - r0) / denom * (d1 - d0)
    }

    /// Returns tick values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

/// A base-10 logarithmic mapping from a positive domain to a range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLog {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLog {
    /// Creates a new log scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    ///
    /// Non-positive values map to the start of the range.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if x <= 0.0 || d0 <= 0.0 || d1 <= 0.0 {
            return r0;
        }
        let ld0 = d0.log10();
        let denom = d1.log10() - ld0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x.log10() - ld0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Returns powers of ten inside the domain, or linear ticks when the domain spans less than
    /// one decade.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut min, mut max) = self.domain;
        if min > max {
            core::mem::swap(&mut min, &mut max);
        }
        if min <= 0.0 || !min.is_finite() || !max.is_finite() {
            return Vec::new();
        }
        let to_exp = |v: f64| -> i32 {
            let e = v.clamp(-300.0, 300.0);
            #[allow(clippy::cast_possible_truncation, reason = "clamped to [-300, 300]")]
            {
                e as i32
            }
        };
        let min_e = to_exp((min.log10() - 1e-9).ceil());
        let max_e = to_exp((max.log10() + 1e-9).floor());
        if max_e <= min_e {
            return nice_ticks(min, max, count);
        }
        let mut out: Vec<f64> = (min_e..=max_e).map(|e| 10_f64.powi(e)).collect();
        if count != 0 && out.len() > count {
            out = downsample(out, count);
        }
        out
    }
}

/// A time scale: linear over milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleTime {
    inner: ScaleLinear,
}

impl ScaleTime {
    /// Creates a new time scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            inner: ScaleLinear::new(domain, range),
        }
    }

    /// Maps a timestamp into range space.
    pub fn map(&self, t: f64) -> f64 {
        self.inner.map(t)
    }

    /// Returns tick timestamps inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        time::nice_time_ticks_ms(self.inner.domain.0, self.inner.domain.1, count)
    }
}

/// A discrete band scale over an ordered category list.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleBand {
    range: (f64, f64),
    categories: Vec<String>,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    /// Creates a band scale over `categories` without padding.
    ///
    /// The first category sits at the `range.0` end.
    pub fn new(range: (f64, f64), categories: Vec<String>) -> Self {
        Self {
            range,
            categories,
            padding_inner: 0.0,
            padding_outer: 0.0,
        }
    }

    /// Sets inner and outer padding in band units.
    #[must_use]
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the computed band width.
    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.categories.len() as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let span = (r1 - r0).abs();
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 { 0.0 } else { span / denom }
    }

    /// Returns the category list.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns the index of `category`, if present.
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    /// Returns the lower pixel edge of the band at `index`.
    pub fn start(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);
        let slot = if r1 >= r0 {
            index as f64
        } else {
            self.categories.len().saturating_sub(index + 1) as f64
        };
        r0.min(r1) + bw * self.padding_outer + step * slot
    }

    /// Returns the pixel center of the band at `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.start(index) + self.band_width() / 2.0
    }
}

/// A concrete scale for one axis.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartScale {
    /// Linear numeric scale.
    Linear(ScaleLinear),
    /// Logarithmic scale.
    Log(ScaleLog),
    /// Time scale over milliseconds.
    Time(ScaleTime),
    /// Band scale over categories.
    Band(ScaleBand),
}

/// The domain handed to [`build_scale`].
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleDomain {
    /// A numeric `[min, max]` pair.
    Continuous(f64, f64),
    /// An ordered, already sliced category list.
    Categories(Vec<String>),
}

/// A generated tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    /// Tick value (category index on band scales).
    pub value: f64,
    /// Pixel position along the axis (band center on band scales).
    pub position: f64,
    /// Formatted label.
    pub label: String,
}

impl ChartScale {
    /// Returns the band width if this scale is categorical.
    pub fn bandwidth(&self) -> Option<f64> {
        match self {
            Self::Band(b) => Some(b.band_width()),
            _ => None,
        }
    }

    /// Whether this scale is categorical.
    pub fn is_categorical(&self) -> bool {
        self.bandwidth().is_some()
    }

    /// Returns the pixel range this scale was built for.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Linear(s) => s.range,
            Self::Log(s) => s.range,
            Self::Time(s) => s.inner.range,
            Self::Band(s) => s.range,
        }
    }

    /// Returns the numeric domain (category index bounds on band scales).
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Self::Linear(s) => s.domain,
            Self::Log(s) => s.domain,
            Self::Time(s) => s.inner.domain,
            Self::Band(s) => (0.0, s.categories.len().saturating_sub(1) as f64),
        }
    }

    /// Maps a number. On band scales the number is a category index and the band start is
    /// returned.
    pub fn map_number(&self, v: f64) -> f64 {
        match self {
            Self::Linear(s) => s.map(v),
            Self::Log(s) => s.map(v),
            Self::Time(s) => s.map(v),
            Self::Band(s) => {
                let index = if v.is_finite() && v > 0.0 {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "finite and positive; saturates on overflow"
                    )]
                    {
                        v.round() as usize
                    }
                } else {
                    0
                };
                s.start(index)
            }
        }
    }

    /// Maps an axis value to the start of its position: the band start on categorical scales,
    /// the mapped number otherwise. Returns `None` for categories not on the scale and for
    /// categories on continuous scales.
    pub fn map_value(&self, value: &AxisValue) -> Option<f64> {
        match (self, value) {
            (Self::Band(b), AxisValue::Category(c)) => b.index_of(c).map(|i| b.start(i)),
            (Self::Band(_), AxisValue::Number(n)) => n.is_finite().then(|| self.map_number(*n)),
            (_, AxisValue::Number(n)) => n.is_finite().then(|| self.map_number(*n)),
            (_, AxisValue::Category(_)) => None,
        }
    }

    /// Maps an axis value to its centered position (half a band past the start on categorical
    /// scales).
    pub fn map_center(&self, value: &AxisValue) -> Option<f64> {
        let start = self.map_value(value)?;
        Some(start + self.bandwidth().unwrap_or(0.0) / 2.0)
    }

    /// Returns the category index of a value on a band scale.
    pub fn category_index(&self, value: &AxisValue) -> Option<usize> {
        match (self, value) {
            (Self::Band(b), AxisValue::Category(c)) => b.index_of(c),
            _ => None,
        }
    }

    /// Generates formatted ticks.
    ///
    /// `count` is the approximate number of ticks for continuous scales; `max_count` caps the
    /// result by keeping the first tick of every stride group.
    pub fn ticks(&self, count: usize, max_count: Option<usize>) -> Vec<Tick> {
        let ticks = match self {
            Self::Band(b) => b
                .categories
                .iter()
                .enumerate()
                .map(|(i, c)| Tick {
                    value: i as f64,
                    position: b.center(i),
                    label: c.clone(),
                })
                .collect(),
            Self::Linear(s) => {
                let values = s.ticks(count);
                let step = tick_step(&values);
                values
                    .into_iter()
                    .map(|v| Tick {
                        value: v,
                        position: s.map(v),
                        label: format_number(v, step),
                    })
                    .collect()
            }
            Self::Log(s) => s
                .ticks(count)
                .into_iter()
                .map(|v| Tick {
                    value: v,
                    position: s.map(v),
                    label: format_number(v, v),
                })
                .collect(),
            Self::Time(s) => {
                let values = s.ticks(count);
                let step = tick_step(&values);
                values
                    .into_iter()
                    .map(|v| Tick {
                        value: v,
                        position: s.map(v),
                        label: time::format_time_ms(v, step),
                    })
                    .collect()
            }
        };
        match max_count {
            Some(max) => downsample(ticks, max),
            None => ticks,
        }
    }
}

/// Builds the scale for `axis` over `domain`, mapped to the pixel `range`.
///
/// A continuous domain handed to a category axis produces an empty band scale; a category
/// domain handed to a continuous axis maps category indices linearly.
pub fn build_scale(axis: &AxisConfig, domain: ScaleDomain, range: (f64, f64)) -> ChartScale {
    match (axis.axis_type, domain) {
        (AxisType::Category, ScaleDomain::Categories(categories)) => {
            ChartScale::Band(ScaleBand::new(range, categories))
        }
        (AxisType::Category, ScaleDomain::Continuous(..)) => {
            ChartScale::Band(ScaleBand::new(range, Vec::new()))
        }
        (_, ScaleDomain::Categories(categories)) => ChartScale::Linear(ScaleLinear::new(
            (0.0, categories.len().saturating_sub(1) as f64),
            range,
        )),
        (AxisType::Linear, ScaleDomain::Continuous(min, max)) => {
            ChartScale::Linear(ScaleLinear::new((min, max), range))
        }
        (AxisType::Logarithmic, ScaleDomain::Continuous(min, max)) => {
            ChartScale::Log(ScaleLog::new((min, max), range))
        }
        (AxisType::Datetime, ScaleDomain::Continuous(min, max)) => {
            ChartScale::Time(ScaleTime::new((min, max), range))
        }
    }
}

/// Returns the tick count for an axis spanning `range_len` pixels.
///
/// With a pixel interval the count is `ceil(range_len / pixel_interval)`, otherwise the axis'
/// configured default.
pub fn tick_count(axis: &AxisConfig, range_len: f64) -> usize {
    match axis.pixel_interval {
        Some(interval) if interval > 0.0 && range_len.is_finite() => {
            let n = (range_len.abs() / interval).ceil().clamp(1.0, 10_000.0);
            #[allow(clippy::cast_possible_truncation, reason = "clamped to [1, 10k]")]
            {
                n as usize
            }
        }
        _ => axis.tick_count,
    }
}

/// Keeps the first item of every group of `ceil(len / max)` items.
pub fn downsample<T>(items: Vec<T>, max: usize) -> Vec<T> {
    if max == 0 || items.len() <= max {
        return items;
    }
    let stride = items.len().div_ceil(max);
    items
        .into_iter()
        .enumerate()
        .filter_map(|(i, t)| (i % stride == 0).then_some(t))
        .collect()
}

fn tick_step(values: &[f64]) -> f64 {
    match values {
        [a, b, ..] => (b - a).abs(),
        [a] => a.abs(),
        [] => 0.0,
    }
}

fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let step = nice_step((max - min) / count as f64);
    if step == 0.0 {
        return alloc::vec![min, max];
    }
    ticks_in_range(min, max, step)
}

/// Returns the multiples of `step` inside `[min, max]`.
pub(crate) fn ticks_in_range(min: f64, max: f64, step: f64) -> Vec<f64> {
    let start = (min / step - 1e-9).ceil();
    let stop = (max / step + 1e-9).floor();
    let n_f = stop - start;
    if !n_f.is_finite() || n_f < 0.0 {
        return Vec::new();
    }
    let n = {
        let n_f = n_f.min(10_000.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by finite/non-negative checks and capped at 10k"
        )]
        {
            n_f as u64
        }
    };
    (0..=n).map(|i| (start + i as f64) * step).collect()
}

/// Rounds a raw step to 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn band(names: &[&str], range: (f64, f64)) -> ScaleBand {
        ScaleBand::new(range, names.iter().map(|s| String::from(*s)).collect())
    }

    #[test]
    fn linear_ticks_stay_inside_the_domain() {
        let s = ScaleLinear::new((-5.0, 10.0), (0.0, 100.0));
        assert_eq!(s.ticks(5), vec![-4.0, -2.0, 0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let s = ScaleLinear::new((0.0, 0.3), (0.0, 100.0));
        assert_eq!(s.ticks(3).len(), 4, "the 0.3 end tick survives rounding");
    }

    #[test]
    fn linear_scale_inverts() {
        let s = ScaleLinear::new((0.0, 50.0), (200.0, 0.0));
        assert_eq!(s.map(25.0), 100.0);
        assert_eq!(s.invert(100.0), 25.0);
    }

    #[test]
    fn log_scale_maps_endpoints_and_ticks_decades() {
        let s = ScaleLog::new((1.0, 1000.0), (0.0, 30.0));
        assert!((s.map(1.0) - 0.0).abs() < 1e-9);
        assert!((s.map(100.0) - 20.0).abs() < 1e-9);
        assert_eq!(s.ticks(10), vec![1.0, 10.0, 100.0, 1000.0]);
    }

    #[test]
    fn band_scale_centers_and_reverses() {
        let b = band(&["a", "b", "c", "d"], (0.0, 100.0));
        assert_eq!(b.band_width(), 25.0);
        assert_eq!(b.start(1), 25.0);
        assert_eq!(b.center(1), 37.5);

        let r = band(&["a", "b", "c", "d"], (100.0, 0.0));
        assert_eq!(r.start(0), 75.0, "first category sits at the range start");
    }

    #[test]
    fn chart_scale_reports_bandwidth_only_when_categorical() {
        let b = ChartScale::Band(band(&["a", "b"], (0.0, 10.0)));
        assert_eq!(b.bandwidth(), Some(5.0));
        assert_eq!(b.map_center(&AxisValue::from("b")), Some(7.5));
        assert_eq!(b.map_value(&AxisValue::from("z")), None);

        let l = ChartScale::Linear(ScaleLinear::new((0.0, 1.0), (0.0, 10.0)));
        assert_eq!(l.bandwidth(), None);
        assert_eq!(l.map_center(&AxisValue::from(0.5)), Some(5.0));
    }

    #[test]
    fn pixel_interval_sets_the_tick_count() {
        let axis = AxisConfig::linear().with_pixel_interval(30.0);
        assert_eq!(tick_count(&axis, 100.0), 4);
        assert_eq!(tick_count(&AxisConfig::linear(), 100.0), 10);
    }

    #[test]
    fn downsample_keeps_first_of_each_stride() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(downsample(items.clone(), 4), vec![0, 3, 6, 9]);
        assert_eq!(downsample(items.clone(), 5), vec![0, 2, 4, 6, 8]);
        assert_eq!(downsample(items, 20).len(), 10);
    }

    #[test]
    fn max_tick_count_caps_category_ticks() {
        let b = ChartScale::Band(band(&["a", "b", "c", "d", "e"], (0.0, 50.0)));
        let ticks = b.ticks(10, Some(2));
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "d"]);
        assert_eq!(ticks[0].position, 5.0);
    }

    #[test]
    fn linear_tick_labels_use_step_precision() {
        let s = ChartScale::Linear(ScaleLinear::new((0.0, 1.0), (0.0, 100.0)));
        let ticks = s.ticks(5, None);
        assert_eq!(ticks[1].label, "0.2");
        assert_eq!(ticks.last().map(|t| t.label.as_str()), Some("1.0"));
    }
}
