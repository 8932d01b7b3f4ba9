// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis configuration.
//!
//! An axis is described once per chart: the X axis is shared by every plot, Y axes are plural
//! (multiple scales, split plots). Ticks, pixel ranges and resolved categories are computed per
//! layout pass and live in [`crate::PreparedAxis`].

use alloc::string::String;
use alloc::vec::Vec;

use peniko::Color;

use crate::error::AxisRole;
#[cfg(all(not(feature = "std"), not(test)))]
use crate::float::FloatExt;
use crate::series::AxisValue;

/// The scale family of an axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AxisType {
    /// Linear numeric scale.
    #[default]
    Linear,
    /// Base-10 logarithmic scale.
    Logarithmic,
    /// Time scale over milliseconds since the Unix epoch.
    Datetime,
    /// Band scale over an ordered category list.
    Category,
}

/// An ordering applied to the category list before slicing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum AxisOrder {
    /// Reverse the given order.
    Reverse,
    /// Sort ascending.
    SortAsc,
    /// Sort descending.
    SortDesc,
}

/// Which side of the plot a Y axis is drawn on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AxisPosition {
    /// Left of the plot.
    #[default]
    Left,
    /// Right of the plot.
    Right,
}

/// Axis title options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AxisTitle {
    /// Title text; no space is reserved when absent or empty.
    pub text: Option<String>,
    /// Gap between the title and the labels. Defaults to 4 on X and 8 on Y.
    pub margin: Option<f64>,
    /// Maximum number of wrapped rows.
    pub max_rows: usize,
    /// Font size.
    pub font_size: f64,
}

impl Default for AxisTitle {
    fn default() -> Self {
        Self {
            text: None,
            margin: None,
            max_rows: 1,
            font_size: 14.0,
        }
    }
}

impl AxisTitle {
    /// Returns the title text if it is present and non-empty.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns the title margin for an axis role.
    #[must_use]
    pub fn margin_for(&self, role: AxisRole) -> f64 {
        self.margin.unwrap_or(match role {
            AxisRole::X => 4.0,
            AxisRole::Y => 8.0,
        })
    }
}

/// Axis label options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AxisLabels {
    /// Whether tick labels are drawn and reserve space.
    pub enabled: bool,
    /// Gap between the plot edge and the labels.
    pub margin: f64,
    /// Rotation in degrees (X labels only).
    pub rotation: f64,
    /// Font size.
    pub font_size: f64,
    /// Extra spacing required between neighboring labels.
    pub padding: f64,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            enabled: true,
            margin: 10.0,
            rotation: 0.0,
            font_size: 11.0,
            padding: 0.0,
        }
    }
}

/// A shaded region between two axis values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct PlotBand {
    /// Start value (a category name on category axes).
    pub from: AxisValue,
    /// End value (a category name on category axes).
    pub to: AxisValue,
    /// Fill color.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::series::color_serde::option")
    )]
    pub color: Option<Color>,
}

/// A line at a fixed axis value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct PlotLine {
    /// Axis value (a category name on category axes).
    pub value: AxisValue,
    /// Stroke width.
    #[cfg_attr(feature = "serde", serde(default = "default_line_width"))]
    pub width: f64,
    /// Stroke color.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::series::color_serde::option")
    )]
    pub color: Option<Color>,
}

#[cfg(feature = "serde")]
fn default_line_width() -> f64 {
    1.0
}

/// Crosshair options for an axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CrosshairConfig {
    /// Whether a crosshair line is drawn along this axis.
    pub enabled: bool,
    /// Snap to the nearest hovered data point instead of following the pointer.
    pub snap: bool,
    /// Stroke width.
    pub width: f64,
}

impl Default for CrosshairConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            snap: true,
            width: 1.0,
        }
    }
}

/// Configuration of one axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AxisConfig {
    /// Scale family.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub axis_type: AxisType,
    /// Explicit minimum (a category index on category axes).
    pub min: Option<f64>,
    /// Explicit maximum (a category index on category axes).
    pub max: Option<f64>,
    /// Category list for category axes.
    pub categories: Vec<String>,
    /// Ordering applied to `categories`.
    pub order: Option<AxisOrder>,
    /// Title options.
    pub title: AxisTitle,
    /// Label options.
    pub labels: AxisLabels,
    /// Shaded regions.
    pub plot_bands: Vec<PlotBand>,
    /// Lines at fixed values.
    pub plot_lines: Vec<PlotLine>,
    /// Crosshair options.
    pub crosshair: CrosshairConfig,
    /// Split plot this axis renders into (Y axes only).
    pub plot_index: usize,
    /// Side of the plot (Y axes only).
    pub position: AxisPosition,
    /// Preferred pixel distance between ticks; overrides `tick_count`.
    pub pixel_interval: Option<f64>,
    /// Upper bound on the number of ticks after generation.
    pub max_tick_count: Option<usize>,
    /// Approximate tick count when no pixel interval is set.
    pub tick_count: usize,
    /// Fraction of the span added above the data maximum. Defaults to 0.05 on Y, 0 on X.
    pub max_padding: Option<f64>,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            axis_type: AxisType::Linear,
            min: None,
            max: None,
            categories: Vec::new(),
            order: None,
            title: AxisTitle::default(),
            labels: AxisLabels::default(),
            plot_bands: Vec::new(),
            plot_lines: Vec::new(),
            crosshair: CrosshairConfig::default(),
            plot_index: 0,
            position: AxisPosition::Left,
            pixel_interval: None,
            max_tick_count: None,
            tick_count: 10,
            max_padding: None,
        }
    }
}

impl AxisConfig {
    /// Creates a linear axis.
    #[must_use]
    pub fn linear() -> Self {
        Self::default()
    }

    /// Creates a category axis over `categories`.
    pub fn category<S: Into<String>>(categories: impl IntoIterator<Item = S>) -> Self {
        Self {
            axis_type: AxisType::Category,
            categories: categories.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Creates an axis of the given type.
    #[must_use]
    pub fn of_type(axis_type: AxisType) -> Self {
        Self {
            axis_type,
            ..Self::default()
        }
    }

    /// Sets explicit bounds.
    #[must_use]
    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Sets the category order.
    #[must_use]
    pub fn with_order(mut self, order: AxisOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the title text.
    #[must_use]
    pub fn with_title(mut self, text: impl Into<String>) -> Self {
        self.title.text = Some(text.into());
        self
    }

    /// Sets the label options.
    #[must_use]
    pub fn with_labels(mut self, labels: AxisLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Adds a plot band.
    #[must_use]
    pub fn with_plot_band(mut self, from: impl Into<AxisValue>, to: impl Into<AxisValue>) -> Self {
        self.plot_bands.push(PlotBand {
            from: from.into(),
            to: to.into(),
            color: None,
        });
        self
    }

    /// Adds a plot line.
    #[must_use]
    pub fn with_plot_line(mut self, value: impl Into<AxisValue>) -> Self {
        self.plot_lines.push(PlotLine {
            value: value.into(),
            width: 1.0,
            color: None,
        });
        self
    }

    /// Sets the crosshair options.
    #[must_use]
    pub fn with_crosshair(mut self, crosshair: CrosshairConfig) -> Self {
        self.crosshair = crosshair;
        self
    }

    /// Sets the split plot index.
    #[must_use]
    pub fn with_plot_index(mut self, plot_index: usize) -> Self {
        self.plot_index = plot_index;
        self
    }

    /// Sets the side of the plot.
    #[must_use]
    pub fn with_position(mut self, position: AxisPosition) -> Self {
        self.position = position;
        self
    }

    /// Sets the preferred pixel distance between ticks.
    #[must_use]
    pub fn with_pixel_interval(mut self, pixel_interval: f64) -> Self {
        self.pixel_interval = Some(pixel_interval);
        self
    }

    /// Caps the number of ticks.
    #[must_use]
    pub fn with_max_tick_count(mut self, max_tick_count: usize) -> Self {
        self.max_tick_count = Some(max_tick_count);
        self
    }

    /// Sets the top padding fraction.
    #[must_use]
    pub fn with_max_padding(mut self, max_padding: f64) -> Self {
        self.max_padding = Some(max_padding);
        self
    }

    /// Returns the top padding fraction for an axis role.
    #[must_use]
    pub fn max_padding_for(&self, role: AxisRole) -> f64 {
        self.max_padding
            .unwrap_or(match role {
                AxisRole::X => 0.0,
                AxisRole::Y => 0.05,
            })
            .max(0.0)
    }

    /// Returns the categories after ordering and slicing by `min`/`max`.
    #[must_use]
    pub fn resolved_categories(&self) -> Vec<String> {
        get_axis_categories(&self.categories, self.order, self.min, self.max)
    }

    /// Returns the categories after ordering, without slicing.
    #[must_use]
    pub fn ordered_categories(&self) -> Vec<String> {
        order_categories(&self.categories, self.order)
    }
}

/// Applies an [`AxisOrder`] to a category list.
#[must_use]
pub fn order_categories(categories: &[String], order: Option<AxisOrder>) -> Vec<String> {
    let mut out = categories.to_vec();
    match order {
        None => {}
        Some(AxisOrder::Reverse) => out.reverse(),
        Some(AxisOrder::SortAsc) => out.sort(),
        Some(AxisOrder::SortDesc) => out.sort_by(|a, b| b.cmp(a)),
    }
    out
}

/// Returns the ordered categories sliced to the index range `[min, max]`.
///
/// The bounds are normalized so `min <= max`, the slice end is inclusive, and both ends are
/// clamped to `[0, len]`. Missing bounds default to the full list.
#[must_use]
pub fn get_axis_categories(
    categories: &[String],
    order: Option<AxisOrder>,
    min: Option<f64>,
    max: Option<f64>,
) -> Vec<String> {
    let ordered = order_categories(categories, order);
    let (start, end) = category_slice(ordered.len(), min, max);
    ordered[start..end].to_vec()
}

/// Converts possibly reversed index bounds into a clamped half-open slice.
///
/// Only whole categories inside `[min, max]` are kept: a fractional `min` rounds up and a
/// fractional `max` rounds down. The zoom filter uses the same slice for point membership.
pub(crate) fn category_slice(len: usize, min: Option<f64>, max: Option<f64>) -> (usize, usize) {
    let lo = min.unwrap_or(0.0);
    let hi = max.unwrap_or(len as f64 - 1.0);
    let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
    let (lo, hi) = (lo.ceil(), hi.floor());
    let clamp = |v: f64| -> usize {
        if v.is_nan() || v <= 0.0 {
            return 0;
        }
        let v = v.min(len as f64);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "value is clamped to [0, len] above"
        )]
        {
            v as usize
        }
    };
    let start = clamp(lo);
    let end = clamp(hi + 1.0).max(start);
    (start, end)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn cats(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn category_slice_is_inclusive_and_normalized() {
        let c = cats(&["a", "b", "c", "d", "e"]);
        assert_eq!(
            get_axis_categories(&c, None, Some(1.0), Some(3.0)),
            cats(&["b", "c", "d"])
        );
        assert_eq!(
            get_axis_categories(&c, None, Some(3.0), Some(1.0)),
            cats(&["b", "c", "d"])
        );
    }

    #[test]
    fn category_slice_clamps_out_of_range_bounds() {
        let c = cats(&["a", "b", "c"]);
        assert_eq!(get_axis_categories(&c, None, Some(-4.0), Some(10.0)), c);
        assert_eq!(
            get_axis_categories(&c, None, Some(2.0), None),
            cats(&["c"])
        );
        assert!(get_axis_categories(&c, None, Some(7.0), Some(9.0)).is_empty());
    }

    #[test]
    fn fractional_bounds_keep_only_whole_categories() {
        let c = cats(&["a", "b", "c", "d"]);
        assert_eq!(
            get_axis_categories(&c, None, Some(0.5), Some(2.5)),
            cats(&["b", "c"])
        );
        assert_eq!(category_slice(4, Some(2.5), Some(0.5)), (1, 3));
        assert!(get_axis_categories(&c, None, Some(1.2), Some(1.8)).is_empty());
    }

    #[test]
    fn ordering_happens_before_slicing() {
        let c = cats(&["b", "c", "a"]);
        assert_eq!(
            get_axis_categories(&c, Some(AxisOrder::SortAsc), Some(0.0), Some(1.0)),
            cats(&["a", "b"])
        );
        assert_eq!(
            get_axis_categories(&c, Some(AxisOrder::SortDesc), None, None),
            cats(&["c", "b", "a"])
        );
        assert_eq!(
            get_axis_categories(&c, Some(AxisOrder::Reverse), Some(0.0), Some(0.0)),
            vec![String::from("a")]
        );
    }

    #[test]
    fn title_margin_depends_on_role() {
        let title = AxisTitle::default();
        assert_eq!(title.margin_for(AxisRole::X), 4.0);
        assert_eq!(title.margin_for(AxisRole::Y), 8.0);
    }
}
