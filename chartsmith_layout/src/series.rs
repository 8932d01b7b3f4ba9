// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Series input model.
//!
//! A [`Series`] is a closed variant over chart kinds. Every per-kind decision in the pipeline
//! (domain rules, stacking eligibility, whether the series uses Cartesian axes) is an exhaustive
//! `match` over [`SeriesData`], so adding a kind forces every rule to be revisited.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use peniko::Color;

/// The chart kind of a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    /// Connected points.
    Line,
    /// Connected points filled down to a baseline.
    Area,
    /// Vertical bars over the X axis.
    BarX,
    /// Horizontal bars over the Y axis.
    BarY,
    /// Unconnected points.
    Scatter,
    /// Pie or donut sectors.
    Pie,
    /// Running-total bars.
    Waterfall,
    /// Nested rectangles.
    Treemap,
    /// Node-link flow diagram.
    Sankey,
    /// Polar polygons.
    Radar,
    /// Colored grid cells.
    Heatmap,
    /// Box-and-whisker summaries.
    Boxplot,
    /// Narrowing stages.
    Funnel,
}

impl SeriesKind {
    /// Returns the kebab-case name used in chart descriptions.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Area => "area",
            Self::BarX => "bar-x",
            Self::BarY => "bar-y",
            Self::Scatter => "scatter",
            Self::Pie => "pie",
            Self::Waterfall => "waterfall",
            Self::Treemap => "treemap",
            Self::Sankey => "sankey",
            Self::Radar => "radar",
            Self::Heatmap => "heatmap",
            Self::Boxplot => "boxplot",
            Self::Funnel => "funnel",
        }
    }

    /// Whether series of this kind are placed on the Cartesian X/Y axes.
    #[must_use]
    pub fn is_axis_related(self) -> bool {
        match self {
            Self::Line
            | Self::Area
            | Self::BarX
            | Self::BarY
            | Self::Scatter
            | Self::Waterfall
            | Self::Heatmap
            | Self::Boxplot => true,
            Self::Pie | Self::Treemap | Self::Sankey | Self::Radar | Self::Funnel => false,
        }
    }

    /// Whether the series is drawn as a continuous stroke.
    #[must_use]
    pub fn is_continuous(self) -> bool {
        matches!(self, Self::Line | Self::Area)
    }

    /// Whether the series can take part in a stack group.
    #[must_use]
    pub fn is_stackable(self) -> bool {
        matches!(self, Self::Area | Self::BarX | Self::BarY | Self::Line)
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How members of a stack group are accumulated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Stacking {
    /// Values are stacked on top of each other.
    Normal,
    /// Values are stacked and normalized so each category sums to 100.
    Percent,
}

/// How a missing primary coordinate is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum NullMode {
    /// Drop the point; continuous strokes break at the gap.
    #[default]
    Skip,
    /// Replace the missing value with zero.
    Zero,
    /// Drop the point; continuous strokes bridge the gap.
    Connect,
}

/// A coordinate on an axis: numeric (linear, logarithmic, datetime) or a category name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AxisValue {
    /// A number, or a datetime in milliseconds since the Unix epoch.
    Number(f64),
    /// A category name.
    Category(String),
}

impl AxisValue {
    /// Returns the numeric value, if any.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Returns the category name, if any.
    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(c) => Some(c),
            Self::Number(_) => None,
        }
    }
}

impl From<f64> for AxisValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AxisValue {
    fn from(value: &str) -> Self {
        Self::Category(String::from(value))
    }
}

impl From<String> for AxisValue {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

/// A point of a line, area, bar, or scatter series.
///
/// For `bar-y` series `x` is the value and `y` the category; for every other kind `x` is the
/// position and `y` the value.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CartesianPoint {
    /// Horizontal coordinate.
    pub x: Option<AxisValue>,
    /// Vertical coordinate.
    pub y: Option<AxisValue>,
    /// Optional data label.
    pub label: Option<String>,
    /// Per-point color override.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "color_serde::option"))]
    pub color: Option<Color>,
    /// Opaque payload carried through to the renderer (tooltips).
    pub custom: Option<String>,
}

impl CartesianPoint {
    /// Creates a point from two coordinates.
    pub fn new(x: impl Into<AxisValue>, y: impl Into<AxisValue>) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
            ..Self::default()
        }
    }

    /// Creates a point whose vertical coordinate is missing.
    pub fn null_y(x: impl Into<AxisValue>) -> Self {
        Self {
            x: Some(x.into()),
            ..Self::default()
        }
    }

    /// Sets the data label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A point of a waterfall series.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WaterfallPoint {
    /// Horizontal coordinate.
    pub x: Option<AxisValue>,
    /// Change applied to the running total. Ignored for `total` points.
    pub y: Option<f64>,
    /// Draws the running total so far instead of a change.
    pub total: bool,
    /// Optional data label.
    pub label: Option<String>,
}

impl WaterfallPoint {
    /// Creates a change point.
    pub fn step(x: impl Into<AxisValue>, y: f64) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Creates a running-total point.
    pub fn total(x: impl Into<AxisValue>) -> Self {
        Self {
            x: Some(x.into()),
            total: true,
            ..Self::default()
        }
    }
}

/// A point of a boxplot series.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoxplotPoint {
    /// Horizontal coordinate.
    pub x: Option<AxisValue>,
    /// Lower whisker.
    pub low: Option<f64>,
    /// First quartile.
    pub q1: Option<f64>,
    /// Median.
    pub median: Option<f64>,
    /// Third quartile.
    pub q3: Option<f64>,
    /// Upper whisker.
    pub high: Option<f64>,
    /// Values outside the whiskers.
    pub outliers: Vec<f64>,
}

/// A cell of a heatmap series.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeatmapPoint {
    /// Horizontal coordinate.
    pub x: Option<AxisValue>,
    /// Vertical coordinate.
    pub y: Option<AxisValue>,
    /// Cell value, mapped to color by the renderer.
    pub value: Option<f64>,
}

/// A named value (pie sectors, funnel stages, radar spokes).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NamedValue {
    /// Display name.
    pub name: String,
    /// Magnitude.
    pub value: Option<f64>,
    /// Per-item color override.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "color_serde::option"))]
    pub color: Option<Color>,
}

impl NamedValue {
    /// Creates a named value.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            color: None,
        }
    }
}

/// A treemap node.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TreemapPoint {
    /// Node id, referenced by children.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Parent node id.
    pub parent_id: Option<String>,
    /// Leaf magnitude.
    pub value: Option<f64>,
}

/// An outgoing Sankey link as written in a chart description.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SankeyTarget {
    /// Target node name.
    pub name: String,
    /// Link magnitude.
    pub value: f64,
}

/// A Sankey node and its outgoing links.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SankeyPoint {
    /// Node name.
    pub name: String,
    /// Outgoing links.
    pub links: Vec<SankeyTarget>,
    /// Node color override.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "color_serde::option"))]
    pub color: Option<Color>,
}

/// Kind-specific series data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "data", rename_all = "kebab-case")
)]
pub enum SeriesData {
    /// Line points.
    Line(Vec<CartesianPoint>),
    /// Area points.
    Area(Vec<CartesianPoint>),
    /// Vertical bar points.
    BarX(Vec<CartesianPoint>),
    /// Horizontal bar points.
    BarY(Vec<CartesianPoint>),
    /// Scatter points.
    Scatter(Vec<CartesianPoint>),
    /// Pie sectors.
    Pie(Vec<NamedValue>),
    /// Waterfall steps.
    Waterfall(Vec<WaterfallPoint>),
    /// Treemap nodes.
    Treemap(Vec<TreemapPoint>),
    /// Sankey nodes with outgoing links.
    Sankey(Vec<SankeyPoint>),
    /// Radar spokes.
    Radar(Vec<NamedValue>),
    /// Heatmap cells.
    Heatmap(Vec<HeatmapPoint>),
    /// Boxplot summaries.
    Boxplot(Vec<BoxplotPoint>),
    /// Funnel stages.
    Funnel(Vec<NamedValue>),
}

impl SeriesData {
    /// Returns the kind tag.
    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        match self {
            Self::Line(_) => SeriesKind::Line,
            Self::Area(_) => SeriesKind::Area,
            Self::BarX(_) => SeriesKind::BarX,
            Self::BarY(_) => SeriesKind::BarY,
            Self::Scatter(_) => SeriesKind::Scatter,
            Self::Pie(_) => SeriesKind::Pie,
            Self::Waterfall(_) => SeriesKind::Waterfall,
            Self::Treemap(_) => SeriesKind::Treemap,
            Self::Sankey(_) => SeriesKind::Sankey,
            Self::Radar(_) => SeriesKind::Radar,
            Self::Heatmap(_) => SeriesKind::Heatmap,
            Self::Boxplot(_) => SeriesKind::Boxplot,
            Self::Funnel(_) => SeriesKind::Funnel,
        }
    }

    /// Returns the points of line, area, bar and scatter series.
    #[must_use]
    pub fn cartesian_points(&self) -> Option<&[CartesianPoint]> {
        match self {
            Self::Line(p) | Self::Area(p) | Self::BarX(p) | Self::BarY(p) | Self::Scatter(p) => {
                Some(p)
            }
            Self::Pie(_)
            | Self::Waterfall(_)
            | Self::Treemap(_)
            | Self::Sankey(_)
            | Self::Radar(_)
            | Self::Heatmap(_)
            | Self::Boxplot(_)
            | Self::Funnel(_) => None,
        }
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Line(p) | Self::Area(p) | Self::BarX(p) | Self::BarY(p) | Self::Scatter(p) => {
                p.len()
            }
            Self::Pie(p) | Self::Radar(p) | Self::Funnel(p) => p.len(),
            Self::Waterfall(p) => p.len(),
            Self::Treemap(p) => p.len(),
            Self::Sankey(p) => p.len(),
            Self::Heatmap(p) => p.len(),
            Self::Boxplot(p) => p.len(),
        }
    }

    /// Returns `true` if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One series of a chart.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Series {
    /// Display name (legend, tooltip).
    pub name: String,
    /// Optional stable id.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<String>,
    /// Hidden series keep their legend entry but take no part in layout.
    #[cfg_attr(feature = "serde", serde(default = "default_visible"))]
    pub visible: bool,
    /// Series color; a palette color is assigned when absent.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "color_serde::option")
    )]
    pub color: Option<Color>,
    /// Stacking mode; unstacked series are drawn at their raw values.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacking: Option<Stacking>,
    /// Explicit stack group id; defaults to one group per kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stack_id: Option<String>,
    /// Index of the Y axis this series is drawn against.
    #[cfg_attr(feature = "serde", serde(default))]
    pub y_axis: usize,
    /// Treatment of missing values.
    #[cfg_attr(feature = "serde", serde(default))]
    pub null_mode: NullMode,
    /// Kind-specific points.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub data: SeriesData,
}

#[cfg(feature = "serde")]
fn default_visible() -> bool {
    true
}

impl Series {
    /// Creates a visible, unstacked series on the first Y axis.
    pub fn new(name: impl Into<String>, data: SeriesData) -> Self {
        Self {
            name: name.into(),
            id: None,
            visible: true,
            color: None,
            stacking: None,
            stack_id: None,
            y_axis: 0,
            null_mode: NullMode::Skip,
            data,
        }
    }

    /// Creates a line series.
    pub fn line(name: impl Into<String>, points: Vec<CartesianPoint>) -> Self {
        Self::new(name, SeriesData::Line(points))
    }

    /// Creates an area series.
    pub fn area(name: impl Into<String>, points: Vec<CartesianPoint>) -> Self {
        Self::new(name, SeriesData::Area(points))
    }

    /// Creates a vertical bar series.
    pub fn bar_x(name: impl Into<String>, points: Vec<CartesianPoint>) -> Self {
        Self::new(name, SeriesData::BarX(points))
    }

    /// Creates a horizontal bar series.
    pub fn bar_y(name: impl Into<String>, points: Vec<CartesianPoint>) -> Self {
        Self::new(name, SeriesData::BarY(points))
    }

    /// Creates a scatter series.
    pub fn scatter(name: impl Into<String>, points: Vec<CartesianPoint>) -> Self {
        Self::new(name, SeriesData::Scatter(points))
    }

    /// Returns the kind tag.
    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        self.data.kind()
    }

    /// Sets the stacking mode.
    #[must_use]
    pub fn with_stacking(mut self, stacking: Stacking) -> Self {
        self.stacking = Some(stacking);
        self
    }

    /// Sets the explicit stack group id.
    #[must_use]
    pub fn with_stack_id(mut self, stack_id: impl Into<String>) -> Self {
        self.stack_id = Some(stack_id.into());
        self
    }

    /// Sets the target Y axis index.
    #[must_use]
    pub fn with_y_axis(mut self, y_axis: usize) -> Self {
        self.y_axis = y_axis;
        self
    }

    /// Sets the null-value treatment.
    #[must_use]
    pub fn with_null_mode(mut self, null_mode: NullMode) -> Self {
        self.null_mode = null_mode;
        self
    }

    /// Sets visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the series color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Returns the value coordinate of a Cartesian point of this series.
    ///
    /// Horizontal bars carry their value on `x`; every other kind on `y`.
    #[must_use]
    pub fn value_of(&self, point: &CartesianPoint) -> Option<f64> {
        let v = if self.kind() == SeriesKind::BarY {
            point.x.as_ref()
        } else {
            point.y.as_ref()
        };
        v.and_then(AxisValue::as_number)
    }

    /// Returns the position coordinate (the axis the value is plotted along).
    #[must_use]
    pub fn position_of<'a>(&self, point: &'a CartesianPoint) -> Option<&'a AxisValue> {
        if self.kind() == SeriesKind::BarY {
            point.y.as_ref()
        } else {
            point.x.as_ref()
        }
    }
}

/// Deserializes CSS color strings into [`Color`].
#[cfg(feature = "serde")]
pub(crate) mod color_serde {
    use alloc::format;
    use alloc::string::String;

    use peniko::Color;
    use peniko::color::{Srgb, parse_color};
    use serde::{Deserialize, Deserializer, de::Error as _};

    pub(crate) fn option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Color>, D::Error> {
        let Some(text) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        parse_color(&text)
            .map(|c| Some(c.to_alpha_color::<Srgb>()))
            .map_err(|_| D::Error::custom(format!("invalid color `{text}`")))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    #[test]
    fn bar_y_reads_its_value_from_x() {
        let point = CartesianPoint::new(7.0, "cat");
        let bars = Series::bar_y("b", vec![point.clone()]);
        assert_eq!(bars.value_of(&point), Some(7.0));
        assert_eq!(bars.position_of(&point), Some(&AxisValue::from("cat")));

        let line = Series::line("l", vec![CartesianPoint::new(1.0, 2.0)]);
        assert_eq!(line.value_of(&CartesianPoint::new(1.0, 2.0)), Some(2.0));
    }

    #[test]
    fn axis_relation_follows_kind() {
        assert!(SeriesKind::BarX.is_axis_related());
        assert!(!SeriesKind::Sankey.is_axis_related());
        assert_eq!(SeriesKind::BarY.to_string(), "bar-y");
    }
}
