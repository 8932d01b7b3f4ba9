// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart description consumed by [`crate::prepare_chart`].

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use peniko::Color;
use peniko::color::palette::css;

use crate::axis::AxisConfig;
use crate::series::Series;

/// Default series colors, repeated when a chart has more series than entries.
pub const PALETTE: [Color; 8] = [
    css::CORNFLOWER_BLUE,
    css::ORANGE,
    css::MEDIUM_SEA_GREEN,
    css::CRIMSON,
    css::GOLDENROD,
    css::SLATE_BLUE,
    css::DARK_CYAN,
    css::HOT_PINK,
];

/// Returns the palette color for position `index`.
#[must_use]
pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

/// Space kept free around the chart, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Margin {
    /// Top margin.
    pub top: f64,
    /// Right margin.
    pub right: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
}

impl Margin {
    /// The same margin on all sides.
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

/// Where the legend is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LegendPosition {
    /// Above the plot, below the title.
    Top,
    /// Below the plot and X axis.
    #[default]
    Bottom,
    /// Left of the plot.
    Left,
    /// Right of the plot.
    Right,
}

impl LegendPosition {
    /// Whether items flow in horizontal lines.
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Horizontal alignment of legend lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LegendAlign {
    /// Flush left.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush right.
    Right,
}

/// Legend options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct LegendConfig {
    /// Forces the legend on or off; by default it is shown for more than one entry.
    pub enabled: Option<bool>,
    /// Placement.
    pub position: LegendPosition,
    /// Line alignment for horizontal legends.
    pub align: LegendAlign,
    /// Gap between the legend and the plot area.
    pub margin: f64,
    /// Horizontal gap between items on a line.
    pub item_distance: f64,
    /// Symbol width.
    pub symbol_width: f64,
    /// Symbol height.
    pub symbol_height: f64,
    /// Gap between the symbol and the label.
    pub symbol_padding: f64,
    /// Vertical gap between lines.
    pub line_gap: f64,
    /// Label font size.
    pub font_size: f64,
    /// Width of a vertical (left/right) legend; measured from the items when absent.
    pub width: Option<f64>,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            position: LegendPosition::Bottom,
            align: LegendAlign::Center,
            margin: 15.0,
            item_distance: 20.0,
            symbol_width: 16.0,
            symbol_height: 8.0,
            symbol_padding: 5.0,
            line_gap: 10.0,
            font_size: 11.0,
            width: None,
        }
    }
}

impl LegendConfig {
    /// Sets the placement.
    #[must_use]
    pub fn with_position(mut self, position: LegendPosition) -> Self {
        self.position = position;
        self
    }

    /// Forces the legend on or off.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

/// Chart title options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TitleConfig {
    /// Title text.
    pub text: String,
    /// Font size.
    pub font_size: f64,
    /// Maximum number of wrapped rows; the last row is ellipsized.
    pub max_rows: usize,
    /// Gap between the title and the content below.
    pub margin: f64,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 14.0,
            max_rows: 2,
            margin: 10.0,
        }
    }
}

impl TitleConfig {
    /// Creates a title with default styling.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets the maximum number of rows.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

/// Split plot options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SplitConfig {
    /// Whether the plot area is split.
    pub enable: bool,
    /// Number of vertically stacked plots.
    pub plots: usize,
    /// Vertical gap between plots.
    pub gap: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            enable: false,
            plots: 1,
            gap: 20.0,
        }
    }
}

impl SplitConfig {
    /// Returns the effective number of plots.
    #[must_use]
    pub fn plot_count(&self) -> usize {
        if self.enable { self.plots.max(1) } else { 1 }
    }
}

/// Range slider options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RangeSliderConfig {
    /// Whether the slider reserves space.
    pub enabled: bool,
    /// Slider height.
    pub height: f64,
    /// Gap above the slider.
    pub margin: f64,
}

impl Default for RangeSliderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            height: 40.0,
            margin: 10.0,
        }
    }
}

/// Which dimensions a zoom gesture may constrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ZoomType {
    /// Horizontal only.
    #[default]
    X,
    /// Vertical only.
    Y,
    /// Both.
    Xy,
}

/// Zoom options.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ZoomConfig {
    /// Whether zoom state is honored.
    pub enabled: bool,
    /// Constrained dimensions.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub zoom_type: ZoomType,
}

/// Chart-level options.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ChartOptions {
    /// Outer margin.
    pub margin: Margin,
    /// Zoom options.
    pub zoom: ZoomConfig,
    /// Range slider options.
    pub range_slider: RangeSliderConfig,
}

/// A complete chart description.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ChartData {
    /// Series in drawing order.
    pub series: Vec<Series>,
    /// The shared X axis.
    pub x_axis: AxisConfig,
    /// Y axes, indexed by [`Series::y_axis`].
    pub y_axis: Vec<AxisConfig>,
    /// Legend options.
    pub legend: LegendConfig,
    /// Optional chart title.
    pub title: Option<TitleConfig>,
    /// Split plot options.
    pub split: SplitConfig,
    /// Chart-level options.
    pub chart: ChartOptions,
}

impl Default for ChartData {
    fn default() -> Self {
        Self {
            series: Vec::new(),
            x_axis: AxisConfig::default(),
            y_axis: vec![AxisConfig::default()],
            legend: LegendConfig::default(),
            title: None,
            split: SplitConfig::default(),
            chart: ChartOptions::default(),
        }
    }
}

impl ChartData {
    /// Creates a chart with the given series and default axes.
    #[must_use]
    pub fn new(series: Vec<Series>) -> Self {
        Self {
            series,
            ..Self::default()
        }
    }

    /// Sets the X axis.
    #[must_use]
    pub fn with_x_axis(mut self, axis: AxisConfig) -> Self {
        self.x_axis = axis;
        self
    }

    /// Replaces the Y axes.
    #[must_use]
    pub fn with_y_axes(mut self, axes: Vec<AxisConfig>) -> Self {
        self.y_axis = axes;
        self
    }

    /// Sets the legend options.
    #[must_use]
    pub fn with_legend(mut self, legend: LegendConfig) -> Self {
        self.legend = legend;
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: TitleConfig) -> Self {
        self.title = Some(title);
        self
    }

    /// Sets the split options.
    #[must_use]
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Sets the chart options.
    #[must_use]
    pub fn with_chart(mut self, chart: ChartOptions) -> Self {
        self.chart = chart;
        self
    }

    /// Returns the color of series `index`: its own color or the palette entry.
    #[must_use]
    pub fn series_color(&self, index: usize) -> Color {
        self.series
            .get(index)
            .and_then(|s| s.color)
            .unwrap_or_else(|| palette_color(index))
    }

    /// Whether any visible series is placed on Cartesian axes.
    #[must_use]
    pub fn has_axis_related_series(&self) -> bool {
        self.series
            .iter()
            .any(|s| s.visible && s.kind().is_axis_related())
    }
}
