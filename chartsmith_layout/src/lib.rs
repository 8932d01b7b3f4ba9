// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative chart layout.
//!
//! This crate turns a plain-data chart description ([`ChartData`]) into concrete geometry:
//! - **Scales** (linear, logarithmic, datetime, category) with min/max overrides, category
//!   ordering and slicing, and tick generation.
//! - **Domains** aggregated per axis with kind-specific rules (horizontal bars on X, stacked
//!   sums, waterfall running totals).
//! - **Stacking** in normal and percent modes, positive and negative values stacked apart.
//! - **Label layout**: ellipsis truncation, rotated label budgets, overlap filtering and word
//!   wrapping for titles.
//! - **Bounds**: reconciling title, legend, axis guides and the range slider into a plot
//!   rectangle, optionally split into several plots.
//! - **Zoom filtering** with boundary points for continuous strokes.
//! - **Interaction helpers**: crosshair geometry, an event dispatcher and a resize debouncer.
//!
//! [`prepare_chart`] runs the whole pipeline. Text is measured through
//! [`chartsmith_text::TextMeasurer`] once a [`chartsmith_text::FontsReady`] gate resolves, so
//! the layout math stays independent of any DOM or font stack.
//!
//! Rendering is out of scope: outputs are rectangles, lines, points and strings in chart
//! coordinates.

#![no_std]

extern crate alloc;

mod axis;
mod chart;
mod crosshair;
mod dispatch;
mod domain;
mod error;
#[cfg(all(not(feature = "std"), not(test)))]
mod float;
mod format;
mod label;
mod layout;
mod legend;
mod nulls;
#[cfg(test)]
mod pipeline_tests;
mod prepare;
mod resize;
mod scale;
mod series;
mod stack;
mod time;
mod title;
mod zoom;

pub use axis::{
    AxisConfig, AxisLabels, AxisOrder, AxisPosition, AxisTitle, AxisType, CrosshairConfig,
    PlotBand, PlotLine, get_axis_categories, order_categories,
};
pub use chart::{
    ChartData, ChartOptions, LegendAlign, LegendConfig, LegendPosition, Margin, PALETTE,
    RangeSliderConfig, SplitConfig, TitleConfig, ZoomConfig, ZoomType, palette_color,
};
pub use crosshair::{
    Crosshair, CrosshairAxis, CrosshairGeometry, HoverChunk, HoverEvent, crosshair_lines,
};
pub use dispatch::{Dispatcher, Emitter, Event, Handler, SubscriptionId, Topic};
pub use domain::{DataDomain, compute_domain, compute_domain_with, resolve_domain};
pub use error::{AxisRole, LayoutError};
pub use format::{format_number, step_precision};
pub use label::{
    ELLIPSIS, PositionedLabel, WrappedRow, ellipsize, filter_overlapping, rotated_size,
    rotated_width_budget, word_segments, wrap_text, wrap_with_limit,
};
pub use layout::{
    Bounds, BoundsInput, GuideSpace, LegendSpace, Size, XAxisSpace, YAxisSpace, solve_bounds,
    split_plots,
};
pub use legend::{
    LegendEntry, LegendItemLayout, LegendLayout, layout_legend, legend_enabled, legend_entries,
};
pub use nulls::{NullResolved, ResolvedValue, apply_null_mode, resolve_series_nulls};
pub use prepare::{
    PreparedAxis, PreparedChart, PreparedPoint, PreparedSankey, PreparedSeries, PreparedTitle,
    prepare_chart,
};
pub use resize::{ResizeDebouncer, ResizeTicket};
pub use scale::{
    ChartScale, ScaleBand, ScaleDomain, ScaleLinear, ScaleLog, ScaleTime, Tick, build_scale,
    downsample, nice_step, tick_count,
};
pub use series::{
    AxisValue, BoxplotPoint, CartesianPoint, HeatmapPoint, NamedValue, NullMode, SankeyPoint,
    SankeyTarget, Series, SeriesData, SeriesKind, Stacking, TreemapPoint, WaterfallPoint,
};
pub use stack::{
    Span, StackGroup, StackKey, StackedValues, compute_stacked_offsets, compute_stacks,
    stack_groups, waterfall_steps,
};
pub use time::{
    DAY, HOUR, MINUTE, MONTH, SECOND, WEEK, YEAR, format_time_ms, nice_time_step_ms,
    nice_time_ticks_ms,
};
pub use title::{TitleLayout, layout_text_block, layout_title};
pub use zoom::{ZoomFiltered, ZoomState, filter_to_zoom};
