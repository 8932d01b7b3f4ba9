// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout pipeline.
//!
//! [`prepare_chart`] turns a [`ChartData`] description and a container size into concrete
//! geometry. Every pass recomputes from scratch, in dependency order:
//! - zoom filtering,
//! - domain aggregation and stacking,
//! - text measurement for the title, legend and axis guides (after the fonts gate resolves),
//! - the bounds solver and split plots,
//! - scales, ticks, collision-filtered labels, plot bands and lines,
//! - per-series point geometry and sankey layouts.
//!
//! All coordinates in the output are absolute chart coordinates with the origin at the top-left
//! corner of the container.

use alloc::string::String;
use alloc::vec::Vec;

use chartsmith_sankey::{SankeyGraph, SankeyLayout, SankeyLinkInput, SankeySolver};
use chartsmith_text::{FontsReady, TextMeasurer, TextStyle, measure_labels};
use hashbrown::{HashMap, HashSet};
use kurbo::{Line, Point, Rect, Vec2};
use peniko::Color;
use smallvec::SmallVec;

use crate::axis::{AxisConfig, AxisPosition, AxisType};
use crate::chart::ChartData;
use crate::crosshair::{Crosshair, CrosshairAxis};
use crate::domain::{compute_domain_with, resolve_domain};
use crate::error::{AxisRole, LayoutError};
use crate::label::{
    PositionedLabel, ellipsize, filter_overlapping, rotated_size, rotated_width_budget,
};
use crate::layout::{
    Bounds, BoundsInput, GuideSpace, LegendSpace, Size, XAxisSpace, YAxisSpace, solve_bounds,
    split_plots,
};
use crate::legend::{LegendLayout, layout_legend, legend_enabled, legend_entries};
use crate::nulls::resolve_series_nulls;
use crate::scale::{ChartScale, ScaleDomain, Tick, build_scale, tick_count};
use crate::series::{AxisValue, SankeyPoint, Series, SeriesData, SeriesKind};
use crate::stack::{Span, StackKey, compute_stacks, waterfall_steps};
use crate::title::{TitleLayout, layout_text_block, layout_title};
use crate::zoom::{ZoomFiltered, ZoomState, filter_to_zoom};

/// Share of a category band covered by a bar group.
const BAR_GROUP_FRACTION: f64 = 0.8;

/// A placed data point.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedPoint {
    /// Index of the point in the original series data.
    pub index: usize,
    /// Horizontal position (center of bars and bands).
    pub x: f64,
    /// Vertical position (center of bars and bands on horizontal bar series).
    pub y: f64,
    /// Baseline along the value axis for bars, areas, stacked and waterfall points.
    pub base: Option<f64>,
    /// Bar or cell thickness across the position axis; zero for markers.
    pub thickness: f64,
    /// The resolved data value (after null handling and stacking).
    pub value: f64,
    /// Additional value-axis positions: low, q1, q3 and high for box plots.
    pub extra: SmallVec<[f64; 4]>,
    /// Per-point label.
    pub label: Option<String>,
}

/// Geometry of one series.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedSeries {
    /// Index of the series in the input.
    pub index: usize,
    /// Series name.
    pub name: String,
    /// Series kind.
    pub kind: SeriesKind,
    /// Resolved color.
    pub color: Color,
    /// Visibility; hidden series carry no points.
    pub visible: bool,
    /// Y axis index.
    pub y_axis: usize,
    /// Whether values run along the X axis (horizontal bars).
    pub horizontal: bool,
    /// Placed points, in series order.
    pub points: Vec<PreparedPoint>,
    /// Indices into `points` where a stroke must restart.
    pub breaks: SmallVec<[usize; 4]>,
    /// Stroke vertices for continuous series, reaching past the zoom window edges.
    pub shape: Vec<Point>,
}

/// A fully resolved axis.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedAxis {
    /// Axis role.
    pub role: AxisRole,
    /// Scale mapping data into chart coordinates.
    pub scale: ChartScale,
    /// Resolved categories (ordered and sliced) for category axes.
    pub categories: Vec<String>,
    /// Generated ticks.
    pub ticks: Vec<Tick>,
    /// Tick labels that survived ellipsis and collision filtering.
    pub labels: Vec<PositionedLabel>,
    /// Wrapped title.
    pub title: Option<TitleLayout>,
    /// Title rectangle; Y titles are meant to be drawn rotated inside it.
    pub title_rect: Option<Rect>,
    /// Plot band rectangles, in configuration order.
    pub plot_bands: Vec<Rect>,
    /// Plot lines, in configuration order.
    pub plot_lines: Vec<Line>,
    /// The plot this axis renders into.
    pub plot: Rect,
}

/// A placed chart title.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedTitle {
    /// Wrapped rows.
    pub layout: TitleLayout,
    /// Title rectangle.
    pub rect: Rect,
}

/// A laid-out sankey series.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedSankey {
    /// Index of the series in the input.
    pub series: usize,
    /// Node and link geometry inside the plot.
    pub layout: SankeyLayout,
}

/// Output of [`prepare_chart`].
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedChart {
    /// Container size.
    pub size: Size,
    /// Bounds solver output.
    pub bounds: Bounds,
    /// Split plots, top to bottom.
    pub plots: Vec<Rect>,
    /// Chart title.
    pub title: Option<PreparedTitle>,
    /// Legend with items in chart coordinates.
    pub legend: Option<LegendLayout>,
    /// The X axis.
    pub x_axis: PreparedAxis,
    /// The Y axes, in configuration order.
    pub y_axes: Vec<PreparedAxis>,
    /// Series geometry, in input order.
    pub series: Vec<PreparedSeries>,
    /// Sankey layouts.
    pub sankey: Vec<PreparedSankey>,
}

impl PreparedChart {
    /// Returns the top offset of every split plot.
    pub fn plot_offsets(&self) -> Vec<f64> {
        self.plots.iter().map(|p| p.y0).collect()
    }

    /// Builds the crosshair component for the axes that enable it.
    pub fn crosshair(&self, data: &ChartData) -> Crosshair {
        let x = data.x_axis.crosshair.enabled.then(|| CrosshairAxis {
            snap: data.x_axis.crosshair.snap,
            scale: self.x_axis.scale.clone(),
            plot: self.bounds.plot,
        });
        let y = data
            .y_axis
            .iter()
            .zip(&self.y_axes)
            .map(|(config, axis)| {
                config.crosshair.enabled.then(|| CrosshairAxis {
                    snap: config.crosshair.snap,
                    scale: axis.scale.clone(),
                    plot: axis.plot,
                })
            })
            .collect();
        Crosshair::new(x, y)
    }
}

/// Runs the full layout pipeline.
///
/// Nothing is measured before `fonts.ready()` resolves. `zoom` is ignored unless zooming is
/// enabled in the chart options, and is restricted to the dimensions the zoom type allows.
pub async fn prepare_chart<M, F>(
    data: &ChartData,
    size: Size,
    zoom: Option<&ZoomState>,
    measurer: &M,
    fonts: &F,
) -> Result<PreparedChart, LayoutError>
where
    M: TextMeasurer + ?Sized,
    F: FontsReady + ?Sized,
{
    fonts.ready().await;

    for s in &data.series {
        if s.visible && s.kind().is_axis_related() && s.y_axis >= data.y_axis.len() {
            return Err(LayoutError::MissingYAxis {
                series: s.name.clone(),
                index: s.y_axis,
            });
        }
    }

    // Category axes without explicit categories take them from the data.
    let mut x_config = with_data_categories(&data.x_axis, &data.series, AxisRole::X, None);
    let mut y_configs: Vec<AxisConfig> = data
        .y_axis
        .iter()
        .enumerate()
        .map(|(i, axis)| with_data_categories(axis, &data.series, AxisRole::Y, Some(i)))
        .collect();

    let zoom = zoom
        .filter(|_| data.chart.zoom.enabled)
        .map(|z| z.masked(data.chart.zoom.zoom_type))
        .filter(|z| !z.is_empty());
    let filtered = match &zoom {
        Some(z) => {
            let filtered = filter_to_zoom(&data.series, z, &x_config, &y_configs)?;
            apply_zoom_range(&mut x_config, z.x);
            for (i, axis) in y_configs.iter_mut().enumerate() {
                apply_zoom_range(axis, z.y.get(i).copied().flatten());
            }
            filtered
        }
        None => ZoomFiltered::unzoomed(&data.series),
    };
    let visible = &filtered.visible;

    // Domains and stacks. Stacks and waterfall totals run over the full series so the zoom
    // window does not restart them; the domains only see the spans of visible points.
    let axis_series: Vec<usize> = (0..visible.len())
        .filter(|&i| visible[i].visible && visible[i].kind().is_axis_related())
        .collect();
    let x_refs = pick(visible, &axis_series);
    let x_domain = match x_config.axis_type {
        AxisType::Category => ScaleDomain::Categories(x_config.resolved_categories()),
        _ => {
            let x_stacks = compute_stacks(&pick(&data.series, &axis_series))
                .select(&pick(&filtered.source_indices, &axis_series));
            let extent = compute_domain_with(&x_refs, &x_stacks, AxisRole::X)?;
            let (min, max) = resolve_domain(&x_config, AxisRole::X, extent);
            ScaleDomain::Continuous(min, max)
        }
    };
    let mut stacks: Vec<Option<Vec<Option<Span>>>> = alloc::vec![None; visible.len()];
    let mut y_domains = Vec::with_capacity(y_configs.len());
    for (axis_index, axis) in y_configs.iter().enumerate() {
        let members: Vec<usize> = axis_series
            .iter()
            .copied()
            .filter(|&i| visible[i].y_axis == axis_index)
            .collect();
        let refs = pick(visible, &members);
        let axis_stacks = compute_stacks(&pick(&data.series, &members));
        for (k, &i) in members.iter().enumerate() {
            stacks[i] = axis_stacks.for_series(k).map(<[Option<Span>]>::to_vec);
        }
        let domain = match axis.axis_type {
            AxisType::Category => ScaleDomain::Categories(axis.resolved_categories()),
            _ => {
                let visible_stacks =
                    axis_stacks.select(&pick(&filtered.source_indices, &members));
                let extent = compute_domain_with(&refs, &visible_stacks, AxisRole::Y)?;
                let (min, max) = resolve_domain(axis, AxisRole::Y, extent);
                ScaleDomain::Continuous(min, max)
            }
        };
        y_domains.push(domain);
    }

    // Guide measurement.
    let margin = data.chart.margin;
    let inner_width = (size.width - margin.left - margin.right).max(0.0);
    let inner_height = (size.height - margin.top - margin.bottom).max(0.0);

    let title = data
        .title
        .as_ref()
        .and_then(|t| layout_title(measurer, t, inner_width).map(|l| (l, t.margin)));

    let entries = legend_entries(data);
    let legend = legend_enabled(&data.legend, entries.len())
        .then(|| layout_legend(measurer, &data.legend, &entries, inner_width))
        .filter(|l| !l.items.is_empty());

    let axis_related = data.has_axis_related_series();
    let x_title = axis_title(measurer, &x_config, AxisRole::X, inner_width);
    let x_labels = if x_config.labels.enabled {
        let provisional = build_scale(&x_config, x_domain.clone(), (0.0, inner_width));
        let ticks = provisional.ticks(
            tick_count(&x_config, inner_width),
            x_config.max_tick_count,
        );
        let style = TextStyle::new(x_config.labels.font_size);
        let texts: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        let measured = measure_labels(measurer, fonts, &texts, &style).await;
        let width = match provisional.bandwidth() {
            Some(band) if x_config.labels.rotation == 0.0 => measured.max_width.min(band),
            _ => measured.max_width,
        };
        let (_, height) = rotated_size(width, measured.max_height, x_config.labels.rotation);
        Some(GuideSpace::new(height, x_config.labels.margin))
    } else {
        None
    };

    let mut y_spaces = Vec::with_capacity(y_configs.len());
    let mut y_titles = Vec::with_capacity(y_configs.len());
    for (axis, domain) in y_configs.iter().zip(&y_domains) {
        let title = axis_title(measurer, axis, AxisRole::Y, inner_height);
        let labels = if axis.labels.enabled {
            let provisional = build_scale(axis, domain.clone(), (inner_height, 0.0));
            let ticks = provisional.ticks(tick_count(axis, inner_height), axis.max_tick_count);
            let style = TextStyle::new(axis.labels.font_size);
            let texts: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
            let measured = measure_labels(measurer, fonts, &texts, &style).await;
            Some(GuideSpace::new(measured.max_width, axis.labels.margin))
        } else {
            None
        };
        y_spaces.push(YAxisSpace {
            position: axis.position,
            title: title
                .as_ref()
                .map(|t| GuideSpace::new(t.text_height, axis.title.margin_for(AxisRole::Y))),
            labels,
        });
        y_titles.push(title);
    }

    let range_slider = data
        .chart
        .range_slider
        .enabled
        .then(|| GuideSpace::new(data.chart.range_slider.height, data.chart.range_slider.margin));

    let bounds = solve_bounds(&BoundsInput {
        size,
        margin,
        title: title
            .as_ref()
            .map(|(l, gap)| GuideSpace::new(l.text_height, *gap)),
        legend: legend.as_ref().map(|l| LegendSpace {
            position: data.legend.position,
            width: l.width,
            height: l.height,
            margin: data.legend.margin,
        }),
        x_axis: XAxisSpace {
            title: x_title
                .as_ref()
                .map(|t| GuideSpace::new(t.text_height, x_config.title.margin_for(AxisRole::X))),
            labels: x_labels,
        },
        y_axes: y_spaces.clone(),
        range_slider,
        axis_related,
    });
    let plots = split_plots(bounds.plot, data.split.plot_count(), data.split.gap);

    // Axes.
    let plot = bounds.plot;
    let x_scale = build_scale(&x_config, x_domain, (plot.x0, plot.x1));
    let x_axis = prepare_x_axis(
        measurer,
        &x_config,
        x_scale,
        x_title,
        x_labels,
        plot,
        axis_related,
    )?;

    let mut y_axes = Vec::with_capacity(y_configs.len());
    for (i, ((axis, domain), title)) in y_configs.iter().zip(y_domains).zip(y_titles).enumerate() {
        let axis_plot = match plots.get(axis.plot_index) {
            Some(p) => *p,
            None => {
                log::warn!(
                    "y axis {i} targets plot {} of {}; using the full bounds",
                    axis.plot_index,
                    plots.len()
                );
                plot
            }
        };
        let range = match domain {
            ScaleDomain::Categories(_) => (axis_plot.y0, axis_plot.y1),
            ScaleDomain::Continuous(..) => (axis_plot.y1, axis_plot.y0),
        };
        let scale = build_scale(axis, domain, range);
        let band = bounds.y_axes.get(i).copied().flatten();
        y_axes.push(prepare_y_axis(
            measurer, axis, scale, title, y_spaces[i], band, axis_plot,
        )?);
    }

    // Series geometry.
    let slots = bar_slots(visible);
    let mut series = Vec::with_capacity(visible.len());
    let mut sankey = Vec::new();
    for (i, s) in visible.iter().enumerate() {
        let mut prepared = PreparedSeries {
            index: i,
            name: s.name.clone(),
            kind: s.kind(),
            color: data.series_color(i),
            visible: s.visible,
            y_axis: s.y_axis,
            horizontal: s.kind() == SeriesKind::BarY,
            points: Vec::new(),
            breaks: SmallVec::new(),
            shape: Vec::new(),
        };
        if s.visible {
            if let SeriesData::Sankey(points) = &s.data {
                sankey.push(PreparedSankey {
                    series: i,
                    layout: layout_sankey(points, plot)?,
                });
            } else if s.kind().is_axis_related() {
                let Some(y_axis) = y_axes.get(s.y_axis) else {
                    return Err(LayoutError::MissingYAxis {
                        series: s.name.clone(),
                        index: s.y_axis,
                    });
                };
                let ctx = SeriesContext {
                    series: s,
                    shape: &filtered.shape[i],
                    source: &filtered.source_indices[i],
                    shape_source: &filtered.shape_indices[i],
                    spans: stacks[i].as_deref(),
                    x: &x_axis.scale,
                    y: &y_axis.scale,
                    slot: slots[i],
                };
                place_series(&ctx, &mut prepared)?;
            }
        }
        series.push(prepared);
    }

    let title = title.zip(bounds.title).map(|((layout, _), rect)| PreparedTitle { layout, rect });
    let legend = legend.zip(bounds.legend).map(|(mut layout, rect)| {
        layout.translate(Vec2::new(rect.x0, rect.y0));
        layout
    });

    log::debug!(
        "prepared {} series into plot {:?} ({} split plots)",
        series.len(),
        plot,
        plots.len()
    );
    Ok(PreparedChart {
        size,
        bounds,
        plots,
        title,
        legend,
        x_axis,
        y_axes,
        series,
        sankey,
    })
}

/// Fills an empty category list from the distinct category values the series place on the axis.
fn with_data_categories(
    axis: &AxisConfig,
    series: &[Series],
    role: AxisRole,
    y_index: Option<usize>,
) -> AxisConfig {
    let mut axis = axis.clone();
    if axis.axis_type != AxisType::Category || !axis.categories.is_empty() {
        return axis;
    }
    let mut seen = HashSet::new();
    let mut push = |v: Option<&AxisValue>| {
        if let Some(c) = v.and_then(AxisValue::as_category)
            && seen.insert(String::from(c))
        {
            axis.categories.push(String::from(c));
        }
    };
    for s in series {
        if y_index.is_some_and(|i| i != s.y_axis) {
            continue;
        }
        match (&s.data, role) {
            (
                SeriesData::Line(p)
                | SeriesData::Area(p)
                | SeriesData::BarX(p)
                | SeriesData::BarY(p)
                | SeriesData::Scatter(p),
                AxisRole::X,
            ) => p.iter().for_each(|q| push(q.x.as_ref())),
            (
                SeriesData::Line(p)
                | SeriesData::Area(p)
                | SeriesData::BarX(p)
                | SeriesData::BarY(p)
                | SeriesData::Scatter(p),
                AxisRole::Y,
            ) => p.iter().for_each(|q| push(q.y.as_ref())),
            (SeriesData::Waterfall(p), AxisRole::X) => p.iter().for_each(|q| push(q.x.as_ref())),
            (SeriesData::Boxplot(p), AxisRole::X) => p.iter().for_each(|q| push(q.x.as_ref())),
            (SeriesData::Heatmap(p), AxisRole::X) => p.iter().for_each(|q| push(q.x.as_ref())),
            (SeriesData::Heatmap(p), AxisRole::Y) => p.iter().for_each(|q| push(q.y.as_ref())),
            _ => {}
        }
    }
    axis
}

/// Narrows an axis to a zoom range; category ranges are index bounds.
fn apply_zoom_range(axis: &mut AxisConfig, range: Option<(f64, f64)>) {
    if let Some((a, b)) = range {
        axis.min = Some(a.min(b));
        axis.max = Some(a.max(b));
    }
}

fn axis_title<M: TextMeasurer + ?Sized>(
    measurer: &M,
    axis: &AxisConfig,
    role: AxisRole,
    max_width: f64,
) -> Option<TitleLayout> {
    let text = axis.title.text()?;
    let layout = layout_text_block(
        measurer,
        text,
        axis.title.font_size,
        max_width,
        axis.title.max_rows,
    );
    if layout.is_none() {
        log::debug!("{role} axis title is empty");
    }
    layout
}

fn prepare_x_axis<M: TextMeasurer + ?Sized>(
    measurer: &M,
    axis: &AxisConfig,
    scale: ChartScale,
    title: Option<TitleLayout>,
    label_space: Option<GuideSpace>,
    plot: Rect,
    axis_related: bool,
) -> Result<PreparedAxis, LayoutError> {
    let (a, b) = scale.range();
    let ticks = scale.ticks(tick_count(axis, (b - a).abs()), axis.max_tick_count);

    let mut labels = Vec::new();
    if axis_related && axis.labels.enabled {
        let style = TextStyle::new(axis.labels.font_size);
        let rotation = axis.labels.rotation;
        let top = plot.y1 + axis.labels.margin;
        for tick in &ticks {
            let line_height = measurer.measure(&tick.label, &style).line_height();
            let text = match scale.bandwidth() {
                Some(band) if rotation == 0.0 => ellipsize(measurer, &tick.label, &style, band),
                Some(band) => ellipsize(
                    measurer,
                    &tick.label,
                    &style,
                    rotated_width_budget(band, line_height, rotation),
                ),
                None => tick.label.clone(),
            };
            if text.is_empty() {
                continue;
            }
            let width = measurer.measure(&text, &style).advance_width;
            let (w, h) = rotated_size(width, line_height, rotation);
            labels.push(PositionedLabel {
                text,
                rect: Rect::new(tick.position - w / 2.0, top, tick.position + w / 2.0, top + h),
            });
        }
        labels = filter_overlapping(labels, axis.labels.padding);
    }

    let title_rect = title.as_ref().filter(|_| axis_related).map(|t| {
        let top = plot.y1
            + label_space.map_or(0.0, |s| s.size + s.margin)
            + axis.title.margin_for(AxisRole::X);
        let cx = (plot.x0 + plot.x1) / 2.0;
        let w = t.width();
        Rect::new(cx - w / 2.0, top, cx + w / 2.0, top + t.text_height)
    });

    let (plot_bands, plot_lines) = resolve_plot_guides(axis, AxisRole::X, &scale, plot)?;
    Ok(PreparedAxis {
        role: AxisRole::X,
        categories: category_list(&scale),
        scale,
        ticks,
        labels,
        title,
        title_rect,
        plot_bands,
        plot_lines,
        plot,
    })
}

fn prepare_y_axis<M: TextMeasurer + ?Sized>(
    measurer: &M,
    axis: &AxisConfig,
    scale: ChartScale,
    title: Option<TitleLayout>,
    space: YAxisSpace,
    band: Option<Rect>,
    plot: Rect,
) -> Result<PreparedAxis, LayoutError> {
    let (a, b) = scale.range();
    let ticks = scale.ticks(tick_count(axis, (b - a).abs()), axis.max_tick_count);

    let mut labels = Vec::new();
    let mut title_rect = None;
    if let Some(band) = band {
        let style = TextStyle::new(axis.labels.font_size);
        if let Some(label_space) = space.labels {
            for tick in &ticks {
                let text = ellipsize(measurer, &tick.label, &style, label_space.size);
                if text.is_empty() {
                    continue;
                }
                let m = measurer.measure(&text, &style);
                let h = m.line_height();
                let (x0, x1) = match axis.position {
                    AxisPosition::Left => {
                        let right = band.x1 - label_space.margin;
                        (right - m.advance_width, right)
                    }
                    AxisPosition::Right => {
                        let left = band.x0 + label_space.margin;
                        (left, left + m.advance_width)
                    }
                };
                labels.push(PositionedLabel {
                    text,
                    rect: Rect::new(x0, tick.position - h / 2.0, x1, tick.position + h / 2.0),
                });
            }
            labels = filter_overlapping(labels, axis.labels.padding);
        }
        title_rect = title.as_ref().map(|t| {
            let (x0, x1) = match axis.position {
                AxisPosition::Left => (band.x0, band.x0 + t.text_height),
                AxisPosition::Right => (band.x1 - t.text_height, band.x1),
            };
            let cy = (plot.y0 + plot.y1) / 2.0;
            let w = t.width();
            Rect::new(x0, cy - w / 2.0, x1, cy + w / 2.0)
        });
    }

    let (plot_bands, plot_lines) = resolve_plot_guides(axis, AxisRole::Y, &scale, plot)?;
    Ok(PreparedAxis {
        role: AxisRole::Y,
        categories: category_list(&scale),
        scale,
        ticks,
        labels,
        title,
        title_rect,
        plot_bands,
        plot_lines,
        plot,
    })
}

fn category_list(scale: &ChartScale) -> Vec<String> {
    match scale {
        ChartScale::Band(b) => b.categories().to_vec(),
        _ => Vec::new(),
    }
}

/// Resolves plot bands and lines to chart coordinates.
///
/// A category value the scale cannot place is an error.
fn resolve_plot_guides(
    axis: &AxisConfig,
    role: AxisRole,
    scale: &ChartScale,
    plot: Rect,
) -> Result<(Vec<Rect>, Vec<Line>), LayoutError> {
    let place = |value: &AxisValue| -> Result<(f64, f64), LayoutError> {
        let start = scale.map_value(value).ok_or_else(|| LayoutError::UnknownCategory {
            role,
            category: match value {
                AxisValue::Category(c) => c.clone(),
                AxisValue::Number(n) => alloc::format!("{n}"),
            },
        })?;
        let band = scale.bandwidth().unwrap_or(0.0);
        Ok((start, start + band))
    };

    let mut bands = Vec::with_capacity(axis.plot_bands.len());
    for band in &axis.plot_bands {
        let (a0, a1) = place(&band.from)?;
        let (b0, b1) = place(&band.to)?;
        let lo = a0.min(a1).min(b0).min(b1);
        let hi = a0.max(a1).max(b0).max(b1);
        bands.push(match role {
            AxisRole::X => Rect::new(lo, plot.y0, hi, plot.y1),
            AxisRole::Y => Rect::new(plot.x0, lo, plot.x1, hi),
        });
    }
    let mut lines = Vec::with_capacity(axis.plot_lines.len());
    for line in &axis.plot_lines {
        let (s, e) = place(&line.value)?;
        let p = (s + e) / 2.0;
        lines.push(match role {
            AxisRole::X => Line::new((p, plot.y0), (p, plot.y1)),
            AxisRole::Y => Line::new((plot.x0, p), (plot.x1, p)),
        });
    }
    Ok((bands, lines))
}

/// Assigns each visible bar series a `(slot, slot_count)` within its category band.
///
/// A stack group shares one slot; unstacked bar series get their own.
fn bar_slots(series: &[Series]) -> Vec<Option<(usize, usize)>> {
    let mut out = alloc::vec![None; series.len()];
    for kind in [SeriesKind::BarX, SeriesKind::BarY] {
        let mut groups: HashMap<StackKey, usize> = HashMap::new();
        let mut assigned = Vec::new();
        let mut count = 0;
        for (i, s) in series.iter().enumerate() {
            if !s.visible || s.kind() != kind {
                continue;
            }
            let slot = match s.stacking {
                Some(_) => *groups
                    .entry(StackKey {
                        kind,
                        stack_id: s.stack_id.clone(),
                    })
                    .or_insert_with(|| {
                        count += 1;
                        count - 1
                    }),
                None => {
                    count += 1;
                    count - 1
                }
            };
            assigned.push((i, slot));
        }
        for (i, slot) in assigned {
            out[i] = Some((slot, count));
        }
    }
    out
}

fn pick<'a, T>(items: &'a [T], members: &[usize]) -> Vec<&'a T> {
    members.iter().map(|&i| &items[i]).collect()
}

fn layout_sankey(points: &[SankeyPoint], plot: Rect) -> Result<SankeyLayout, LayoutError> {
    let links = points
        .iter()
        .flat_map(|p| {
            p.links
                .iter()
                .map(|t| SankeyLinkInput::new(p.name.clone(), t.name.clone(), t.value))
        })
        .collect();
    let graph = SankeyGraph::from_links(links);
    Ok(SankeySolver::new(plot).solve(&graph)?)
}

struct SeriesContext<'a> {
    series: &'a Series,
    shape: &'a Series,
    source: &'a [usize],
    shape_source: &'a [usize],
    /// Stacked or waterfall spans of the unfiltered series, by original point index.
    spans: Option<&'a [Option<Span>]>,
    x: &'a ChartScale,
    y: &'a ChartScale,
    slot: Option<(usize, usize)>,
}

impl SeriesContext<'_> {
    fn original_index(&self, i: usize) -> usize {
        self.source.get(i).copied().unwrap_or(i)
    }

    fn span(&self, original: usize) -> Option<Span> {
        self.spans.and_then(|spans| spans.get(original).copied().flatten())
    }

    /// Maps a position coordinate to the center of its slot.
    fn position(
        &self,
        scale: &ChartScale,
        value: &AxisValue,
        point: usize,
        role: AxisRole,
    ) -> Result<Option<f64>, LayoutError> {
        match scale.map_center(value) {
            Some(p) => Ok(Some(p)),
            None if matches!(value, AxisValue::Category(_)) => Err(LayoutError::MissingCategory {
                series: self.series.name.clone(),
                point: self.original_index(point),
                role,
            }),
            None => Ok(None),
        }
    }

    /// Returns the bar thickness and the offset of this series' slot from the slot center.
    fn bar_geometry(&self, scale: &ChartScale, point_count: usize) -> (f64, f64) {
        let band = scale.bandwidth().unwrap_or_else(|| {
            let (a, b) = scale.range();
            (b - a).abs() / point_count.max(1) as f64
        });
        let (slot, count) = self.slot.unwrap_or((0, 1));
        let group = band * BAR_GROUP_FRACTION;
        let thickness = group / count.max(1) as f64;
        let offset = -group / 2.0 + thickness * (slot as f64 + 0.5);
        (thickness, offset)
    }
}

/// The value-axis position of the zero baseline (the domain start on log scales).
fn baseline(scale: &ChartScale) -> f64 {
    match scale {
        ChartScale::Log(_) => scale.map_number(scale.domain().0),
        _ => scale.map_number(0.0),
    }
}

fn place_series(ctx: &SeriesContext<'_>, out: &mut PreparedSeries) -> Result<(), LayoutError> {
    let s = ctx.series;
    match &s.data {
        SeriesData::Line(points)
        | SeriesData::Area(points)
        | SeriesData::BarX(points)
        | SeriesData::BarY(points)
        | SeriesData::Scatter(points) => {
            let horizontal = s.kind() == SeriesKind::BarY;
            let (pos_scale, val_scale, pos_role) = if horizontal {
                (ctx.y, ctx.x, AxisRole::Y)
            } else {
                (ctx.x, ctx.y, AxisRole::X)
            };
            let is_bar = matches!(s.kind(), SeriesKind::BarX | SeriesKind::BarY);
            let (thickness, offset) = if is_bar {
                ctx.bar_geometry(pos_scale, points.len())
            } else {
                (0.0, 0.0)
            };
            let zero = baseline(val_scale);
            let resolved = resolve_series_nulls(s);
            for rv in &resolved.points {
                let p = &points[rv.index];
                let Some(position) = s.position_of(p) else {
                    continue;
                };
                let Some(pos) = ctx.position(pos_scale, position, rv.index, pos_role)? else {
                    continue;
                };
                let span = ctx.span(ctx.original_index(rv.index));
                let (value, end, base) = match span {
                    Some(span) => (
                        span.value,
                        val_scale.map_number(span.y1),
                        Some(val_scale.map_number(span.y0)),
                    ),
                    None => (
                        rv.value,
                        val_scale.map_number(rv.value),
                        (is_bar || s.kind() == SeriesKind::Area).then_some(zero),
                    ),
                };
                let pos = pos + offset;
                let (x, y) = if horizontal { (end, pos) } else { (pos, end) };
                out.points.push(PreparedPoint {
                    index: ctx.original_index(rv.index),
                    x,
                    y,
                    base,
                    thickness,
                    value,
                    extra: SmallVec::new(),
                    label: p.label.clone(),
                });
            }
            // Breaks index resolved values; points dropped for lack of a position shift them.
            out.breaks = resolved.breaks;
            if s.kind().is_continuous() {
                out.shape = stroke_shape(ctx);
            }
        }
        SeriesData::Waterfall(points) => {
            let (thickness, offset) = ctx.bar_geometry(ctx.x, points.len());
            let local = ctx.spans.is_none().then(|| waterfall_steps(points));
            for (i, p) in points.iter().enumerate() {
                let span = match &local {
                    Some(steps) => steps[i],
                    None => ctx.span(ctx.original_index(i)),
                };
                let (Some(x), Some(span)) = (p.x.as_ref(), span) else {
                    continue;
                };
                let Some(pos) = ctx.position(ctx.x, x, i, AxisRole::X)? else {
                    continue;
                };
                out.points.push(PreparedPoint {
                    index: ctx.original_index(i),
                    x: pos + offset,
                    y: ctx.y.map_number(span.y1),
                    base: Some(ctx.y.map_number(span.y0)),
                    thickness,
                    value: span.value,
                    extra: SmallVec::new(),
                    label: p.label.clone(),
                });
            }
        }
        SeriesData::Boxplot(points) => {
            let (thickness, _) = ctx.bar_geometry(ctx.x, points.len());
            for (i, p) in points.iter().enumerate() {
                let (Some(x), Some(median)) = (p.x.as_ref(), p.median) else {
                    continue;
                };
                let Some(pos) = ctx.position(ctx.x, x, i, AxisRole::X)? else {
                    continue;
                };
                out.points.push(PreparedPoint {
                    index: ctx.original_index(i),
                    x: pos,
                    y: ctx.y.map_number(median),
                    base: None,
                    thickness,
                    value: median,
                    extra: [p.low, p.q1, p.q3, p.high]
                        .into_iter()
                        .flatten()
                        .map(|v| ctx.y.map_number(v))
                        .collect(),
                    label: None,
                });
            }
        }
        SeriesData::Heatmap(points) => {
            let thickness = ctx.x.bandwidth().unwrap_or(0.0);
            for (i, p) in points.iter().enumerate() {
                let (Some(x), Some(y), Some(value)) = (p.x.as_ref(), p.y.as_ref(), p.value) else {
                    continue;
                };
                let (Some(px), Some(py)) = (
                    ctx.position(ctx.x, x, i, AxisRole::X)?,
                    ctx.position(ctx.y, y, i, AxisRole::Y)?,
                ) else {
                    continue;
                };
                out.points.push(PreparedPoint {
                    index: ctx.original_index(i),
                    x: px,
                    y: py,
                    base: None,
                    thickness,
                    value,
                    extra: SmallVec::new(),
                    label: None,
                });
            }
        }
        SeriesData::Pie(_)
        | SeriesData::Treemap(_)
        | SeriesData::Sankey(_)
        | SeriesData::Radar(_)
        | SeriesData::Funnel(_) => {}
    }
    Ok(())
}

/// Maps the zoom shape of a continuous series, skipping nulls.
///
/// Stacked points sit on top of their stack, including the out-of-window neighbors.
fn stroke_shape(ctx: &SeriesContext<'_>) -> Vec<Point> {
    let Some(points) = ctx.shape.data.cartesian_points() else {
        return Vec::new();
    };
    resolve_series_nulls(ctx.shape)
        .points
        .iter()
        .filter_map(|rv| {
            let x = ctx.x.map_center(ctx.shape.position_of(&points[rv.index])?)?;
            let original = ctx.shape_source.get(rv.index).copied().unwrap_or(rv.index);
            let value = ctx.span(original).map_or(rv.value, |span| span.y1);
            Some(Point::new(x, ctx.y.map_number(value)))
        })
        .collect()
}
