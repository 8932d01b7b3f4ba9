// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The zoom filter.
//!
//! A zoom gesture constrains the X axis and/or individual Y axes to `[min, max]`. Filtering
//! produces two sequences per series: the points inside the zoom window (`visible`) and, for
//! continuous strokes on a non-category X axis, the same points plus the out-of-range neighbor
//! at every boundary crossing (`shape`), so the stroke reaches the window edge.

use alloc::string::String;
use alloc::vec::Vec;

use crate::axis::{AxisConfig, AxisType, category_slice};
use crate::chart::ZoomType;
use crate::error::{AxisRole, LayoutError};
use crate::series::{AxisValue, Series, SeriesData};

/// Zoom ranges held by the host between layout passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoomState {
    /// X range, if the X axis is zoomed.
    pub x: Option<(f64, f64)>,
    /// Per Y axis range, indexed like the chart's Y axes.
    pub y: Vec<Option<(f64, f64)>>,
}

impl ZoomState {
    /// Creates a state that zooms only the X axis.
    pub fn x(min: f64, max: f64) -> Self {
        Self {
            x: Some((min, max)),
            y: Vec::new(),
        }
    }

    /// Sets the range of Y axis `index`.
    #[must_use]
    pub fn with_y(mut self, index: usize, min: f64, max: f64) -> Self {
        if self.y.len() <= index {
            self.y.resize(index + 1, None);
        }
        self.y[index] = Some((min, max));
        self
    }

    /// Drops the dimensions a zoom of `zoom_type` does not constrain.
    #[must_use]
    pub fn masked(&self, zoom_type: ZoomType) -> Self {
        match zoom_type {
            ZoomType::X => Self {
                x: self.x,
                y: Vec::new(),
            },
            ZoomType::Y => Self {
                x: None,
                y: self.y.clone(),
            },
            ZoomType::Xy => self.clone(),
        }
    }

    /// Whether no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.iter().all(Option::is_none)
    }

    fn y_range(&self, index: usize) -> Option<(f64, f64)> {
        self.y.get(index).copied().flatten()
    }
}

/// Output of [`filter_to_zoom`], aligned with the input series.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoomFiltered {
    /// Series restricted to in-range points.
    pub visible: Vec<Series>,
    /// Series used to draw strokes and fills.
    pub shape: Vec<Series>,
    /// For each series, the original index of every visible point.
    pub source_indices: Vec<Vec<usize>>,
    /// For each series, the original index of every shape point.
    pub shape_indices: Vec<Vec<usize>>,
}

impl ZoomFiltered {
    /// The unfiltered result: every point of every series is visible.
    pub fn unzoomed(series: &[Series]) -> Self {
        let indices: Vec<Vec<usize>> = series
            .iter()
            .map(|s| (0..s.data.len()).collect())
            .collect();
        Self {
            visible: series.to_vec(),
            shape: series.to_vec(),
            source_indices: indices.clone(),
            shape_indices: indices,
        }
    }
}

/// One constrained dimension, ready for membership tests.
struct Dimension<'a> {
    range: Option<(f64, f64)>,
    /// Ordered categories and the half-open index slice the range keeps.
    categories: Option<(Vec<String>, (usize, usize))>,
    axis: &'a AxisConfig,
}

impl<'a> Dimension<'a> {
    fn new(axis: &'a AxisConfig, range: Option<(f64, f64)>, role: AxisRole) -> Self {
        let range = range.map(|(a, b)| if a > b { (b, a) } else { (a, b) });
        let categories = match range {
            Some((min, max)) if axis.axis_type == AxisType::Category => {
                let ordered = axis.ordered_categories();
                let slice = category_slice(ordered.len(), Some(min), Some(max));
                Some((ordered, slice))
            }
            _ => None,
        };
        if categories.is_some() && range.is_some_and(|(min, max)| min < 0.0 || max < 0.0) {
            log::warn!("zoom range on the {role} category axis matches no category");
        }
        Self {
            range,
            categories,
            axis,
        }
    }

    /// Whether `value` lies inside the range; unconstrained dimensions accept everything.
    fn contains(&self, value: Option<&AxisValue>) -> bool {
        let Some((min, max)) = self.range else {
            return true;
        };
        let coordinate = match (&self.categories, value) {
            (Some(_), _) if min < 0.0 || max < 0.0 => return false,
            (Some((categories, (start, end))), Some(AxisValue::Category(c))) => {
                return categories
                    .iter()
                    .position(|k| k == c)
                    .is_some_and(|i| (*start..*end).contains(&i));
            }
            (_, Some(AxisValue::Number(n))) => *n,
            _ => return false,
        };
        coordinate.is_finite() && coordinate >= min && coordinate <= max
    }

    fn is_category(&self) -> bool {
        self.axis.axis_type == AxisType::Category
    }
}

/// Filters every series to the zoom window.
///
/// Non-Cartesian series (pie, sankey, ...) pass through unchanged.
pub fn filter_to_zoom(
    series: &[Series],
    zoom: &ZoomState,
    x_axis: &AxisConfig,
    y_axes: &[AxisConfig],
) -> Result<ZoomFiltered, LayoutError> {
    let mut out = ZoomFiltered::default();
    let x = Dimension::new(x_axis, zoom.x, AxisRole::X);
    for s in series {
        let y_range = zoom.y_range(s.y_axis);
        let y_axis = match y_axes.get(s.y_axis) {
            Some(axis) => axis,
            None if y_range.is_none() && x.range.is_none() => {
                pass_through(&mut out, s);
                continue;
            }
            None if s.kind().is_axis_related() => {
                return Err(LayoutError::MissingYAxis {
                    series: s.name.clone(),
                    index: s.y_axis,
                });
            }
            None => {
                pass_through(&mut out, s);
                continue;
            }
        };
        let y = Dimension::new(y_axis, y_range, AxisRole::Y);
        let with_shape = s.kind().is_continuous() && !x.is_category();

        let (visible, shape, (indices, shape_indices)) = match &s.data {
            SeriesData::Line(p) => {
                split(p, with_shape, |q| x.contains(q.x.as_ref()) && y.contains(q.y.as_ref()))
                    .map_data(SeriesData::Line)
            }
            SeriesData::Area(p) => {
                split(p, with_shape, |q| x.contains(q.x.as_ref()) && y.contains(q.y.as_ref()))
                    .map_data(SeriesData::Area)
            }
            SeriesData::BarX(p) => {
                split(p, false, |q| x.contains(q.x.as_ref()) && y.contains(q.y.as_ref()))
                    .map_data(SeriesData::BarX)
            }
            SeriesData::BarY(p) => {
                split(p, false, |q| x.contains(q.x.as_ref()) && y.contains(q.y.as_ref()))
                    .map_data(SeriesData::BarY)
            }
            SeriesData::Scatter(p) => {
                split(p, false, |q| x.contains(q.x.as_ref()) && y.contains(q.y.as_ref()))
                    .map_data(SeriesData::Scatter)
            }
            SeriesData::Waterfall(p) => {
                split(p, false, |q| x.contains(q.x.as_ref())).map_data(SeriesData::Waterfall)
            }
            SeriesData::Boxplot(p) => {
                split(p, false, |q| x.contains(q.x.as_ref())).map_data(SeriesData::Boxplot)
            }
            SeriesData::Heatmap(p) => {
                split(p, false, |q| x.contains(q.x.as_ref()) && y.contains(q.y.as_ref()))
                    .map_data(SeriesData::Heatmap)
            }
            SeriesData::Pie(_)
            | SeriesData::Treemap(_)
            | SeriesData::Sankey(_)
            | SeriesData::Radar(_)
            | SeriesData::Funnel(_) => {
                pass_through(&mut out, s);
                continue;
            }
        };
        log::debug!(
            "zoom kept {} of {} points of `{}` ({} shape points)",
            indices.len(),
            s.data.len(),
            s.name,
            shape.len()
        );
        out.visible.push(Series {
            data: visible,
            ..s.clone()
        });
        out.shape.push(Series {
            data: shape,
            ..s.clone()
        });
        out.source_indices.push(indices);
        out.shape_indices.push(shape_indices);
    }
    Ok(out)
}

fn pass_through(out: &mut ZoomFiltered, s: &Series) {
    out.visible.push(s.clone());
    out.shape.push(s.clone());
    out.source_indices.push((0..s.data.len()).collect());
    out.shape_indices.push((0..s.data.len()).collect());
}

struct Split<T> {
    visible: Vec<T>,
    shape: Vec<T>,
    indices: Vec<usize>,
    shape_indices: Vec<usize>,
}

type SplitIndices = (Vec<usize>, Vec<usize>);

impl<T> Split<T> {
    fn map_data(self, wrap: fn(Vec<T>) -> SeriesData) -> (SeriesData, SeriesData, SplitIndices) {
        let indices = (self.indices, self.shape_indices);
        (wrap(self.visible), wrap(self.shape), indices)
    }
}

/// Walks `points` in order with a one-point lookback, collecting in-range points and, when
/// `with_shape` is set, the neighbors that straddle each boundary crossing.
fn split<T: Clone>(points: &[T], with_shape: bool, in_range: impl Fn(&T) -> bool) -> Split<T> {
    let mut visible = Vec::new();
    let mut indices = Vec::new();
    let mut shape_indices: Vec<usize> = Vec::new();
    let mut prev_in_range = None;
    for (i, point) in points.iter().enumerate() {
        let inside = in_range(point);
        if inside {
            visible.push(point.clone());
            indices.push(i);
        }
        if with_shape {
            let mut take = |index: usize| {
                if shape_indices.last() != Some(&index) {
                    shape_indices.push(index);
                }
            };
            match (prev_in_range, inside) {
                // Entering the window: include the point just before it.
                (Some(false), true) => {
                    take(i - 1);
                    take(i);
                }
                (_, true) => take(i),
                // Leaving the window: include the first point outside it.
                (Some(true), false) => take(i),
                _ => {}
            }
        }
        prev_in_range = Some(inside);
    }
    let shape = if with_shape {
        shape_indices.iter().map(|&i| points[i].clone()).collect()
    } else {
        shape_indices.clone_from(&indices);
        visible.clone()
    };
    Split {
        visible,
        shape,
        indices,
        shape_indices,
    }
}
