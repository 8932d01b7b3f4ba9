// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The bounds solver.
//!
//! Given the chart size and the measured sizes of every guide (title, legend, axis titles and
//! labels, range slider), this reserves space around the plot and returns the plot rectangle.
//! Guides are stacked outward from the plot edges:
//! - top: title, then a top legend,
//! - bottom: X labels, X title, range slider, then a bottom legend,
//! - left/right: Y axes on that side (first axis nearest the plot), then a side legend.
//!
//! Axis space is only reserved when at least one series is placed on Cartesian axes; the range
//! slider reserves space regardless.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::axis::AxisPosition;
use crate::chart::{LegendPosition, Margin};

/// A width/height pair used by chart layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Size {
    /// Width in chart coordinate units.
    pub width: f64,
    /// Height in chart coordinate units.
    pub height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A measured guide extent plus the gap that separates it from its neighbor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GuideSpace {
    /// Thickness of the guide (height for horizontal guides, width for vertical ones).
    pub size: f64,
    /// Gap between the guide and the element nearer the plot.
    pub margin: f64,
}

impl GuideSpace {
    /// Creates a guide space.
    pub fn new(size: f64, margin: f64) -> Self {
        Self { size, margin }
    }

    fn total(self) -> f64 {
        (self.size + self.margin).max(0.0)
    }
}

/// Space needed by one Y axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YAxisSpace {
    /// Side of the plot.
    pub position: AxisPosition,
    /// Rotated title (its row height), if the axis has a title.
    pub title: Option<GuideSpace>,
    /// Widest tick label, if labels are enabled.
    pub labels: Option<GuideSpace>,
}

impl YAxisSpace {
    fn total(&self) -> f64 {
        self.title.map_or(0.0, GuideSpace::total) + self.labels.map_or(0.0, GuideSpace::total)
    }
}

/// Space needed by the X axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct XAxisSpace {
    /// Title rows, if the axis has a title.
    pub title: Option<GuideSpace>,
    /// Tallest (possibly rotated) tick label, if labels are enabled.
    pub labels: Option<GuideSpace>,
}

/// Measured legend extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendSpace {
    /// Placement.
    pub position: LegendPosition,
    /// Legend width.
    pub width: f64,
    /// Legend height.
    pub height: f64,
    /// Gap between the legend and the plot side.
    pub margin: f64,
}

/// Everything the bounds solver needs to know.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundsInput {
    /// Outer chart size.
    pub size: Size,
    /// Outer margin.
    pub margin: Margin,
    /// Chart title.
    pub title: Option<GuideSpace>,
    /// Legend, if shown.
    pub legend: Option<LegendSpace>,
    /// X axis guides.
    pub x_axis: XAxisSpace,
    /// Y axis guides in axis order.
    pub y_axes: Vec<YAxisSpace>,
    /// Range slider, if enabled.
    pub range_slider: Option<GuideSpace>,
    /// Whether any visible series is placed on Cartesian axes.
    pub axis_related: bool,
}

/// Output of the bounds solver, in chart coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    /// Plot width.
    pub bounds_width: f64,
    /// Plot height.
    pub bounds_height: f64,
    /// The plot rectangle.
    pub plot: Rect,
    /// Title rectangle.
    pub title: Option<Rect>,
    /// Legend rectangle.
    pub legend: Option<Rect>,
    /// X axis band below the plot (labels and title).
    pub x_axis: Option<Rect>,
    /// Per Y axis band beside the plot, in axis order.
    pub y_axes: Vec<Option<Rect>>,
    /// Range slider rectangle.
    pub range_slider: Option<Rect>,
}

/// Reserves guide space and computes the plot rectangle.
///
/// A container too small for its guides yields a zero-sized plot and a warning.
pub fn solve_bounds(input: &BoundsInput) -> Bounds {
    let m = input.margin;
    let size = input.size;

    let title_space = input.title.map_or(0.0, GuideSpace::total);
    let legend_space = |position: LegendPosition| match input.legend {
        Some(l) if l.position == position => {
            let extent = if position.is_horizontal() { l.height } else { l.width };
            (extent + l.margin).max(0.0)
        }
        _ => 0.0,
    };

    let (x_labels, x_title) = if input.axis_related {
        (
            input.x_axis.labels.map_or(0.0, GuideSpace::total),
            input.x_axis.title.map_or(0.0, GuideSpace::total),
        )
    } else {
        (0.0, 0.0)
    };
    let slider_space = input.range_slider.map_or(0.0, GuideSpace::total);

    let side = |position: AxisPosition| -> f64 {
        if !input.axis_related {
            return 0.0;
        }
        input
            .y_axes
            .iter()
            .filter(|a| a.position == position)
            .map(YAxisSpace::total)
            .sum()
    };
    let left_axes = side(AxisPosition::Left);
    let right_axes = side(AxisPosition::Right);

    let top_budget = title_space + legend_space(LegendPosition::Top);
    let bottom_budget = x_labels + x_title + slider_space + legend_space(LegendPosition::Bottom);
    let left_budget = left_axes + legend_space(LegendPosition::Left);
    let right_budget = right_axes + legend_space(LegendPosition::Right);

    let raw_width = size.width - m.left - m.right - left_budget - right_budget;
    let raw_height = size.height - m.top - m.bottom - top_budget - bottom_budget;
    if raw_width < 0.0 || raw_height < 0.0 {
        log::warn!(
            "chart {}x{} is too small for its guides (plot {raw_width}x{raw_height}); clamping to zero",
            size.width,
            size.height
        );
    }
    let bounds_width = raw_width.max(0.0);
    let bounds_height = raw_height.max(0.0);

    let x0 = m.left + left_budget;
    let y0 = m.top + top_budget;
    let plot = Rect::new(x0, y0, x0 + bounds_width, y0 + bounds_height);
    log::debug!("bounds {bounds_width}x{bounds_height} at ({x0}, {y0})");

    let title = input
        .title
        .map(|t| Rect::new(m.left, m.top, size.width - m.right, m.top + t.size.max(0.0)));

    let x_axis = (input.axis_related && x_labels + x_title > 0.0)
        .then(|| Rect::new(plot.x0, plot.y1, plot.x1, plot.y1 + x_labels + x_title));

    let range_slider = input.range_slider.map(|s| {
        let top = plot.y1 + x_labels + x_title + s.margin;
        Rect::new(plot.x0, top, plot.x1, top + s.size.max(0.0))
    });

    let mut y_axes = Vec::with_capacity(input.y_axes.len());
    let mut left_edge = plot.x0;
    let mut right_edge = plot.x1;
    for axis in &input.y_axes {
        if !input.axis_related {
            y_axes.push(None);
            continue;
        }
        let w = axis.total();
        let rect = match axis.position {
            AxisPosition::Left => {
                left_edge -= w;
                Rect::new(left_edge, plot.y0, left_edge + w, plot.y1)
            }
            AxisPosition::Right => {
                right_edge += w;
                Rect::new(right_edge - w, plot.y0, right_edge, plot.y1)
            }
        };
        y_axes.push(Some(rect));
    }

    let legend = input.legend.map(|l| match l.position {
        LegendPosition::Top => {
            let top = m.top + title_space;
            Rect::new(m.left, top, size.width - m.right, top + l.height)
        }
        LegendPosition::Bottom => {
            let top = plot.y1 + x_labels + x_title + slider_space + l.margin;
            Rect::new(m.left, top, size.width - m.right, top + l.height)
        }
        LegendPosition::Left => {
            let right = plot.x0 - left_axes - l.margin;
            Rect::new(right - l.width, plot.y0, right, plot.y0 + l.height)
        }
        LegendPosition::Right => {
            let left = plot.x1 + right_axes + l.margin;
            Rect::new(left, plot.y0, left + l.width, plot.y0 + l.height)
        }
    });

    Bounds {
        bounds_width,
        bounds_height,
        plot,
        title,
        legend,
        x_axis,
        y_axes,
        range_slider,
    }
}

/// Splits `plot` vertically into `count` plots separated by `gap`.
pub fn split_plots(plot: Rect, count: usize, gap: f64) -> Vec<Rect> {
    let count = count.max(1);
    let gaps = gap.max(0.0) * (count - 1) as f64;
    let h = ((plot.height() - gaps) / count as f64).max(0.0);
    (0..count)
        .map(|i| {
            let top = plot.y0 + i as f64 * (h + gap.max(0.0));
            Rect::new(plot.x0, top, plot.x1, top + h)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn base() -> BoundsInput {
        BoundsInput {
            size: Size::new(400.0, 300.0),
            margin: Margin::uniform(10.0),
            axis_related: true,
            ..BoundsInput::default()
        }
    }

    fn y_axis(position: AxisPosition, label_width: f64) -> YAxisSpace {
        YAxisSpace {
            position,
            title: None,
            labels: Some(GuideSpace::new(label_width, 10.0)),
        }
    }

    #[test]
    fn bottom_budget_sums_axis_slider_and_legend() {
        let input = BoundsInput {
            x_axis: XAxisSpace {
                title: Some(GuideSpace::new(14.0, 4.0)),
                labels: Some(GuideSpace::new(11.0, 10.0)),
            },
            range_slider: Some(GuideSpace::new(40.0, 10.0)),
            legend: Some(LegendSpace {
                position: LegendPosition::Bottom,
                width: 380.0,
                height: 20.0,
                margin: 15.0,
            }),
            ..base()
        };
        let b = solve_bounds(&input);
        assert_eq!(b.bounds_height, 300.0 - 20.0 - (18.0 + 21.0 + 50.0 + 35.0));
        assert_eq!(b.bounds_width, 380.0);
        let slider = b.range_slider.unwrap();
        assert_eq!(slider.y0, b.plot.y1 + 39.0 + 10.0);
        assert_eq!(b.legend.unwrap().y0, slider.y1 + 15.0);
    }

    #[test]
    fn axis_space_is_skipped_without_axis_related_series() {
        let input = BoundsInput {
            axis_related: false,
            x_axis: XAxisSpace {
                title: Some(GuideSpace::new(14.0, 4.0)),
                labels: Some(GuideSpace::new(11.0, 10.0)),
            },
            y_axes: vec![y_axis(AxisPosition::Left, 30.0)],
            range_slider: Some(GuideSpace::new(40.0, 10.0)),
            ..base()
        };
        let b = solve_bounds(&input);
        assert_eq!(b.bounds_width, 380.0);
        assert_eq!(b.bounds_height, 280.0 - 50.0, "the range slider still reserves space");
        assert_eq!(b.y_axes, vec![None]);
    }

    #[test]
    fn y_axes_stack_outward_per_side() {
        let input = BoundsInput {
            y_axes: vec![
                y_axis(AxisPosition::Left, 30.0),
                y_axis(AxisPosition::Right, 20.0),
                y_axis(AxisPosition::Left, 10.0),
            ],
            ..base()
        };
        let b = solve_bounds(&input);
        assert_eq!(b.plot.x0, 10.0 + 40.0 + 20.0);
        assert_eq!(b.bounds_width, 380.0 - 60.0 - 30.0);
        let first = b.y_axes[0].unwrap();
        let third = b.y_axes[2].unwrap();
        assert_eq!(first.x1, b.plot.x0);
        assert_eq!(third.x1, first.x0);
        assert_eq!(b.y_axes[1].unwrap().x0, b.plot.x1);
    }

    #[test]
    fn top_budget_holds_title_and_top_legend() {
        let input = BoundsInput {
            title: Some(GuideSpace::new(28.0, 10.0)),
            legend: Some(LegendSpace {
                position: LegendPosition::Top,
                width: 380.0,
                height: 20.0,
                margin: 15.0,
            }),
            ..base()
        };
        let b = solve_bounds(&input);
        assert_eq!(b.plot.y0, 10.0 + 38.0 + 35.0);
        assert_eq!(b.legend.unwrap().y0, 48.0);
    }

    #[test]
    fn too_small_container_clamps_to_zero() {
        let input = BoundsInput {
            size: Size::new(30.0, 30.0),
            y_axes: vec![y_axis(AxisPosition::Left, 30.0)],
            ..base()
        };
        let b = solve_bounds(&input);
        assert_eq!(b.bounds_width, 0.0);
        assert!(b.bounds_height >= 0.0);
    }

    #[test]
    fn split_plots_share_height_with_gaps() {
        let plots = split_plots(Rect::new(0.0, 0.0, 100.0, 220.0), 2, 20.0);
        assert_eq!(plots[0], Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(plots[1], Rect::new(0.0, 120.0, 100.0, 220.0));
    }
}
