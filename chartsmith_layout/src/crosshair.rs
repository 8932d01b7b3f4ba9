// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Crosshair geometry.
//!
//! A snapped crosshair jumps to the hovered data point nearest the pointer (centered in its
//! band on categorical scales); a free crosshair follows the pointer. Either way the line is
//! clamped to the plot the axis renders into.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Line, Point, Rect};

use crate::dispatch::{Dispatcher, Emitter, Event, SubscriptionId, Topic};
use crate::scale::ChartScale;
use crate::series::AxisValue;

/// One hovered data point.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverChunk {
    /// Series index.
    pub series: usize,
    /// Point index within the series.
    pub point: usize,
    /// X coordinate of the point.
    pub x: AxisValue,
    /// Y coordinate of the point.
    pub y: AxisValue,
    /// Y axis the series is drawn against.
    pub y_axis: usize,
}

/// Payload of a [`Topic::HoverShape`] event.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverEvent {
    /// Data points under the pointer.
    pub chunks: Vec<HoverChunk>,
    /// Pointer position in chart coordinates.
    pub pointer: Point,
}

/// Computed crosshair lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CrosshairGeometry {
    /// Vertical line for the X axis crosshair.
    pub x: Option<Line>,
    /// Horizontal line per Y axis, indexed like the chart's Y axes.
    pub y: Vec<Option<Line>>,
}

/// An axis with its crosshair enabled.
#[derive(Clone, Debug, PartialEq)]
pub struct CrosshairAxis {
    /// Snap to data instead of following the pointer.
    pub snap: bool,
    /// The axis scale, mapping into chart coordinates.
    pub scale: ChartScale,
    /// The plot the axis renders into.
    pub plot: Rect,
}

impl CrosshairAxis {
    fn position(&self, value: &AxisValue) -> Option<f64> {
        self.scale.map_center(value)
    }
}

/// Computes crosshair lines for `event`.
pub fn crosshair_lines(
    event: &HoverEvent,
    x: Option<&CrosshairAxis>,
    y: &[Option<CrosshairAxis>],
) -> CrosshairGeometry {
    let pointer = event.pointer;
    let x_line = x.and_then(|axis| {
        let px = if axis.snap {
            nearest(event.chunks.iter().map(|c| &c.x), axis, pointer.x)?
        } else {
            pointer.x
        };
        let px = px.clamp(axis.plot.x0, axis.plot.x1.max(axis.plot.x0));
        Some(Line::new((px, axis.plot.y0), (px, axis.plot.y1)))
    });
    let y_lines = y
        .iter()
        .enumerate()
        .map(|(index, axis)| {
            let axis = axis.as_ref()?;
            let py = if axis.snap {
                nearest(
                    event
                        .chunks
                        .iter()
                        .filter(|c| c.y_axis == index)
                        .map(|c| &c.y),
                    axis,
                    pointer.y,
                )?
            } else {
                pointer.y
            };
            let py = py.clamp(axis.plot.y0, axis.plot.y1.max(axis.plot.y0));
            Some(Line::new((axis.plot.x0, py), (axis.plot.x1, py)))
        })
        .collect();
    CrosshairGeometry {
        x: x_line,
        y: y_lines,
    }
}

/// The mapped position closest to `target`; earlier values win ties.
fn nearest<'a>(
    values: impl Iterator<Item = &'a AxisValue>,
    axis: &CrosshairAxis,
    target: f64,
) -> Option<f64> {
    let mut best: Option<f64> = None;
    for p in values.filter_map(|v| axis.position(v)) {
        if best.is_none_or(|b| (p - target).abs() < (b - target).abs()) {
            best = Some(p);
        }
    }
    best
}

/// The crosshair component: turns hover events into crosshair events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Crosshair {
    x: Option<CrosshairAxis>,
    y: Vec<Option<CrosshairAxis>>,
}

impl Crosshair {
    /// Creates a crosshair over the given axes.
    pub fn new(x: Option<CrosshairAxis>, y: Vec<Option<CrosshairAxis>>) -> Self {
        Self { x, y }
    }

    /// Whether any axis has a crosshair.
    pub fn is_enabled(&self) -> bool {
        self.x.is_some() || self.y.iter().any(Option::is_some)
    }

    /// Computes the lines for one hover event.
    pub fn lines(&self, event: &HoverEvent) -> CrosshairGeometry {
        crosshair_lines(event, self.x.as_ref(), &self.y)
    }

    /// Subscribes to hover events and republishes the computed lines as crosshair events.
    pub fn attach(self, dispatcher: &mut Dispatcher) -> SubscriptionId {
        dispatcher.subscribe(
            Topic::HoverShape,
            Box::new(move |event: &Event, emitter: &mut Emitter| {
                if let Event::HoverShape(hover) = event {
                    emitter.emit(Event::Crosshair(self.lines(hover)));
                }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::String;
    use alloc::vec;

    use super::*;
    use crate::scale::{ScaleBand, ScaleLinear};

    fn band_axis(snap: bool) -> CrosshairAxis {
        CrosshairAxis {
            snap,
            scale: ChartScale::Band(ScaleBand::new(
                (0.0, 100.0),
                vec![String::from("a"), String::from("b")],
            )),
            plot: Rect::new(0.0, 0.0, 100.0, 50.0),
        }
    }

    fn y_axis(snap: bool) -> CrosshairAxis {
        CrosshairAxis {
            snap,
            scale: ChartScale::Linear(ScaleLinear::new((0.0, 10.0), (50.0, 0.0))),
            plot: Rect::new(0.0, 0.0, 100.0, 50.0),
        }
    }

    fn hover(pointer: Point) -> HoverEvent {
        HoverEvent {
            chunks: vec![
                HoverChunk {
                    series: 0,
                    point: 0,
                    x: AxisValue::from("a"),
                    y: AxisValue::from(4.0),
                    y_axis: 0,
                },
                HoverChunk {
                    series: 1,
                    point: 1,
                    x: AxisValue::from("b"),
                    y: AxisValue::from(8.0),
                    y_axis: 0,
                },
            ],
            pointer,
        }
    }

    #[test]
    fn snapped_crosshair_centers_in_the_nearest_band() {
        let g = crosshair_lines(&hover(Point::new(60.0, 10.0)), Some(&band_axis(true)), &[]);
        assert_eq!(g.x, Some(Line::new((75.0, 0.0), (75.0, 50.0))));
    }

    #[test]
    fn snapped_y_crosshair_picks_the_nearest_value() {
        let g = crosshair_lines(&hover(Point::new(0.0, 28.0)), None, &[Some(y_axis(true))]);
        assert_eq!(g.y, vec![Some(Line::new((0.0, 30.0), (100.0, 30.0)))]);
    }

    #[test]
    fn free_crosshair_follows_and_clamps_the_pointer() {
        let g = crosshair_lines(
            &hover(Point::new(140.0, -5.0)),
            Some(&band_axis(false)),
            &[Some(y_axis(false)), None],
        );
        assert_eq!(g.x, Some(Line::new((100.0, 0.0), (100.0, 50.0))));
        assert_eq!(g.y[0], Some(Line::new((0.0, 0.0), (100.0, 0.0))));
        assert_eq!(g.y[1], None);
    }

    #[test]
    fn attached_crosshair_republishes_lines() {
        let mut dispatcher = Dispatcher::new();
        Crosshair::new(Some(band_axis(true)), Vec::new()).attach(&mut dispatcher);
        let seen = std::rc::Rc::new(core::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        dispatcher.subscribe(
            Topic::Crosshair,
            Box::new(move |event: &Event, _: &mut Emitter| {
                if let Event::Crosshair(g) = event {
                    sink.borrow_mut().push(g.clone());
                }
            }),
        );
        dispatcher.publish(Event::HoverShape(hover(Point::new(10.0, 0.0))));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].x, Some(Line::new((25.0, 0.0), (25.0, 50.0))));
    }
}
