// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios for [`prepare_chart`].

extern crate std;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;
use core::future::Future;

use chartsmith_sankey::SankeyError;
use chartsmith_text::{
    FontsLoaded, FontsReady, HeuristicTextMeasurer, TextMeasurer, TextMetrics, TextStyle,
};
use kurbo::{Line, Point};

use crate::{
    AxisConfig, AxisRole, AxisType, AxisValue, CartesianPoint, ChartData, ChartOptions,
    CrosshairConfig, HoverChunk, HoverEvent, LayoutError, NullMode, PreparedChart, SankeyPoint,
    SankeyTarget, Series, SeriesData, Size, SplitConfig, Stacking, WaterfallPoint, ZoomConfig,
    ZoomState, ZoomType, prepare_chart,
};

fn prepare(data: &ChartData) -> Result<PreparedChart, LayoutError> {
    pollster::block_on(prepare_chart(
        data,
        Size::new(600.0, 400.0),
        None,
        &HeuristicTextMeasurer,
        &FontsLoaded,
    ))
}

fn prepare_zoomed(data: &ChartData, zoom: &ZoomState) -> Result<PreparedChart, LayoutError> {
    pollster::block_on(prepare_chart(
        data,
        Size::new(600.0, 400.0),
        Some(zoom),
        &HeuristicTextMeasurer,
        &FontsLoaded,
    ))
}

fn zoomable(data: ChartData) -> ChartData {
    data.with_chart(ChartOptions {
        zoom: ZoomConfig {
            enabled: true,
            zoom_type: ZoomType::X,
        },
        ..ChartOptions::default()
    })
}

#[test]
fn stacked_bars_split_at_the_zero_baseline() {
    let data = ChartData::new(vec![
        Series::bar_x("up", vec![CartesianPoint::new(0.0, 10.0)]).with_stacking(Stacking::Normal),
        Series::bar_x("down", vec![CartesianPoint::new(0.0, -5.0)])
            .with_stacking(Stacking::Normal),
    ]);
    let chart = prepare(&data).unwrap();

    let (min, max) = chart.y_axes[0].scale.domain();
    assert_eq!(min, -5.0);
    assert!(max >= 10.0);

    let up = &chart.series[0].points[0];
    let down = &chart.series[1].points[0];
    let zero = chart.y_axes[0].scale.map_number(0.0);
    assert_eq!(up.base, Some(zero));
    assert_eq!(down.base, Some(zero));
    assert!(up.y < zero && zero < down.y, "bars grow away from zero");
    assert_eq!(up.x, down.x, "one stack group shares one slot");
}

#[test]
fn horizontal_bars_drive_the_x_domain() {
    let data = ChartData::new(vec![
        Series::bar_y(
            "first",
            vec![
                CartesianPoint::new(-5.0, "a"),
                CartesianPoint::new(10.0, "b"),
            ],
        ),
        Series::bar_y(
            "second",
            vec![CartesianPoint::new(3.0, "a"), CartesianPoint::new(-2.0, "b")],
        ),
    ])
    .with_y_axes(vec![AxisConfig::of_type(AxisType::Category)]);
    let chart = prepare(&data).unwrap();

    assert_eq!(chart.x_axis.scale.domain(), (-5.0, 10.0));
    assert_eq!(chart.y_axes[0].categories, vec!["a", "b"]);

    let first = &chart.series[0];
    assert!(first.horizontal);
    assert!(first.points[0].y < first.points[1].y, "first category on top");
    assert_ne!(
        first.points[0].y, chart.series[1].points[0].y,
        "unstacked bars sit side by side"
    );
    let zero = chart.x_axis.scale.map_number(0.0);
    assert_eq!(first.points[0].base, Some(zero));
}

#[test]
fn percent_stacks_fill_to_one_hundred() {
    let x = AxisConfig::category(["q1", "q2"]);
    let data = ChartData::new(vec![
        Series::bar_x(
            "a",
            vec![CartesianPoint::new("q1", 1.0), CartesianPoint::new("q2", 3.0)],
        )
        .with_stacking(Stacking::Percent),
        Series::bar_x(
            "b",
            vec![CartesianPoint::new("q1", 3.0), CartesianPoint::new("q2", 1.0)],
        )
        .with_stacking(Stacking::Percent),
    ])
    .with_x_axis(x);
    let chart = prepare(&data).unwrap();

    assert_eq!(chart.y_axes[0].scale.domain(), (0.0, 105.0));
    let top = chart.y_axes[0].scale.map_number(100.0);
    for point in &chart.series[1].points {
        assert_eq!(point.y, top);
    }
    let values: Vec<f64> = chart.series[0].points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![25.0, 75.0]);
}

#[test]
fn null_modes_shape_the_stroke() {
    let points = vec![
        CartesianPoint::new(0.0, 1.0),
        CartesianPoint::null_y(1.0),
        CartesianPoint::new(2.0, 3.0),
    ];
    let run = |mode: NullMode| {
        let data = ChartData::new(vec![Series::line("l", points.clone()).with_null_mode(mode)]);
        prepare(&data).unwrap().series.remove(0)
    };

    let skip = run(NullMode::Skip);
    assert_eq!(skip.points.iter().map(|p| p.index).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(skip.breaks.as_slice(), &[1]);

    let connect = run(NullMode::Connect);
    assert_eq!(connect.points.len(), 2);
    assert!(connect.breaks.is_empty());

    let zero = run(NullMode::Zero);
    assert_eq!(zero.points.len(), 3);
    assert_eq!(zero.points[1].value, 0.0);
}

#[test]
fn zoomed_strokes_reach_past_the_window() {
    let data = zoomable(ChartData::new(vec![Series::line(
        "l",
        vec![
            CartesianPoint::new(0.0, 0.0),
            CartesianPoint::new(1.0, 10.0),
            CartesianPoint::new(2.0, 20.0),
        ],
    )]));
    let chart = prepare_zoomed(&data, &ZoomState::x(0.5, 1.5)).unwrap();
    let plot = chart.bounds.plot;

    assert_eq!(chart.x_axis.scale.domain(), (0.5, 1.5));
    let line = &chart.series[0];
    assert_eq!(line.points.len(), 1);
    assert_eq!(line.points[0].index, 1);
    assert_eq!(line.shape.len(), 3);
    assert!(line.shape[0].x < plot.x0);
    assert!(line.shape[2].x > plot.x1);
}

#[test]
fn zoomed_stacks_keep_their_edge_neighbors_on_top_of_the_stack() {
    let area = |name: &str, values: [f64; 3]| {
        let points = values
            .iter()
            .enumerate()
            .map(|(x, y)| CartesianPoint::new(x as f64, *y))
            .collect();
        Series::area(name, points).with_stacking(Stacking::Normal)
    };
    let data = zoomable(ChartData::new(vec![
        area("low", [1.0, 2.0, 3.0]),
        area("high", [10.0, 20.0, 30.0]),
    ]));
    let chart = prepare_zoomed(&data, &ZoomState::x(0.5, 1.5)).unwrap();
    let plot = chart.bounds.plot;
    let y = &chart.y_axes[0].scale;

    let high = &chart.series[1];
    assert_eq!(high.points.len(), 1);
    assert_eq!(high.points[0].value, 20.0);
    assert_eq!(high.points[0].y, y.map_number(22.0));
    assert_eq!(high.points[0].base, Some(y.map_number(2.0)));

    assert_eq!(high.shape.len(), 3);
    assert!(high.shape[0].x < plot.x0);
    assert!(high.shape[2].x > plot.x1);
    assert_eq!(high.shape[0].y, y.map_number(11.0));
    assert_eq!(high.shape[1].y, y.map_number(22.0));
    assert_eq!(high.shape[2].y, y.map_number(33.0));
    assert_eq!(chart.series[0].shape.len(), 3);
}

#[test]
fn zoomed_waterfalls_keep_running_totals() {
    let data = zoomable(ChartData::new(vec![Series::new(
        "w",
        SeriesData::Waterfall(vec![
            WaterfallPoint::step(0.0, 10.0),
            WaterfallPoint::step(1.0, 5.0),
            WaterfallPoint::step(2.0, 1.0),
            WaterfallPoint::total(3.0),
        ]),
    )]));
    let full = prepare(&data).unwrap();
    let total = &full.series[0].points[3];
    assert_eq!(total.value, 16.0);

    let chart = prepare_zoomed(&data, &ZoomState::x(1.5, 3.5)).unwrap();
    let y = &chart.y_axes[0].scale;
    let (_, max) = y.domain();
    assert!(max >= 16.0, "domain {max} must cover the running total");

    let points = &chart.series[0].points;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].index, 2);
    assert_eq!(points[0].value, 1.0);
    assert_eq!(points[0].base, Some(y.map_number(15.0)));
    assert_eq!(points[0].y, y.map_number(16.0));
    assert_eq!(points[1].index, 3);
    assert_eq!(points[1].value, 16.0);
    assert_eq!(points[1].base, Some(y.map_number(0.0)));
    assert_eq!(points[1].y, y.map_number(16.0));
}

#[test]
fn zoom_is_ignored_unless_enabled() {
    let data = ChartData::new(vec![Series::line(
        "l",
        vec![CartesianPoint::new(0.0, 0.0), CartesianPoint::new(2.0, 20.0)],
    )]);
    let chart = prepare_zoomed(&data, &ZoomState::x(0.5, 1.5)).unwrap();
    assert_eq!(chart.series[0].points.len(), 2);
    assert_eq!(chart.x_axis.scale.domain(), (0.0, 2.0));
}

#[test]
fn sankey_series_are_laid_out_inside_the_plot() {
    let link = |name: &str, value: f64| SankeyTarget {
        name: String::from(name),
        value,
    };
    let data = ChartData::new(vec![Series::new(
        "flows",
        SeriesData::Sankey(vec![
            SankeyPoint {
                name: String::from("a"),
                links: vec![link("b", 5.0), link("c", 3.0)],
                color: None,
            },
            SankeyPoint {
                name: String::from("b"),
                links: vec![link("c", 2.0)],
                color: None,
            },
        ]),
    )]);
    let chart = prepare(&data).unwrap();
    let plot = chart.bounds.plot;

    assert!(chart.x_axis.labels.is_empty(), "no axes without axis series");
    let layout = &chart.sankey[0].layout;
    assert_eq!(layout.nodes.len(), 3);
    assert_eq!(layout.links.len(), 3);
    for node in &layout.nodes {
        let r = node.rect();
        assert!(r.x0 >= plot.x0 - 1e-9 && r.x1 <= plot.x1 + 1e-9);
        assert!(r.y0 >= plot.y0 - 1e-9 && r.y1 <= plot.y1 + 1e-9);
    }
}

#[test]
fn circular_sankey_links_fail() {
    let point = |name: &str, target: &str| SankeyPoint {
        name: String::from(name),
        links: vec![SankeyTarget {
            name: String::from(target),
            value: 1.0,
        }],
        color: None,
    };
    let data = ChartData::new(vec![Series::new(
        "loop",
        SeriesData::Sankey(vec![point("a", "b"), point("b", "a")]),
    )]);
    assert_eq!(
        prepare(&data),
        Err(LayoutError::Sankey(SankeyError::CircularLink))
    );
}

#[test]
fn plot_bands_on_unknown_categories_fail() {
    let data = ChartData::new(vec![Series::bar_x(
        "b",
        vec![CartesianPoint::new("a", 1.0), CartesianPoint::new("b", 2.0)],
    )])
    .with_x_axis(AxisConfig::category(["a", "b"]).with_plot_band("a", "zz"));
    assert_eq!(
        prepare(&data),
        Err(LayoutError::UnknownCategory {
            role: AxisRole::X,
            category: String::from("zz"),
        })
    );
}

#[test]
fn plot_bands_cover_whole_categories() {
    let data = ChartData::new(vec![Series::bar_x(
        "b",
        vec![
            CartesianPoint::new("a", 1.0),
            CartesianPoint::new("b", 2.0),
            CartesianPoint::new("c", 3.0),
        ],
    )])
    .with_x_axis(AxisConfig::category(["a", "b", "c"]).with_plot_band("b", "c"));
    let chart = prepare(&data).unwrap();
    let plot = chart.bounds.plot;
    let band = chart.x_axis.plot_bands[0];
    let third = plot.width() / 3.0;
    assert!((band.x0 - (plot.x0 + third)).abs() < 1e-9);
    assert!((band.x1 - plot.x1).abs() < 1e-9);
    assert_eq!((band.y0, band.y1), (plot.y0, plot.y1));
}

#[test]
fn points_on_unknown_categories_fail() {
    let data = ChartData::new(vec![Series::bar_x(
        "b",
        vec![CartesianPoint::new("a", 1.0), CartesianPoint::new("x", 2.0)],
    )])
    .with_x_axis(AxisConfig::category(["a", "b"]));
    assert_eq!(
        prepare(&data),
        Err(LayoutError::MissingCategory {
            series: String::from("b"),
            point: 1,
            role: AxisRole::X,
        })
    );
}

#[test]
fn series_on_missing_y_axes_fail() {
    let data = ChartData::new(vec![
        Series::line("l", vec![CartesianPoint::new(0.0, 1.0)]).with_y_axis(3),
    ]);
    assert_eq!(
        prepare(&data),
        Err(LayoutError::MissingYAxis {
            series: String::from("l"),
            index: 3,
        })
    );
}

#[test]
fn hidden_series_stay_in_the_legend_below_the_plot() {
    let data = ChartData::new(vec![
        Series::line("shown", vec![CartesianPoint::new(0.0, 1.0)]),
        Series::line("hidden", vec![CartesianPoint::new(0.0, 100.0)]).with_visible(false),
    ]);
    let chart = prepare(&data).unwrap();
    let legend = chart.legend.as_ref().unwrap();
    assert_eq!(legend.items.len(), 2);
    assert!(legend.items.iter().all(|i| i.symbol.y0 >= chart.bounds.plot.y1));
    assert!(chart.series[1].points.is_empty());
    assert!(chart.y_axes[0].scale.domain().1 < 100.0, "hidden series do not widen domains");
}

#[test]
fn split_plots_host_their_axes() {
    let data = ChartData::new(vec![
        Series::line("top", vec![CartesianPoint::new(0.0, 1.0)]),
        Series::line("bottom", vec![CartesianPoint::new(0.0, 2.0)]).with_y_axis(1),
    ])
    .with_y_axes(vec![
        AxisConfig::linear(),
        AxisConfig::linear().with_plot_index(1),
    ])
    .with_split(SplitConfig {
        enable: true,
        plots: 2,
        gap: 20.0,
    });
    let chart = prepare(&data).unwrap();

    assert_eq!(chart.plots.len(), 2);
    assert!((chart.plots[1].y0 - chart.plots[0].y1 - 20.0).abs() < 1e-9);
    assert_eq!(chart.y_axes[0].plot, chart.plots[0]);
    assert_eq!(chart.y_axes[1].plot, chart.plots[1]);
    let bottom = &chart.series[1].points[0];
    assert!(bottom.y >= chart.plots[1].y0 && bottom.y <= chart.plots[1].y1);
    assert_eq!(chart.plot_offsets(), vec![chart.plots[0].y0, chart.plots[1].y0]);
}

#[test]
fn tiny_containers_clamp_instead_of_failing() {
    let data = ChartData::new(vec![Series::line(
        "l",
        vec![CartesianPoint::new(0.0, 1.0), CartesianPoint::new(1.0, 2.0)],
    )]);
    let chart = pollster::block_on(prepare_chart(
        &data,
        Size::new(30.0, 20.0),
        None,
        &HeuristicTextMeasurer,
        &FontsLoaded,
    ))
    .unwrap();
    assert_eq!(chart.bounds.bounds_width, 0.0);
    assert_eq!(chart.bounds.bounds_height, 0.0);
}

#[test]
fn category_labels_are_ellipsized_to_their_band() {
    let long = "a category name that is far too long to fit inside the band it gets on this axis";
    let data = ChartData::new(vec![Series::bar_x(
        "b",
        vec![CartesianPoint::new(long, 1.0), CartesianPoint::new("b", 2.0)],
    )])
    .with_x_axis(AxisConfig::of_type(AxisType::Category));
    let chart = prepare(&data).unwrap();
    let band = chart.x_axis.scale.bandwidth().unwrap();

    assert_eq!(chart.x_axis.categories, vec![long, "b"]);
    let first = &chart.x_axis.labels[0];
    assert!(first.text.ends_with(crate::ELLIPSIS));
    assert!(first.rect.width() <= band);
}

#[test]
fn snapped_crosshair_follows_hovered_categories() {
    let data = ChartData::new(vec![Series::bar_x(
        "b",
        vec![CartesianPoint::new("a", 1.0), CartesianPoint::new("b", 2.0)],
    )])
    .with_x_axis(AxisConfig::category(["a", "b"]).with_crosshair(CrosshairConfig {
        enabled: true,
        ..CrosshairConfig::default()
    }));
    let chart = prepare(&data).unwrap();
    let crosshair = chart.crosshair(&data);
    assert!(crosshair.is_enabled());

    let plot = chart.bounds.plot;
    let lines = crosshair.lines(&HoverEvent {
        chunks: vec![HoverChunk {
            series: 0,
            point: 1,
            x: AxisValue::from("b"),
            y: AxisValue::from(2.0),
            y_axis: 0,
        }],
        pointer: Point::new(plot.x0, plot.y0),
    });
    let x = chart.x_axis.scale.map_center(&AxisValue::from("b")).unwrap();
    assert_eq!(lines.x, Some(Line::new((x, plot.y0), (x, plot.y1))));
    assert_eq!(lines.y, vec![None]);
}

/// A fonts gate that records when it has resolved.
#[derive(Default)]
struct Gate {
    ready: Cell<bool>,
}

impl FontsReady for Gate {
    fn ready(&self) -> impl Future<Output = ()> {
        async {
            self.ready.set(true);
        }
    }
}

/// A measurer that records measurements taken before the gate resolved.
struct Strict<'a> {
    gate: &'a Gate,
    early: Cell<usize>,
}

impl TextMeasurer for Strict<'_> {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        if !self.gate.ready.get() {
            self.early.set(self.early.get() + 1);
        }
        HeuristicTextMeasurer.measure(text, style)
    }
}

#[test]
fn nothing_is_measured_before_fonts_are_ready() {
    let gate = Gate::default();
    let measurer = Strict {
        gate: &gate,
        early: Cell::new(0),
    };
    let data = ChartData::new(vec![
        Series::line("a", vec![CartesianPoint::new(0.0, 1.0)]),
        Series::line("b", vec![CartesianPoint::new(1.0, 2.0)]),
    ])
    .with_x_axis(AxisConfig::linear().with_title("time"));
    let chart = pollster::block_on(prepare_chart(
        &data,
        Size::new(600.0, 400.0),
        None,
        &measurer,
        &gate,
    ))
    .unwrap();
    assert!(gate.ready.get());
    assert_eq!(measurer.early.get(), 0);
    assert!(chart.x_axis.title.is_some());
}
