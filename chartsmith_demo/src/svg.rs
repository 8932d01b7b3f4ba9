// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG output for prepared charts.

use chartsmith_layout::{
    AxisPosition, ChartData, PreparedAxis, PreparedChart, PreparedSeries, SeriesKind,
    legend_entries, palette_color,
};
use kurbo::{Line, Point, Rect};
use peniko::Color;
use peniko::color::palette::css;

const SERIES_STROKE: f64 = 2.0;
const MARKER_RADIUS: f64 = 3.0;

#[derive(Debug, Default)]
struct SvgWriter {
    out: String,
}

impl SvgWriter {
    fn rect(&mut self, rect: Rect, fill: Color) {
        self.out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}""#,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
        ));
        write_paint_attr(&mut self.out, "fill", fill);
        self.out.push_str("/>\n");
    }

    fn line(&mut self, line: Line, stroke: Color, width: f64) {
        self.out.push_str(&format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="{width}""#,
            line.p0.x, line.p0.y, line.p1.x, line.p1.y,
        ));
        write_paint_attr(&mut self.out, "stroke", stroke);
        self.out.push_str("/>\n");
    }

    fn circle(&mut self, center: Point, radius: f64, fill: Color) {
        self.out.push_str(&format!(
            r#"<circle cx="{}" cy="{}" r="{radius}""#,
            center.x, center.y
        ));
        write_paint_attr(&mut self.out, "fill", fill);
        self.out.push_str("/>\n");
    }

    fn path(&mut self, d: &str, fill: Option<Color>, stroke: Option<(Color, f64)>) {
        self.out.push_str(&format!(r#"<path d="{d}""#));
        match fill {
            Some(fill) => write_paint_attr(&mut self.out, "fill", fill),
            None => self.out.push_str(r#" fill="none""#),
        }
        if let Some((color, width)) = stroke {
            write_paint_attr(&mut self.out, "stroke", color);
            self.out.push_str(&format!(r#" stroke-width="{width}""#));
        }
        self.out.push_str("/>\n");
    }

    fn text(&mut self, text: &str, pos: Point, font_size: f64, anchor: &str, angle: f64) {
        self.out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="{font_size}" dominant-baseline="middle" text-anchor="{anchor}""#,
            pos.x, pos.y
        ));
        if angle != 0.0 {
            self.out.push_str(&format!(
                r#" transform="rotate({angle} {} {})""#,
                pos.x, pos.y
            ));
        }
        write_paint_attr(&mut self.out, "fill", css::DIM_GRAY);
        self.out.push('>');
        self.out.push_str(&escape_xml(text));
        self.out.push_str("</text>\n");
    }
}

/// Renders a prepared chart as an SVG document.
pub(crate) fn render(data: &ChartData, chart: &PreparedChart) -> String {
    let mut w = SvgWriter::default();
    w.out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {0} {1}" width="{0}" height="{1}">"#,
        chart.size.width, chart.size.height
    ));
    w.out.push('\n');
    w.rect(
        Rect::new(0.0, 0.0, chart.size.width, chart.size.height),
        css::WHITE,
    );

    let cartesian = chart
        .series
        .iter()
        .any(|s| s.visible && s.kind.is_axis_related());
    if cartesian {
        for plot in &chart.plots {
            w.rect(*plot, css::WHITE_SMOKE);
        }
        axis_backdrop(&mut w, data, chart);
    }

    for s in chart.series.iter().filter(|s| s.visible) {
        series(&mut w, s);
    }
    for sankey in &chart.sankey {
        for (i, link) in sankey.layout.links.iter().enumerate() {
            if let Some(path) = sankey.layout.link_path(i) {
                let color = palette_color(link.source).multiply_alpha(0.4);
                w.path(&path.to_svg(), None, Some((color, link.width.max(1.0))));
            }
        }
        for (i, node) in sankey.layout.nodes.iter().enumerate() {
            w.rect(node.rect(), palette_color(i));
            let anchor = Point::new(node.x1 + 4.0, (node.y0 + node.y1) / 2.0);
            w.text(&node.id, anchor, 11.0, "start", 0.0);
        }
    }

    if cartesian {
        axis_guides(&mut w, data, chart);
    }

    if let Some(title) = &chart.title {
        let rows = title.layout.rows.len().max(1) as f64;
        let line_height = title.layout.text_height / rows;
        for row in &title.layout.rows {
            let pos = Point::new(title.rect.center().x, title.rect.y0 + row.y + line_height / 2.0);
            w.text(&row.text, pos, title.layout.font_size, "middle", 0.0);
        }
    }

    if let Some(legend) = &chart.legend {
        let entries = legend_entries(data);
        for item in &legend.items {
            let Some(entry) = entries.get(item.entry) else {
                continue;
            };
            let color = if entry.active { entry.color } else { css::LIGHT_GRAY };
            w.rect(item.symbol, color);
            let pos = Point::new(item.text.x0, item.text.center().y);
            w.text(&item.label, pos, data.legend.font_size, "start", 0.0);
        }
    }

    w.out.push_str("</svg>\n");
    w.out
}

/// Plot bands and grid lines, drawn under the series.
fn axis_backdrop(w: &mut SvgWriter, data: &ChartData, chart: &PreparedChart) {
    let configs = core::iter::once(&data.x_axis).chain(&data.y_axis);
    let axes = core::iter::once(&chart.x_axis).chain(&chart.y_axes);
    for (config, axis) in configs.zip(axes) {
        for (rect, band) in axis.plot_bands.iter().zip(&config.plot_bands) {
            let color = band.color.unwrap_or(css::LIGHT_STEEL_BLUE.multiply_alpha(0.35));
            w.rect(*rect, color);
        }
    }
    for axis in chart.y_axes.iter().filter(|a| !a.scale.is_categorical()) {
        for tick in &axis.ticks {
            let line = Line::new(
                (axis.plot.x0, tick.position),
                (axis.plot.x1, tick.position),
            );
            w.line(line, css::GAINSBORO, 1.0);
        }
    }
}

/// Axis lines, tick labels, titles and plot lines, drawn over the series.
fn axis_guides(w: &mut SvgWriter, data: &ChartData, chart: &PreparedChart) {
    let plot = chart.bounds.plot;
    w.line(
        Line::new((plot.x0, plot.y1), (plot.x1, plot.y1)),
        css::GRAY,
        1.0,
    );
    tick_labels(w, &chart.x_axis, data.x_axis.labels.font_size, data.x_axis.labels.rotation);
    if let Some((title, rect)) = chart.x_axis.title.as_ref().zip(chart.x_axis.title_rect) {
        for row in &title.rows {
            let pos = Point::new(rect.center().x, rect.y0 + row.y + title.font_size / 2.0);
            w.text(&row.text, pos, title.font_size, "middle", 0.0);
        }
    }

    for (config, axis) in data.y_axis.iter().zip(&chart.y_axes) {
        let x = match config.position {
            AxisPosition::Left => axis.plot.x0,
            AxisPosition::Right => axis.plot.x1,
        };
        w.line(
            Line::new((x, axis.plot.y0), (x, axis.plot.y1)),
            css::GRAY,
            1.0,
        );
        tick_labels(w, axis, config.labels.font_size, 0.0);
        if let Some((title, rect)) = axis.title.as_ref().zip(axis.title_rect) {
            let text = title
                .rows
                .iter()
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            w.text(&text, rect.center(), title.font_size, "middle", -90.0);
        }
    }

    let configs = core::iter::once(&data.x_axis).chain(&data.y_axis);
    let axes = core::iter::once(&chart.x_axis).chain(&chart.y_axes);
    for (config, axis) in configs.zip(axes) {
        for (line, cfg) in axis.plot_lines.iter().zip(&config.plot_lines) {
            w.line(*line, cfg.color.unwrap_or(css::CRIMSON), cfg.width);
        }
    }
}

fn tick_labels(w: &mut SvgWriter, axis: &PreparedAxis, font_size: f64, angle: f64) {
    for label in &axis.labels {
        w.text(&label.text, label.rect.center(), font_size, "middle", angle);
    }
}

fn series(w: &mut SvgWriter, s: &PreparedSeries) {
    match s.kind {
        SeriesKind::Line => {
            for run in stroke_runs(s) {
                w.path(&polyline(run), None, Some((s.color, SERIES_STROKE)));
            }
        }
        SeriesKind::Area => {
            if !s.points.is_empty() {
                let mut outline: Vec<Point> =
                    s.points.iter().map(|p| Point::new(p.x, p.y)).collect();
                outline.extend(
                    s.points
                        .iter()
                        .rev()
                        .map(|p| Point::new(p.x, p.base.unwrap_or(p.y))),
                );
                let mut d = polyline(&outline);
                d.push('Z');
                w.path(&d, Some(s.color.multiply_alpha(0.35)), None);
            }
            for run in stroke_runs(s) {
                w.path(&polyline(run), None, Some((s.color, SERIES_STROKE)));
            }
        }
        SeriesKind::BarX | SeriesKind::BarY | SeriesKind::Waterfall => {
            for p in &s.points {
                let base = p.base.unwrap_or(if s.horizontal { p.x } else { p.y });
                let half = p.thickness / 2.0;
                let rect = if s.horizontal {
                    Rect::from_points((base, p.y - half), (p.x, p.y + half))
                } else {
                    Rect::from_points((p.x - half, base), (p.x + half, p.y))
                };
                w.rect(rect, s.color);
            }
        }
        SeriesKind::Scatter => {
            for p in &s.points {
                w.circle(Point::new(p.x, p.y), MARKER_RADIUS, s.color);
            }
        }
        SeriesKind::Boxplot => {
            for p in &s.points {
                let [low, q1, q3, high] = p.extra[..] else {
                    continue;
                };
                let half = p.thickness * 0.3;
                w.line(Line::new((p.x, low), (p.x, high)), s.color, 1.0);
                w.rect(
                    Rect::from_points((p.x - half, q1), (p.x + half, q3)),
                    s.color.multiply_alpha(0.5),
                );
                w.line(
                    Line::new((p.x - half, p.y), (p.x + half, p.y)),
                    s.color,
                    SERIES_STROKE,
                );
            }
        }
        SeriesKind::Heatmap => {
            let max = s.points.iter().map(|p| p.value.abs()).fold(0.0, f64::max);
            for p in &s.points {
                let alpha = if max > 0.0 { p.value.abs() / max } else { 0.0 };
                let half = p.thickness / 2.0;
                let rect = Rect::new(p.x - half, p.y - half, p.x + half, p.y + half);
                w.rect(rect, s.color.multiply_alpha(alpha as f32));
            }
        }
        SeriesKind::Pie
        | SeriesKind::Treemap
        | SeriesKind::Sankey
        | SeriesKind::Radar
        | SeriesKind::Funnel => {}
    }
}

/// Splits the stroke of a continuous series at its breaks.
fn stroke_runs(s: &PreparedSeries) -> Vec<&[Point]> {
    if s.shape.len() != s.points.len() || s.breaks.is_empty() {
        return vec![&s.shape[..]];
    }
    let mut runs = Vec::new();
    let mut start = 0;
    for &b in s.breaks.iter().filter(|&&b| b > 0 && b < s.shape.len()) {
        runs.push(&s.shape[start..b]);
        start = b;
    }
    runs.push(&s.shape[start..]);
    runs
}

fn polyline(points: &[Point]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        d.push_str(&format!("{}{} {}", if i == 0 { 'M' } else { 'L' }, p.x, p.y));
    }
    d
}

fn write_paint_attr(out: &mut String, name: &str, color: Color) {
    let rgba = color.to_rgba8();
    out.push_str(&format!(
        r##" {name}="#{:02x}{:02x}{:02x}""##,
        rgba.r, rgba.g, rgba.b
    ));
    if rgba.a != 255 {
        out.push_str(&format!(r#" {name}-opacity="{}""#, f64::from(rgba.a) / 255.0));
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_text_is_escaped() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }

    #[test]
    fn translucent_colors_carry_an_opacity_attribute() {
        let mut out = String::new();
        write_paint_attr(&mut out, "fill", css::BLACK.multiply_alpha(0.5));
        assert!(out.starts_with(r##" fill="#000000" fill-opacity="##), "got {out}");
    }

    #[test]
    fn polylines_move_then_draw() {
        let d = polyline(&[Point::new(0.0, 1.0), Point::new(2.0, 3.0)]);
        assert_eq!(d, "M0 1L2 3");
    }
}
