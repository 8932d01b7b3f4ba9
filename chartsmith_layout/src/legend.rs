// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend entries and legend layout.
//!
//! The legend is sized before the plot: its height (top/bottom) or width (left/right) is handed
//! to the bounds solver. Item positions are relative to the legend's top-left corner and are
//! translated once the legend rectangle is known.

use alloc::string::String;
use alloc::vec::Vec;

use chartsmith_text::{TextMeasurer, TextStyle};
use kurbo::{Rect, Vec2};
use peniko::Color;

use crate::chart::{ChartData, LegendAlign, LegendConfig, palette_color};
use crate::label::ellipsize;
use crate::series::SeriesData;

/// One legend entry.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    /// Label text.
    pub label: String,
    /// Symbol color.
    pub color: Color,
    /// `false` for hidden series.
    pub active: bool,
    /// Index of the series the entry belongs to.
    pub series: usize,
    /// Point index for per-point entries (pie, funnel).
    pub point: Option<usize>,
}

/// A placed legend item.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendItemLayout {
    /// Index into the entry list.
    pub entry: usize,
    /// Label after ellipsis truncation.
    pub label: String,
    /// Symbol rectangle.
    pub symbol: Rect,
    /// Label rectangle.
    pub text: Rect,
}

/// A measured legend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LegendLayout {
    /// Placed items.
    pub items: Vec<LegendItemLayout>,
    /// Total width.
    pub width: f64,
    /// Total height.
    pub height: f64,
    /// Number of lines (horizontal) or rows (vertical).
    pub lines: usize,
}

impl LegendLayout {
    /// Moves every item by `offset`.
    pub fn translate(&mut self, offset: Vec2) {
        for item in &mut self.items {
            item.symbol = item.symbol + offset;
            item.text = item.text + offset;
        }
    }
}

/// Builds the legend entries of a chart.
///
/// Pie and funnel series contribute one entry per point; every other series one entry.
pub fn legend_entries(chart: &ChartData) -> Vec<LegendEntry> {
    let mut entries = Vec::new();
    for (i, s) in chart.series.iter().enumerate() {
        match &s.data {
            SeriesData::Pie(points) | SeriesData::Funnel(points) => {
                for (j, p) in points.iter().enumerate() {
                    entries.push(LegendEntry {
                        label: p.name.clone(),
                        color: p.color.unwrap_or_else(|| palette_color(j)),
                        active: s.visible,
                        series: i,
                        point: Some(j),
                    });
                }
            }
            _ => entries.push(LegendEntry {
                label: s.name.clone(),
                color: chart.series_color(i),
                active: s.visible,
                series: i,
                point: None,
            }),
        }
    }
    entries
}

/// Whether the legend is shown for `entry_count` entries.
pub fn legend_enabled(config: &LegendConfig, entry_count: usize) -> bool {
    entry_count > 0 && config.enabled.unwrap_or(entry_count > 1)
}

/// Lays out legend items within `available_width`.
///
/// Horizontal legends wrap items into lines; vertical legends put one item per row and are
/// as wide as their widest item (or the configured width).
pub fn layout_legend<M: TextMeasurer + ?Sized>(
    measurer: &M,
    config: &LegendConfig,
    entries: &[LegendEntry],
    available_width: f64,
) -> LegendLayout {
    if entries.is_empty() || available_width <= 0.0 {
        return LegendLayout::default();
    }
    let style = TextStyle::new(config.font_size);
    let symbol_space = config.symbol_width + config.symbol_padding;
    let max_width = if config.position.is_horizontal() {
        available_width
    } else {
        config.width.unwrap_or(available_width).min(available_width)
    };
    let max_label = (max_width - symbol_space).max(0.0);

    struct Measured {
        label: String,
        width: f64,
        height: f64,
    }
    let measured: Vec<Measured> = entries
        .iter()
        .map(|e| {
            let label = ellipsize(measurer, &e.label, &style, max_label);
            let m = measurer.measure(&label, &style);
            Measured {
                width: m.advance_width,
                height: m.line_height().max(config.symbol_height),
                label,
            }
        })
        .collect();
    let line_height = measured.iter().map(|m| m.height).fold(0.0, f64::max);

    let place = |entry: usize, m: &Measured, x: f64, y: f64| {
        let sy = y + (line_height - config.symbol_height) / 2.0;
        let ty = y + (line_height - m.height) / 2.0;
        LegendItemLayout {
            entry,
            label: m.label.clone(),
            symbol: Rect::new(x, sy, x + config.symbol_width, sy + config.symbol_height),
            text: Rect::new(x + symbol_space, ty, x + symbol_space + m.width, ty + m.height),
        }
    };

    if !config.position.is_horizontal() {
        let items: Vec<LegendItemLayout> = measured
            .iter()
            .enumerate()
            .map(|(i, m)| place(i, m, 0.0, i as f64 * (line_height + config.line_gap)))
            .collect();
        let width = config.width.map(|w| w.min(available_width)).unwrap_or_else(|| {
            measured
                .iter()
                .map(|m| symbol_space + m.width)
                .fold(0.0, f64::max)
        });
        let lines = items.len();
        return LegendLayout {
            items,
            width,
            height: lines as f64 * line_height + (lines as f64 - 1.0) * config.line_gap,
            lines,
        };
    }

    // Pack items into lines, then align each line.
    let mut lines: Vec<Vec<(usize, f64)>> = Vec::new();
    let mut current: Vec<(usize, f64)> = Vec::new();
    let mut x = 0.0;
    for (i, m) in measured.iter().enumerate() {
        let item_width = symbol_space + m.width;
        if !current.is_empty() && x + config.item_distance + item_width > available_width {
            lines.push(core::mem::take(&mut current));
            x = 0.0;
        }
        if !current.is_empty() {
            x += config.item_distance;
        }
        current.push((i, x));
        x += item_width;
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let mut items = Vec::with_capacity(entries.len());
    for (row, line) in lines.iter().enumerate() {
        let line_width = line
            .last()
            .map(|&(i, x)| x + symbol_space + measured[i].width)
            .unwrap_or(0.0);
        let shift = match config.align {
            LegendAlign::Left => 0.0,
            LegendAlign::Center => (available_width - line_width) / 2.0,
            LegendAlign::Right => available_width - line_width,
        }
        .max(0.0);
        let y = row as f64 * (line_height + config.line_gap);
        for &(i, x) in line {
            items.push(place(i, &measured[i], x + shift, y));
        }
    }
    let count = lines.len();
    LegendLayout {
        items,
        width: available_width,
        height: count as f64 * line_height + (count as f64 - 1.0) * config.line_gap,
        lines: count,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use chartsmith_text::{HeuristicTextMeasurer, TextMetrics};

    use super::*;
    use crate::chart::LegendPosition;
    use crate::series::{CartesianPoint, NamedValue, Series};

    /// Ten pixels per character, ten pixels per line.
    struct Mono;

    impl TextMeasurer for Mono {
        fn measure(&self, text: &str, _style: &TextStyle) -> TextMetrics {
            TextMetrics {
                advance_width: 10.0 * text.chars().count() as f64,
                ascent: 8.0,
                descent: 2.0,
                leading: 0.0,
            }
        }
    }

    fn entries(labels: &[&str]) -> Vec<LegendEntry> {
        labels
            .iter()
            .enumerate()
            .map(|(i, l)| LegendEntry {
                label: String::from(*l),
                color: palette_color(i),
                active: true,
                series: i,
                point: None,
            })
            .collect()
    }

    #[test]
    fn horizontal_items_wrap_into_lines() {
        // Each item: 16 + 5 + 40 = 61px wide; two fit in 150px with a 20px gap.
        let config = LegendConfig::default();
        let layout = layout_legend(&Mono, &config, &entries(&["aaaa", "bbbb", "cccc"]), 150.0);
        assert_eq!(layout.lines, 2);
        assert_eq!(layout.height, 10.0 + 10.0 + 10.0);
        assert_eq!(layout.items[2].symbol.y0, layout.items[0].symbol.y0 + 20.0);
        // The two-item line is 142px wide and centered.
        assert_eq!(layout.items[0].symbol.x0, 4.0);
    }

    #[test]
    fn vertical_items_stack() {
        let config = LegendConfig::default().with_position(LegendPosition::Right);
        let layout = layout_legend(&Mono, &config, &entries(&["a", "bbb"]), 300.0);
        assert_eq!(layout.lines, 2);
        assert_eq!(layout.width, 16.0 + 5.0 + 30.0);
        assert_eq!(layout.items[1].text.y0, 20.0);
    }

    #[test]
    fn labels_are_ellipsized_to_the_legend_width() {
        let config = LegendConfig::default();
        let layout = layout_legend(&Mono, &config, &entries(&["abcdefghijkl"]), 81.0);
        assert_eq!(layout.items[0].label, "abcde\u{2026}");
    }

    #[test]
    fn pie_points_become_entries_and_hidden_series_are_inactive() {
        let chart = ChartData::new(vec![
            Series::new(
                "share",
                SeriesData::Pie(vec![NamedValue::new("a", 1.0), NamedValue::new("b", 2.0)]),
            ),
            Series::line("hidden", vec![CartesianPoint::new(0.0, 1.0)]).with_visible(false),
        ]);
        let e = legend_entries(&chart);
        assert_eq!(e.len(), 3);
        assert_eq!(e[1].label, "b");
        assert_eq!(e[1].point, Some(1));
        assert!(!e[2].active);
    }

    #[test]
    fn legend_defaults_to_more_than_one_entry() {
        let config = LegendConfig::default();
        assert!(!legend_enabled(&config, 1));
        assert!(legend_enabled(&config, 2));
        assert!(legend_enabled(&config.clone().with_enabled(true), 1));
        assert_eq!(
            layout_legend(&HeuristicTextMeasurer, &config, &[], 100.0),
            LegendLayout::default()
        );
    }
}
