// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement for chart layout.
//!
//! Chart layout needs text sizes before anything is drawn: axis label widths decide how much
//! horizontal room the Y axes take, title rows decide the top offset, legend items wrap into
//! lines, and long category labels are ellipsized to their band. This crate owns the small
//! capability interface that layout code depends on:
//! - [`TextMeasurer`]: synchronous single-line metrics for a `(text, style)` pair,
//! - [`FontsReady`]: an asynchronous gate that resolves once web fonts have loaded, so
//!   measurements are never taken against fallback fonts,
//! - [`MeasureCache`] / [`CachedTextMeasurer`]: an explicitly owned, bounded memoization of
//!   metrics keyed by `(text, style)`.
//!
//! Backends (Parley, browser SVG/HTML) live in sibling crates and implement the same trait.

#![no_std]

extern crate alloc;

mod cache;
mod fonts;

use alloc::sync::Arc;
use alloc::vec::Vec;

pub use cache::{CachedTextMeasurer, MeasureCache};
pub use fonts::{FontsLoaded, FontsReady};

/// A minimal text measurement interface used by layout code.
///
/// Implementations can be:
/// - heuristic (fast, but inaccurate),
/// - backed by a shaping engine (e.g. Parley), or
/// - backed by the browser (SVG bounding boxes, HTML layout).
pub trait TextMeasurer {
    /// Measure a single line of text.
    ///
    /// `text` is treated as a single line; callers split on `\n` for multi-line layout.
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        (**self).measure(text, style)
    }
}

/// Text styling inputs relevant to measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in the chart's coordinate system (typically pixels).
    pub font_size: f64,
    /// The preferred font family.
    pub font_family: FontFamily,
    /// Font weight (e.g. `400` for normal, `700` for bold).
    pub font_weight: FontWeight,
    /// Font style (normal/italic/oblique).
    pub font_style: FontStyle,
}

impl TextStyle {
    /// Creates a default `TextStyle` with the given `font_size`.
    #[must_use]
    pub fn new(font_size: f64) -> Self {
        Self {
            font_size,
            font_family: FontFamily::SansSerif,
            font_weight: FontWeight::NORMAL,
            font_style: FontStyle::Normal,
        }
    }

    /// Returns a copy of this style with a different weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    /// Returns a copy of this style with a different family.
    #[must_use]
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(11.0)
    }
}

/// Font family selection for measurement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// A generic serif family (CSS `serif`).
    Serif,
    /// A generic sans-serif family (CSS `sans-serif`).
    SansSerif,
    /// A generic monospace family (CSS `monospace`).
    Monospace,
    /// A named family (e.g. `"Inter"`, `"Helvetica Neue"`).
    Named(Arc<str>),
}

impl FontFamily {
    /// Returns the font family string for CSS-style font declarations.
    #[must_use]
    pub fn as_css_family(&self) -> &str {
        match self {
            Self::Serif => "serif",
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
            Self::Named(name) => name,
        }
    }
}

/// CSS-style font weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Normal weight (`400`).
    pub const NORMAL: Self = Self(400);
    /// Bold weight (`700`).
    pub const BOLD: Self = Self(700);
}

/// CSS-style font styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Normal style.
    Normal,
    /// Italic style.
    Italic,
    /// Oblique style.
    Oblique,
}

/// Measured metrics for a single line of text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// The advance width (useful for horizontal layout).
    pub advance_width: f64,
    /// Distance from baseline to the top of typical glyphs.
    pub ascent: f64,
    /// Distance from baseline to the bottom of typical glyphs.
    pub descent: f64,
    /// Additional line spacing beyond ascent+descent.
    pub leading: f64,
}

impl TextMetrics {
    /// Returns `ascent + descent + leading`.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent + self.leading
    }
}

/// The largest width and height over a batch of labels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabelSize {
    /// Largest advance width.
    pub max_width: f64,
    /// Largest line height.
    pub max_height: f64,
}

impl LabelSize {
    /// Grows this size so it also covers `metrics`.
    pub fn include(&mut self, metrics: &TextMetrics) {
        self.max_width = self.max_width.max(metrics.advance_width);
        self.max_height = self.max_height.max(metrics.line_height());
    }
}

/// Measures a batch of labels after the fonts gate has resolved.
///
/// Labels are measured one at a time in input order. Nothing is measured before
/// `fonts.ready()` completes.
pub async fn measure_labels<M, F>(
    measurer: &M,
    fonts: &F,
    labels: &[&str],
    style: &TextStyle,
) -> LabelSize
where
    M: TextMeasurer + ?Sized,
    F: FontsReady + ?Sized,
{
    fonts.ready().await;
    let mut size = LabelSize::default();
    for label in labels {
        size.include(&measurer.measure(label, style));
    }
    size
}

/// Measures every label individually after the fonts gate has resolved.
pub async fn measure_each<M, F>(
    measurer: &M,
    fonts: &F,
    labels: &[&str],
    style: &TextStyle,
) -> Vec<TextMetrics>
where
    M: TextMeasurer + ?Sized,
    F: FontsReady + ?Sized,
{
    fonts.ready().await;
    labels
        .iter()
        .map(|label| measurer.measure(label, style))
        .collect()
}

/// A tiny heuristic text measurer suitable for tests, demos and non-browser hosts.
///
/// It assumes an average glyph width of ~0.6em and a baseline at ~0.8em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let advance_width = 0.6 * style.font_size * text.chars().count() as f64;
        TextMetrics {
            advance_width,
            ascent: 0.8 * style.font_size,
            descent: 0.2 * style.font_size,
            leading: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn measure_labels_reports_the_widest_label() {
        let size = pollster::block_on(measure_labels(
            &HeuristicTextMeasurer,
            &FontsLoaded,
            &["a", "abcd", "ab"],
            &TextStyle::new(10.0),
        ));
        assert!((size.max_width - 24.0).abs() < 1e-9);
        assert!((size.max_height - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_measures_as_zero() {
        let size = pollster::block_on(measure_labels(
            &HeuristicTextMeasurer,
            &FontsLoaded,
            &[],
            &TextStyle::default(),
        ));
        assert_eq!(size, LabelSize::default());
    }
}
