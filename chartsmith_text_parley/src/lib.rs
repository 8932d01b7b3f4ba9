// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley-backed text measurement.
//!
//! This crate implements [`chartsmith_text::TextMeasurer`] with Parley shaping, which is the
//! native counterpart of measuring SVG text in a browser: the metrics come from the real fonts
//! that will be used to render. System fonts are resolved synchronously, so the measurer is
//! also its own always-ready [`FontsReady`] gate.

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use core::cell::RefCell;
use core::future::Future;

use chartsmith_text::{
    FontFamily, FontStyle, FontsReady, TextMeasurer, TextMetrics, TextStyle,
};
use parley::style::{FontFamily as ParleyFontFamily, FontStack, GenericFamily, StyleProperty};
use parley::{Alignment, AlignmentOptions, FontContext, FontStyle as ParleyFontStyle, FontWeight};

/// A [`TextMeasurer`] backed by Parley.
///
/// Single-line text is measured directly. Text containing `\n` is measured line by line: the
/// result's width is the widest line and its leading absorbs the extra lines, so
/// [`TextMetrics::line_height`] is the height of the whole block.
pub struct ParleyTextMeasurer {
    font_cx: RefCell<FontContext>,
    layout_cx: RefCell<parley::LayoutContext<()>>,
    display_scale: f32,
    quantize: bool,
}

impl core::fmt::Debug for ParleyTextMeasurer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParleyTextMeasurer")
            .field("display_scale", &self.display_scale)
            .field("quantize", &self.quantize)
            .finish_non_exhaustive()
    }
}

impl ParleyTextMeasurer {
    /// Creates a measurer using Parley's default system font configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            font_cx: RefCell::new(FontContext::new()),
            layout_cx: RefCell::new(parley::LayoutContext::new()),
            display_scale: 1.0,
            quantize: true,
        }
    }

    /// Sets the display scale (device pixel ratio) passed to Parley.
    ///
    /// Returned metrics are scaled back into logical coordinates.
    #[must_use]
    pub fn with_display_scale(mut self, display_scale: f32) -> Self {
        self.display_scale = display_scale.max(0.0);
        self
    }

    /// Sets whether Parley should quantize layout coordinates to pixel boundaries.
    #[must_use]
    pub fn with_quantize(mut self, quantize: bool) -> Self {
        self.quantize = quantize;
        self
    }

    fn font_stack(family: &FontFamily) -> FontStack<'_> {
        let family = match family {
            FontFamily::Serif => ParleyFontFamily::Generic(GenericFamily::Serif),
            FontFamily::SansSerif => ParleyFontFamily::Generic(GenericFamily::SansSerif),
            FontFamily::Monospace => ParleyFontFamily::Generic(GenericFamily::Monospace),
            FontFamily::Named(name) => ParleyFontFamily::Named(Cow::Borrowed(name.as_ref())),
        };
        FontStack::from(family)
    }

    fn font_style(style: FontStyle) -> ParleyFontStyle {
        match style {
            FontStyle::Normal => ParleyFontStyle::Normal,
            FontStyle::Italic => ParleyFontStyle::Italic,
            FontStyle::Oblique => ParleyFontStyle::Oblique(None),
        }
    }

    fn font_size_f32(font_size: f64) -> f32 {
        if !font_size.is_finite() {
            return 0.0;
        }
        let font_size = font_size.max(0.0);
        if font_size >= f64::from(f32::MAX) {
            f32::MAX
        } else {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Value is clamped to f32::MAX above"
            )]
            {
                font_size as f32
            }
        }
    }

    fn measure_line(&self, line: &str, style: &TextStyle) -> TextMetrics {
        if line.is_empty() {
            return TextMetrics::default();
        }
        let scale = self.display_scale.max(1.0e-6);

        let mut font_cx = self.font_cx.borrow_mut();
        let mut layout_cx = self.layout_cx.borrow_mut();

        let mut builder = layout_cx.ranged_builder(&mut font_cx, line, scale, self.quantize);
        builder.push_default(StyleProperty::FontSize(Self::font_size_f32(
            style.font_size,
        )));
        builder.push_default(StyleProperty::FontStack(Self::font_stack(
            &style.font_family,
        )));
        builder.push_default(StyleProperty::FontStyle(Self::font_style(
            style.font_style,
        )));
        builder.push_default(StyleProperty::FontWeight(FontWeight::new(f32::from(
            style.font_weight.0,
        ))));

        let mut layout: parley::Layout<()> = builder.build(line);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let Some(first) = layout.lines().next() else {
            return TextMetrics::default();
        };
        let m = first.metrics();
        let scale = f64::from(scale);
        TextMetrics {
            advance_width: f64::from(m.advance) / scale,
            ascent: f64::from(m.ascent) / scale,
            descent: f64::from(m.descent) / scale,
            leading: f64::from(m.leading) / scale,
        }
    }
}

impl Default for ParleyTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for ParleyTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let mut lines = text.split('\n');
        let first = self.measure_line(lines.next().unwrap_or(""), style);
        let mut out = first;
        for line in lines {
            let m = self.measure_line(line, style);
            out.advance_width = out.advance_width.max(m.advance_width);
            out.leading += first.line_height().max(m.line_height());
        }
        out
    }
}

impl FontsReady for ParleyTextMeasurer {
    fn ready(&self) -> impl Future<Output = ()> {
        core::future::ready(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn parley_measurer_is_nonzero_for_nonempty_text() {
        let m = ParleyTextMeasurer::new();
        let metrics = m.measure("Hello", &TextStyle::new(12.0));
        assert!(metrics.advance_width > 0.0);
        assert!(metrics.ascent > 0.0);
        assert!(metrics.descent > 0.0);
    }

    #[test]
    fn multi_line_text_is_taller_than_one_line() {
        let m = ParleyTextMeasurer::new();
        let style = TextStyle::new(12.0);
        let one = m.measure("Hello", &style);
        let two = m.measure("Hello\nWorld", &style);
        assert!(two.line_height() > one.line_height());
        assert!(two.advance_width >= one.advance_width);
    }

    #[test]
    fn parley_fonts_are_always_ready() {
        let m = ParleyTextMeasurer::new();
        pollster::block_on(m.ready());
    }
}
