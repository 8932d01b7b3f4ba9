// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart and axis titles.

use alloc::vec::Vec;

use chartsmith_text::{TextMeasurer, TextStyle};

use crate::chart::TitleConfig;
use crate::label::{WrappedRow, wrap_with_limit};

/// A title wrapped to its available width.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleLayout {
    /// Rows, top to bottom; the last row may be ellipsized.
    pub rows: Vec<WrappedRow>,
    /// Height of the rows.
    pub text_height: f64,
    /// Font size the rows were measured with.
    pub font_size: f64,
}

impl TitleLayout {
    /// Returns the widest row.
    pub fn width(&self) -> f64 {
        self.rows.iter().map(|r| r.width).fold(0.0, f64::max)
    }
}

/// Wraps `text` into at most `max_rows` rows of `max_width`.
///
/// Returns `None` for empty text.
pub fn layout_text_block<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    font_size: f64,
    max_width: f64,
    max_rows: usize,
) -> Option<TitleLayout> {
    if text.trim().is_empty() {
        return None;
    }
    let style = TextStyle::new(font_size);
    let rows = wrap_with_limit(measurer, text, &style, max_width.max(0.0), max_rows);
    if rows.is_empty() {
        return None;
    }
    let line_height = measurer.measure(text, &style).line_height();
    Some(TitleLayout {
        text_height: rows.len() as f64 * line_height,
        rows,
        font_size,
    })
}

/// Lays out the chart title for a chart `max_width` wide.
pub fn layout_title<M: TextMeasurer + ?Sized>(
    measurer: &M,
    config: &TitleConfig,
    max_width: f64,
) -> Option<TitleLayout> {
    layout_text_block(
        measurer,
        &config.text,
        config.font_size,
        max_width,
        config.max_rows,
    )
}
