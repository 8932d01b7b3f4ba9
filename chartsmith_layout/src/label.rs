// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label layout: ellipsis truncation, word wrapping and overlap filtering.
//!
//! Everything here is synchronous. Callers are expected to have awaited the fonts gate before
//! measuring (see [`crate::prepare_chart`]).

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use chartsmith_text::{TextMeasurer, TextStyle};
use kurbo::Rect;
use unicode_segmentation::UnicodeSegmentation;

#[cfg(all(not(feature = "std"), not(test)))]
use crate::float::FloatExt;

/// The character appended to truncated text.
pub const ELLIPSIS: char = '\u{2026}';

/// A label with its final bounding box.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedLabel {
    /// Label text (possibly ellipsized).
    pub text: String,
    /// Bounding box in chart coordinates.
    pub rect: Rect,
}

/// One row of wrapped text.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedRow {
    /// Row text without trailing whitespace.
    pub text: String,
    /// Measured width.
    pub width: f64,
    /// Offset of the row's top from the first row's top.
    pub y: f64,
}

/// Truncates `text` from the end until it fits `max_width`, appending an ellipsis.
///
/// Text that already fits is returned unchanged. If not even one character plus the ellipsis
/// fits, the result is empty.
pub fn ellipsize<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> String {
    if measurer.measure(text, style).advance_width <= max_width {
        return String::from(text);
    }
    let chars: Vec<char> = text.chars().collect();
    for n in (1..chars.len()).rev() {
        let mut candidate: String = chars[..n].iter().collect();
        let trimmed = candidate.trim_end().len();
        candidate.truncate(trimmed);
        if candidate.is_empty() {
            continue;
        }
        candidate.push(ELLIPSIS);
        if measurer.measure(&candidate, style).advance_width <= max_width {
            return candidate;
        }
    }
    log::warn!("label `{text}` does not fit in {max_width}px and was dropped");
    String::new()
}

/// Returns the horizontal budget for a label rotated by `angle_degrees`.
///
/// Approximates the footprint of the rotated box: `max_width * cos + line_height * sin`.
pub fn rotated_width_budget(max_width: f64, line_height: f64, angle_degrees: f64) -> f64 {
    let a = angle_degrees.to_radians();
    (max_width * a.cos().abs() + line_height * a.sin().abs()).max(0.0)
}

/// Returns the axis-aligned size of a `width` by `height` box rotated by `angle_degrees`.
pub fn rotated_size(width: f64, height: f64, angle_degrees: f64) -> (f64, f64) {
    let a = angle_degrees.to_radians();
    let (sin, cos) = (a.sin().abs(), a.cos().abs());
    (width * cos + height * sin, width * sin + height * cos)
}

/// Keeps the labels that do not overlap an earlier label.
///
/// Labels are ordered by `(top, left)` first; on conflict the earlier label wins. `padding`
/// grows the required gap between kept labels.
pub fn filter_overlapping(mut labels: Vec<PositionedLabel>, padding: f64) -> Vec<PositionedLabel> {
    labels.sort_by(|a, b| {
        a.rect
            .y0
            .total_cmp(&b.rect.y0)
            .then(a.rect.x0.total_cmp(&b.rect.x0))
    });
    let mut kept: Vec<PositionedLabel> = Vec::with_capacity(labels.len());
    for label in labels {
        if kept.iter().all(|k| !overlaps(&k.rect, &label.rect, padding)) {
            kept.push(label);
        }
    }
    kept
}

fn overlaps(a: &Rect, b: &Rect, padding: f64) -> bool {
    a.x0 < b.x1 + padding
        && b.x0 < a.x1 + padding
        && a.y0 < b.y1 + padding
        && b.y0 < a.y1 + padding
}

/// Splits text into word-like segments.
///
/// Segments follow the Unicode word boundaries of UAX #29. Punctuation and whitespace stay with
/// the word before them, so a line may break after `alpha,` or `beta/` but never before the
/// comma. Opening brackets stay with the word after them. Scripts that do not separate words
/// with spaces (Han, kana, Thai) yield one segment per character.
pub fn word_segments(text: &str) -> Vec<&str> {
    segment_ranges(text).into_iter().map(|r| &text[r]).collect()
}

fn segment_ranges(text: &str) -> Vec<Range<usize>> {
    let is_space = |piece: &str| piece.chars().all(char::is_whitespace);
    let is_word = |piece: &str| piece.chars().next().is_some_and(char::is_alphanumeric);
    let opens = |piece: &str| piece.ends_with(['(', '[', '{', '\u{201C}', '\u{2018}', '\u{AB}']);

    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<&str> = None;
    for (i, piece) in text.split_word_bound_indices() {
        let breaks = prev.is_some_and(|prev| {
            !is_space(piece) && (is_space(prev) || (is_word(piece) && !opens(prev)))
        });
        if breaks && i > start {
            out.push(start..i);
            start = i;
        }
        prev = Some(piece);
    }
    if start < text.len() {
        out.push(start..text.len());
    }
    out
}

/// Greedily packs word segments into byte ranges of rows no wider than `max_width`.
fn wrap_ranges<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut current: Option<Range<usize>> = None;
    for segment in segment_ranges(text) {
        let Some(row) = current.as_mut() else {
            current = Some(segment);
            continue;
        };
        let candidate = text[row.start..segment.end].trim_end();
        if measurer.measure(candidate, style).advance_width <= max_width {
            row.end = segment.end;
        } else {
            rows.push(core::mem::replace(row, segment));
        }
    }
    rows.extend(current);
    rows
}

fn wrapped_row<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    style: &TextStyle,
    y: f64,
) -> WrappedRow {
    let text = String::from(text.trim());
    WrappedRow {
        width: measurer.measure(&text, style).advance_width,
        text,
        y,
    }
}

/// Greedily packs word segments into rows no wider than `max_width`.
///
/// A segment wider than `max_width` gets a row of its own. Row `i` sits at `y = i * line_height`.
pub fn wrap_text<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> Vec<WrappedRow> {
    let line_height = measurer.measure(text, style).line_height();
    wrap_ranges(measurer, text, style, max_width)
        .into_iter()
        .enumerate()
        .map(|(i, r)| wrapped_row(measurer, &text[r], style, i as f64 * line_height))
        .collect()
}

/// Wraps `text` into at most `max_rows` rows, ellipsizing the last kept row.
///
/// The last row holds the rest of the original text, so its separators are preserved. Rows
/// that are still wider than `max_width` (single long words) are ellipsized too.
pub fn wrap_with_limit<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    style: &TextStyle,
    max_width: f64,
    max_rows: usize,
) -> Vec<WrappedRow> {
    let line_height = measurer.measure(text, style).line_height();
    let ranges = wrap_ranges(measurer, text, style, max_width);
    let max_rows = max_rows.max(1);
    let mut rows: Vec<WrappedRow> = ranges
        .iter()
        .take(max_rows)
        .enumerate()
        .map(|(i, r)| wrapped_row(measurer, &text[r.clone()], style, i as f64 * line_height))
        .collect();
    if ranges.len() > max_rows {
        let rest = text[ranges[max_rows - 1].start..].trim();
        // Force truncation of the remainder even if it would fit.
        let mut last = ellipsize(measurer, rest, style, max_width);
        if last == rest {
            last = force_ellipsis(measurer, rest, style, max_width);
        }
        rows.truncate(max_rows - 1);
        rows.push(WrappedRow {
            width: measurer.measure(&last, style).advance_width,
            text: last,
            y: (max_rows - 1) as f64 * line_height,
        });
    }
    for row in &mut rows {
        if row.width > max_width {
            row.text = ellipsize(measurer, &row.text, style, max_width);
            row.width = measurer.measure(&row.text, style).advance_width;
        }
    }
    rows.retain(|r| !r.text.is_empty());
    rows
}

fn force_ellipsis<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    style: &TextStyle,
    max_width: f64,
) -> String {
    let mut out = String::from(text.trim_end());
    out.push(ELLIPSIS);
    if measurer.measure(&out, style).advance_width <= max_width {
        out
    } else {
        ellipsize(measurer, &out, style, max_width)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use chartsmith_text::TextMetrics;

    use super::*;

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

    fn style() -> TextStyle {
        TextStyle::new(10.0)
    }

    fn label(text: &str, x0: f64, x1: f64) -> PositionedLabel {
        PositionedLabel {
            text: String::from(text),
            rect: Rect::new(x0, 0.0, x1, 10.0),
        }
    }

    #[test]
    fn ellipsize_trims_until_it_fits() {
        let m = Mono;
        assert_eq!(ellipsize(&m, "short", &style(), 100.0), "short");
        assert_eq!(ellipsize(&m, "abcdefgh", &style(), 50.0), "abcd\u{2026}");
    }

    #[test]
    fn ellipsize_falls_back_to_empty() {
        let m = Mono;
        assert_eq!(ellipsize(&m, "abcdefgh", &style(), 15.0), "");
    }

    #[test]
    fn overlapping_labels_lose_to_earlier_ones() {
        let kept = filter_overlapping(
            vec![label("c", 20.0, 30.0), label("a", 0.0, 10.0), label("b", 8.0, 18.0)],
            0.0,
        );
        let texts: Vec<&str> = kept.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[test]
    fn padding_widens_the_gap() {
        let kept = filter_overlapping(vec![label("a", 0.0, 10.0), label("b", 12.0, 20.0)], 4.0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn rotated_budget_interpolates_width_and_height() {
        assert!((rotated_width_budget(100.0, 12.0, 0.0) - 100.0).abs() < 1e-9);
        assert!((rotated_width_budget(100.0, 12.0, 90.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn segments_keep_trailing_whitespace() {
        assert_eq!(word_segments("ab  cd e"), vec!["ab  ", "cd ", "e"]);
        assert_eq!(word_segments("\u{4E2D}\u{6587}x"), vec!["\u{4E2D}", "\u{6587}", "x"]);
    }

    #[test]
    fn segments_break_after_punctuation() {
        assert_eq!(word_segments("alpha,beta/gamma"), vec!["alpha,", "beta/", "gamma"]);
        assert_eq!(word_segments("well-known (draft)"), vec!["well-", "known ", "(draft)"]);
        assert_eq!(word_segments("1,000.5 units"), vec!["1,000.5 ", "units"]);
    }

    #[test]
    fn spaceless_scripts_wrap_between_characters() {
        let thai = "\u{0E20}\u{0E32}\u{0E29}\u{0E32}\u{0E44}\u{0E17}\u{0E22}";
        assert!(word_segments(thai).len() > 1, "Thai text must offer break points");

        let m = Mono;
        let rows = wrap_text(&m, thai, &style(), 30.0);
        assert!(rows.len() > 1);
        assert!(rows.iter().all(|r| r.width <= 30.0));
        let rejoined: String = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(rejoined, thai);
    }

    #[test]
    fn punctuated_words_wrap_without_ellipsis() {
        let m = Mono;
        let rows = wrap_text(&m, "alpha,beta/gamma", &style(), 60.0);
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha,", "beta/", "gamma"]);
    }

    #[test]
    fn wrap_packs_words_greedily() {
        let m = Mono;
        let rows = wrap_text(&m, "aaa bbb ccc", &style(), 75.0);
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["aaa bbb", "ccc"]);
        assert_eq!(rows[1].y, 10.0);
    }

    #[test]
    fn truncated_remainder_keeps_its_original_separators() {
        let m = Mono;
        let text = "\u{6570}\u{636E}\u{56FE}\u{8868}\u{5E03}\u{5C40}";
        let rows = wrap_with_limit(&m, text, &style(), 25.0, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "\u{6570}\u{636E}");
        assert_eq!(rows[1].text, "\u{56FE}\u{2026}");
        assert_eq!(rows[1].y, 10.0);

        // The remainder starts with a short row; no space appears where it used to end.
        let rows = wrap_with_limit(&m, "\u{6570}abcdefgh", &style(), 45.0, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "\u{6570}ab\u{2026}");
    }

    #[test]
    fn wrap_with_limit_ellipsizes_the_last_row() {
        let m = Mono;
        let rows = wrap_with_limit(&m, "aaa bbb ccc ddd", &style(), 75.0, 1);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].text.ends_with(ELLIPSIS));
        assert!(rows[0].width <= 75.0);
    }
}
