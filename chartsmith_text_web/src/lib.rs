// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser text measurement.
//!
//! Two measurers mirror the two ways chart labels are rendered in a page:
//! - [`SvgTextMeasurer`] measures the bounding box of an off-screen SVG `<text>` node, for
//!   labels drawn as SVG text.
//! - [`HtmlTextMeasurer`] renders into a `visibility: hidden` container sized to the viewport,
//!   one label at a time, for labels drawn as HTML (their layout can depend on the container).
//!
//! [`DocumentFonts`] implements [`FontsReady`] by awaiting `document.fonts.ready`.
//!
//! Notes:
//! - `web-sys`/`wasm-bindgen` are only used on `wasm32` targets.
//! - Non-`wasm32` builds fall back to [`HeuristicTextMeasurer`] and an always-ready gate, so
//!   layout code can be exercised natively.

#![no_std]

extern crate alloc;

#[cfg(target_arch = "wasm32")]
use alloc::{format, string::String};
use core::future::Future;

use chartsmith_text::{FontsReady, HeuristicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};

#[cfg(target_arch = "wasm32")]
const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[cfg(target_arch = "wasm32")]
fn font_style_css(style: &TextStyle) -> &'static str {
    match style.font_style {
        chartsmith_text::FontStyle::Normal => "normal",
        chartsmith_text::FontStyle::Italic => "italic",
        chartsmith_text::FontStyle::Oblique => "oblique",
    }
}

#[cfg(target_arch = "wasm32")]
fn js_err(context: &str) -> wasm_bindgen::JsValue {
    wasm_bindgen::JsValue::from_str(&format!("chartsmith_text_web: {context}"))
}

#[cfg(target_arch = "wasm32")]
fn document() -> Result<web_sys::Document, wasm_bindgen::JsValue> {
    web_sys::window()
        .ok_or_else(|| js_err("missing window"))?
        .document()
        .ok_or_else(|| js_err("missing document"))
}

/// Splits a measured box height into ascent/descent using typical Latin proportions.
fn metrics_from_box(width: f64, height: f64, style: &TextStyle) -> TextMetrics {
    let height = if height > 0.0 { height } else { style.font_size };
    TextMetrics {
        advance_width: width.max(0.0),
        ascent: 0.8 * height,
        descent: 0.2 * height,
        leading: 0.0,
    }
}

/// Measures labels as SVG text using `getBBox()`.
///
/// On non-`wasm32` targets this type is still available but always falls back to
/// [`HeuristicTextMeasurer`].
#[derive(Clone, Debug)]
pub struct SvgTextMeasurer {
    #[cfg(target_arch = "wasm32")]
    text: web_sys::SvgGraphicsElement,
}

impl SvgTextMeasurer {
    /// Creates a measurer backed by a hidden `<svg><text/></svg>` appended to `<body>`.
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Result<Self, wasm_bindgen::JsValue> {
        use wasm_bindgen::JsCast as _;

        let document = document()?;
        let body = document.body().ok_or_else(|| js_err("missing body"))?;
        let svg = document.create_element_ns(Some(SVG_NS), "svg")?;
        svg.set_attribute(
            "style",
            "position:absolute;left:-10000px;top:-10000px;visibility:hidden",
        )?;
        let text = document.create_element_ns(Some(SVG_NS), "text")?;
        svg.append_child(&text)?;
        body.append_child(&svg)?;
        let text = text.dyn_into::<web_sys::SvgGraphicsElement>()?;
        Ok(Self { text })
    }

    /// Creates a non-web measurer that always falls back to heuristics.
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SvgTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for SvgTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        #[cfg(target_arch = "wasm32")]
        {
            let el = &self.text;
            let font_size = format!("{}px", style.font_size);
            let weight = format!("{}", style.font_weight.0);
            let applied = el
                .set_attribute("font-size", &font_size)
                .and_then(|()| el.set_attribute("font-family", style.font_family.as_css_family()))
                .and_then(|()| el.set_attribute("font-weight", &weight))
                .and_then(|()| el.set_attribute("font-style", font_style_css(style)));
            if applied.is_err() {
                log::warn!("failed to style SVG measurement node; using heuristic metrics");
                return HeuristicTextMeasurer.measure(text, style);
            }
            el.set_text_content(Some(text));
            match el.get_b_box() {
                Ok(bbox) => {
                    metrics_from_box(f64::from(bbox.width()), f64::from(bbox.height()), style)
                }
                Err(_) => HeuristicTextMeasurer.measure(text, style),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let m = HeuristicTextMeasurer.measure(text, style);
            metrics_from_box(m.advance_width, m.line_height(), style)
        }
    }
}

/// Measures HTML labels inside a hidden, viewport-sized container.
///
/// Labels are rendered one at a time into the same container; each measurement replaces the
/// previous label so ancestor constraints stay identical across labels.
#[derive(Clone, Debug)]
pub struct HtmlTextMeasurer {
    #[cfg(target_arch = "wasm32")]
    label: web_sys::HtmlElement,
}

impl HtmlTextMeasurer {
    /// Creates a measurer whose container is appended to `<body>`.
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Result<Self, wasm_bindgen::JsValue> {
        use wasm_bindgen::JsCast as _;

        let document = document()?;
        let body = document.body().ok_or_else(|| js_err("missing body"))?;
        let container = document
            .create_element("div")?
            .dyn_into::<web_sys::HtmlElement>()?;
        let container_style = container.style();
        container_style.set_property("position", "absolute")?;
        container_style.set_property("left", "0")?;
        container_style.set_property("top", "0")?;
        container_style.set_property("width", "100vw")?;
        container_style.set_property("height", "100vh")?;
        container_style.set_property("visibility", "hidden")?;
        container_style.set_property("pointer-events", "none")?;
        container_style.set_property("overflow", "hidden")?;
        let label = document
            .create_element("span")?
            .dyn_into::<web_sys::HtmlElement>()?;
        label.style().set_property("white-space", "nowrap")?;
        container.append_child(&label)?;
        body.append_child(&container)?;
        Ok(Self { label })
    }

    /// Creates a non-web measurer that always falls back to heuristics.
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(target_arch = "wasm32")]
    fn apply_style(&self, style: &TextStyle) -> Result<(), wasm_bindgen::JsValue> {
        let css = self.label.style();
        css.set_property("font-size", &format!("{}px", style.font_size))?;
        css.set_property("font-family", style.font_family.as_css_family())?;
        css.set_property("font-weight", &format!("{}", style.font_weight.0))?;
        css.set_property("font-style", font_style_css(style))?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for HtmlTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for HtmlTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        #[cfg(target_arch = "wasm32")]
        {
            if self.apply_style(style).is_err() {
                log::warn!("failed to style HTML measurement node; using heuristic metrics");
                return HeuristicTextMeasurer.measure(text, style);
            }
            self.label.set_inner_html(text);
            let rect = self.label.get_bounding_client_rect();
            let metrics = metrics_from_box(rect.width(), rect.height(), style);
            self.label.set_inner_html("");
            metrics
        }

        #[cfg(not(target_arch = "wasm32"))]
        HeuristicTextMeasurer.measure(text, style)
    }
}

/// A [`FontsReady`] gate backed by `document.fonts.ready`.
#[derive(Clone, Debug)]
pub struct DocumentFonts {
    #[cfg(target_arch = "wasm32")]
    document: web_sys::Document,
}

impl DocumentFonts {
    /// Creates a gate for the current document.
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Result<Self, wasm_bindgen::JsValue> {
        Ok(Self {
            document: document()?,
        })
    }

    /// Creates a gate that is always ready.
    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for DocumentFonts {
    fn default() -> Self {
        Self::new()
    }
}

impl FontsReady for DocumentFonts {
    fn ready(&self) -> impl Future<Output = ()> {
        #[cfg(target_arch = "wasm32")]
        let promise = self.document.fonts().ready();

        async move {
            #[cfg(target_arch = "wasm32")]
            match promise {
                Ok(promise) => {
                    if wasm_bindgen_futures::JsFuture::from(promise).await.is_err() {
                        log::warn!("document.fonts.ready rejected; measuring with current fonts");
                    }
                }
                Err(_) => log::warn!("document.fonts.ready unavailable"),
            }
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn native_fallbacks_match_the_heuristic_width() {
        let style = TextStyle::new(10.0);
        let expected = HeuristicTextMeasurer.measure("abc", &style).advance_width;
        let svg = SvgTextMeasurer::new().measure("abc", &style).advance_width;
        let html = HtmlTextMeasurer::new().measure("abc", &style).advance_width;
        assert!((svg - expected).abs() < 1e-9);
        assert!((html - expected).abs() < 1e-9);
    }

    #[test]
    fn svg_fallback_splits_box_height_into_ascent_and_descent() {
        let style = TextStyle::new(10.0);
        let m = SvgTextMeasurer::new().measure("abc", &style);
        assert!((m.ascent - 8.0).abs() < 1e-9);
        assert!((m.descent - 2.0).abs() < 1e-9);
    }
}
