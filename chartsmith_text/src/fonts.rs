// Copyright 2025 the Chartsmith Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font-readiness gate.
//!
//! In a browser, text measured before web fonts finish loading is measured against fallback
//! fonts and produces wrong truncation and wrapping. Layout awaits [`FontsReady::ready`] before
//! trusting any measurement. Hosts without web fonts use [`FontsLoaded`], which is always ready.

use core::future::Future;

/// A capability that resolves once the fonts used for measurement are available.
pub trait FontsReady {
    /// Returns a future that completes when fonts are loaded.
    ///
    /// The future may complete immediately. It must be safe to await repeatedly.
    fn ready(&self) -> impl Future<Output = ()>;
}

impl<F: FontsReady + ?Sized> FontsReady for &F {
    fn ready(&self) -> impl Future<Output = ()> {
        (**self).ready()
    }
}

/// A gate for hosts where fonts are always available (native shaping, tests).
#[derive(Clone, Copy, Debug, Default)]
pub struct FontsLoaded;

impl FontsReady for FontsLoaded {
    fn ready(&self) -> impl Future<Output = ()> {
        core::future::ready(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::Cell;
    use core::pin::Pin;
    use core::task::{Context, Poll};

    use super::*;
    use crate::{HeuristicTextMeasurer, TextMeasurer, TextMetrics, TextStyle, measure_labels};

    /// Pending for a fixed number of polls, then ready.
    struct SlowFonts {
        polls_left: Cell<u32>,
        loaded: Cell<bool>,
    }

    struct SlowFuture<'a>(&'a SlowFonts);

    impl Future for SlowFuture<'_> {
        type Output = ();

        fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            let fonts = self.0;
            if fonts.polls_left.get() == 0 {
                fonts.loaded.set(true);
                return Poll::Ready(());
            }
            fonts.polls_left.set(fonts.polls_left.get() - 1);
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    impl FontsReady for SlowFonts {
        fn ready(&self) -> impl Future<Output = ()> {
            SlowFuture(self)
        }
    }

    struct CheckingMeasurer<'a>(&'a SlowFonts);

    impl TextMeasurer for CheckingMeasurer<'_> {
        fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
            assert!(self.0.loaded.get(), "measured before fonts were ready");
            HeuristicTextMeasurer.measure(text, style)
        }
    }

    #[test]
    fn measurement_waits_for_fonts() {
        let fonts = SlowFonts {
            polls_left: Cell::new(3),
            loaded: Cell::new(false),
        };
        let measurer = CheckingMeasurer(&fonts);
        let size = pollster::block_on(measure_labels(
            &measurer,
            &fonts,
            &["label"],
            &TextStyle::new(10.0),
        ));
        assert!(fonts.loaded.get());
        assert!(size.max_width > 0.0);
    }
}
