//! Auto-hiding header.
//!
//! # Responsibility
//! - Hide the header while scrolling down and show it while scrolling up.
//! - Sample high-frequency scroll streams at a fixed interval.
//!
//! # Invariants
//! - At offset `<= 0` the header is always shown and direction resets.
//! - The hidden/shown transition fires once per direction change.

use crate::dom::Dom;
use log::trace;

pub const HEADER_SELECTOR: &str = ".main-header";
pub const SCROLL_DOWN_CLASS: &str = "scroll-down";
pub const SCROLL_UP_CLASS: &str = "scroll-up";
pub const HIDDEN_TRANSFORM: &str = "translate(-50%, -150%)";
pub const SHOWN_TRANSFORM: &str = "translate(-50%, 0)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// At the top or no movement seen yet.
    Rest,
    Down,
    Up,
}

/// Header visibility after one scroll sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderVisibility {
    Shown,
    Hidden,
}

#[derive(Debug, Clone)]
pub struct NavbarController<N> {
    header: N,
    last_offset: f64,
    direction: ScrollDirection,
}

impl<N: Clone> NavbarController<N> {
    pub fn new(header: N) -> Self {
        Self {
            header,
            last_offset: 0.0,
            direction: ScrollDirection::Rest,
        }
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn visibility(&self) -> HeaderVisibility {
        if self.direction == ScrollDirection::Down {
            HeaderVisibility::Hidden
        } else {
            HeaderVisibility::Shown
        }
    }

    /// Applies one vertical scroll offset sample.
    pub fn on_scroll<D: Dom<Node = N>>(&mut self, dom: &D, offset: f64) -> HeaderVisibility {
        if offset <= 0.0 {
            dom.remove_class(&self.header, SCROLL_DOWN_CLASS);
            dom.remove_class(&self.header, SCROLL_UP_CLASS);
            dom.set_style(&self.header, "transform", SHOWN_TRANSFORM);
            self.direction = ScrollDirection::Rest;
            self.last_offset = 0.0;
            return HeaderVisibility::Shown;
        }

        if offset > self.last_offset && self.direction != ScrollDirection::Down {
            dom.remove_class(&self.header, SCROLL_UP_CLASS);
            dom.add_class(&self.header, SCROLL_DOWN_CLASS);
            dom.set_style(&self.header, "transform", HIDDEN_TRANSFORM);
            self.direction = ScrollDirection::Down;
            trace!("event=navbar module=navbar status=hidden offset={offset}");
        } else if offset < self.last_offset && self.direction == ScrollDirection::Down {
            dom.remove_class(&self.header, SCROLL_DOWN_CLASS);
            dom.add_class(&self.header, SCROLL_UP_CLASS);
            dom.set_style(&self.header, "transform", SHOWN_TRANSFORM);
            self.direction = ScrollDirection::Up;
            trace!("event=navbar module=navbar status=shown offset={offset}");
        }

        self.last_offset = offset;
        self.visibility()
    }
}

/// Fixed-interval scroll sampler with a trailing sample.
///
/// Samples arriving within `interval_ms` of the last emitted one are held
/// back; the newest held sample is emitted by `flush`.
#[derive(Debug, Clone)]
pub struct ScrollSampler {
    interval_ms: f64,
    last_emit_ms: Option<f64>,
    pending: Option<f64>,
}

impl ScrollSampler {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_emit_ms: None,
            pending: None,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Offers one raw sample; returns it when it should be processed now.
    pub fn offer(&mut self, now_ms: f64, offset: f64) -> Option<f64> {
        let due = self
            .last_emit_ms
            .map_or(true, |last| now_ms - last >= self.interval_ms);
        if due {
            self.pending = None;
            self.last_emit_ms = Some(now_ms);
            Some(offset)
        } else {
            self.pending = Some(offset);
            None
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Emits the held-back sample, if any.
    pub fn flush(&mut self, now_ms: f64) -> Option<f64> {
        let offset = self.pending.take()?;
        self.last_emit_ms = Some(now_ms);
        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::{HeaderVisibility, NavbarController, ScrollSampler, SCROLL_DOWN_CLASS};
    use crate::dom::{Dom, MemoryDom};

    #[test]
    fn returning_to_top_forces_header_visible() {
        let dom = MemoryDom::new();
        let header = dom.add_element(dom.body(), "header", None, "main-header");
        let mut navbar = NavbarController::new(header);
        navbar.on_scroll(&dom, 120.0);
        assert_eq!(navbar.on_scroll(&dom, 0.0), HeaderVisibility::Shown);
        assert!(!dom.has_class(&header, SCROLL_DOWN_CLASS));

        // Scrolling down again hides it from the reset baseline.
        assert_eq!(navbar.on_scroll(&dom, 10.0), HeaderVisibility::Hidden);
    }

    #[test]
    fn sampler_holds_back_bursts_and_flushes_latest() {
        let mut sampler = ScrollSampler::new(100.0);
        assert_eq!(sampler.offer(0.0, 10.0), Some(10.0));
        assert_eq!(sampler.offer(16.0, 20.0), None);
        assert_eq!(sampler.offer(32.0, 30.0), None);
        assert!(sampler.has_pending());
        assert_eq!(sampler.flush(100.0), Some(30.0));
        assert_eq!(sampler.flush(116.0), None);
        assert_eq!(sampler.offer(200.0, 40.0), Some(40.0));
    }

    #[test]
    fn zero_interval_sampler_passes_everything() {
        let mut sampler = ScrollSampler::new(0.0);
        assert_eq!(sampler.offer(5.0, 1.0), Some(1.0));
        assert_eq!(sampler.offer(5.0, 2.0), Some(2.0));
    }
}
