//! Scroll-driven visibility engine.
//!
//! # Responsibility
//! - Hide observed elements and reveal each one on its first threshold
//!   crossing.
//! - Track completion per element instead of relying on the host detector's
//!   unobserve call.
//!
//! # Invariants
//! - Every tracked element is `Pending` until its first crossing, then
//!   `Revealed` forever.
//! - A `Revealed` element is never re-hidden and never revealed twice.
//! - The first evaluation pass after `observe` reveals elements that are
//!   already past their threshold.

pub mod geometry;

use crate::config::SiteConfig;
use crate::dom::Dom;
use geometry::{intersection_ratio, Rect, Viewport};
use log::{debug, info};
use std::collections::HashMap;
use std::hash::Hash;

/// Selector for generic content elements revealed on scroll.
pub const CONTENT_SELECTOR: &str = ".card, .heritage-content > *, .section-header > *";
/// Selector for the grayscale heritage image.
pub const HERITAGE_IMAGE_SELECTOR: &str = ".heritage-image img";

pub const ANIMATED_CLASS: &str = "animate__animated";
pub const FADE_IN_UP_CLASS: &str = "animate__fadeInUp";
pub const REVEAL_COLOR_CLASS: &str = "reveal-color";

/// Browsers report threshold crossings at ratios marginally below the
/// configured threshold.
const RATIO_TOLERANCE: f64 = 1e-3;

/// Visual treatment applied when an element reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealKind {
    /// Fade/slide-in animation for content blocks.
    Content,
    /// Grayscale-to-color transition for the heritage image.
    Heritage,
}

/// Trigger configuration for one observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealProfile {
    pub kind: RevealKind,
    /// Minimum visible fraction in `(0, 1]`.
    pub threshold: f64,
    /// Bottom root margin in px; negative values shrink the viewport.
    pub bottom_margin_px: f64,
}

impl RevealProfile {
    pub const CONTENT: Self = Self {
        kind: RevealKind::Content,
        threshold: 0.1,
        bottom_margin_px: -50.0,
    };

    pub const HERITAGE: Self = Self {
        kind: RevealKind::Heritage,
        threshold: 0.25,
        bottom_margin_px: 0.0,
    };

    pub fn content(config: &SiteConfig) -> Self {
        Self {
            threshold: config.content_threshold,
            bottom_margin_px: config.content_bottom_margin_px,
            ..Self::CONTENT
        }
    }

    pub fn heritage(config: &SiteConfig) -> Self {
        Self {
            threshold: config.heritage_threshold,
            ..Self::HERITAGE
        }
    }

    /// CSS `rootMargin` string for native intersection observers.
    pub fn root_margin(&self) -> String {
        format!("0px 0px {}px 0px", self.bottom_margin_px)
    }

    /// Whether `sample` has crossed this profile's threshold.
    pub fn is_crossed<N>(&self, sample: &IntersectionSample<N>) -> bool {
        sample.is_intersecting && sample.ratio + RATIO_TOLERANCE >= self.threshold
    }

    /// Builds a sample from document layout for hosts without a detector.
    pub fn measure<N>(
        &self,
        target: N,
        layout: Rect,
        scroll_offset: f64,
        viewport: Viewport,
    ) -> IntersectionSample<N> {
        let ratio = intersection_ratio(
            layout.scrolled_by(scroll_offset),
            viewport,
            self.bottom_margin_px,
        );
        IntersectionSample {
            target,
            ratio,
            is_intersecting: ratio > 0.0,
        }
    }
}

/// One intersection report for an observed element.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionSample<N> {
    pub target: N,
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// One-shot lifecycle tag per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Pending,
    Revealed,
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    profile: RevealProfile,
    state: RevealState,
}

/// Registry of observed elements and their reveal state.
#[derive(Debug)]
pub struct RevealEngine<N> {
    tracked: HashMap<N, Tracked>,
}

impl<N> Default for RevealEngine<N> {
    fn default() -> Self {
        Self {
            tracked: HashMap::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> RevealEngine<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hides `node` and starts tracking it with `profile`.
    ///
    /// Returns `false` when `node` is already tracked; its state is kept.
    pub fn observe<D: Dom<Node = N>>(&mut self, dom: &D, node: N, profile: RevealProfile) -> bool {
        if self.tracked.contains_key(&node) {
            return false;
        }

        match profile.kind {
            RevealKind::Content => {
                dom.set_style(&node, "visibility", "hidden");
                dom.add_class(&node, ANIMATED_CLASS);
            }
            RevealKind::Heritage => dom.remove_class(&node, REVEAL_COLOR_CLASS),
        }

        self.tracked.insert(
            node,
            Tracked {
                profile,
                state: RevealState::Pending,
            },
        );
        true
    }

    /// Applies one batch of intersection reports.
    ///
    /// Returns the elements revealed by this batch; hosts stop observing them.
    /// Reports for unknown or already revealed elements are ignored.
    pub fn evaluate<D: Dom<Node = N>>(
        &mut self,
        dom: &D,
        samples: &[IntersectionSample<N>],
    ) -> Vec<N> {
        let mut released = Vec::new();
        for sample in samples {
            let Some(tracked) = self.tracked.get_mut(&sample.target) else {
                continue;
            };
            if tracked.state == RevealState::Revealed || !tracked.profile.is_crossed(sample) {
                continue;
            }

            match tracked.profile.kind {
                RevealKind::Content => {
                    dom.set_style(&sample.target, "visibility", "visible");
                    dom.add_class(&sample.target, FADE_IN_UP_CLASS);
                }
                RevealKind::Heritage => {
                    dom.add_class(&sample.target, REVEAL_COLOR_CLASS);
                    info!("event=heritage_reveal module=reveal status=ok");
                }
            }
            tracked.state = RevealState::Revealed;
            released.push(sample.target.clone());
        }

        if !released.is_empty() {
            debug!(
                "event=reveal_batch module=reveal status=ok revealed={} pending={}",
                released.len(),
                self.pending_count()
            );
        }
        released
    }

    pub fn state_of(&self, node: &N) -> Option<RevealState> {
        self.tracked.get(node).map(|tracked| tracked.state)
    }

    /// Whether `node` still needs intersection reports.
    pub fn is_observing(&self, node: &N) -> bool {
        self.state_of(node) == Some(RevealState::Pending)
    }

    pub fn pending_count(&self) -> usize {
        self.tracked
            .values()
            .filter(|tracked| tracked.state == RevealState::Pending)
            .count()
    }

    /// Pending elements for one reveal kind, with their profile.
    pub fn pending(&self, kind: RevealKind) -> Vec<(N, RevealProfile)> {
        self.tracked
            .iter()
            .filter(|(_, tracked)| {
                tracked.state == RevealState::Pending && tracked.profile.kind == kind
            })
            .map(|(node, tracked)| (node.clone(), tracked.profile))
            .collect()
    }
}
