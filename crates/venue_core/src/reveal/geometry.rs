//! Viewport intersection math for hosts without a native detector.

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Same rectangle shifted up by a vertical scroll offset.
    pub fn scrolled_by(&self, offset: f64) -> Self {
        Self {
            top: self.top - offset,
            ..*self
        }
    }
}

/// Visible viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Fraction of `element` inside the viewport after applying a bottom root
/// margin (negative values shrink the viewport).
///
/// Zero-area elements report `1.0` when they touch the effective viewport
/// and `0.0` otherwise.
pub fn intersection_ratio(element: Rect, viewport: Viewport, bottom_margin_px: f64) -> f64 {
    let root_bottom = (viewport.height + bottom_margin_px).max(0.0);
    let overlap_top = element.top.max(0.0);
    let overlap_bottom = element.bottom().min(root_bottom);
    let overlap_left = element.left.max(0.0);
    let overlap_right = element.right().min(viewport.width);

    let overlap_height = overlap_bottom - overlap_top;
    let overlap_width = overlap_right - overlap_left;
    if overlap_height < 0.0 || overlap_width < 0.0 {
        return 0.0;
    }

    let area = element.width * element.height;
    if area <= 0.0 {
        return 1.0;
    }
    ((overlap_height * overlap_width) / area).clamp(0.0, 1.0)
}
