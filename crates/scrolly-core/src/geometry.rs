//! Document-space geometry for viewport intersection.
//!
//! All rectangles are in document coordinates (y grows downward from the top
//! of the page). The viewport is the window onto the document at the current
//! scroll offset.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MARGIN_PCT, EPSILON};

/// Axis-aligned rectangle in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Full-width band starting at `top`.
    pub fn band(top: f64, height: f64) -> Self {
        Self::new(0.0, top, 1.0, height)
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Zero-sized (or negative) regions never count as in view.
    pub fn is_empty(&self) -> bool {
        self.width <= EPSILON || self.height <= EPSILON
    }
}

/// The visible window onto the document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    pub fn scrolled_to(self, scroll_y: f64) -> Self {
        Self { scroll_y, ..self }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= EPSILON || self.height <= EPSILON
    }

    /// Overall page scroll ratio in [0, 1] for a document of the given height.
    /// Pages that fit in the viewport report 0.
    pub fn scroll_progress(&self, document_height: f64) -> f64 {
        let scrollable = document_height - self.height;
        if scrollable <= EPSILON {
            return 0.0;
        }
        (self.scroll_y / scrollable).clamp(0.0, 1.0)
    }
}

/// Inward shrink of the viewport, as fractions of its height.
///
/// `top = 0.3, bottom = 0.3` is the equivalent of a `-30% 0px -30% 0px`
/// root margin: only the middle 40% of the viewport counts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: f64,
    pub bottom: f64,
}

impl RootMargin {
    /// Symmetric shrink, clamped so the effective band never inverts.
    pub fn symmetric(pct: f64) -> Self {
        let pct = pct.clamp(0.0, 0.49);
        Self {
            top: pct,
            bottom: pct,
        }
    }

    pub fn none() -> Self {
        Self {
            top: 0.0,
            bottom: 0.0,
        }
    }

    /// Effective in-view band `(top, bottom)` in document coordinates.
    pub fn effective_band(&self, viewport: &Viewport) -> (f64, f64) {
        let top = viewport.scroll_y + viewport.height * self.top.max(0.0);
        let bottom = viewport.scroll_y + viewport.height * (1.0 - self.bottom.max(0.0));
        (top, bottom.max(top))
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::symmetric(DEFAULT_MARGIN_PCT)
    }
}

/// Fraction of `rect`'s height that lies inside the margin-shrunk viewport.
/// Range: [0, 1]. Zero for empty rects or viewports.
pub fn visible_fraction(rect: &Rect, viewport: &Viewport, margin: &RootMargin) -> f64 {
    if rect.is_empty() || viewport.is_empty() {
        return 0.0;
    }
    let (band_top, band_bottom) = margin.effective_band(viewport);
    let overlap = rect.bottom().min(band_bottom) - rect.top.max(band_top);
    if overlap <= 0.0 {
        return 0.0;
    }
    (overlap / rect.height).clamp(0.0, 1.0)
}

/// In-view predicate: strictly positive overlap, and at least `threshold` of
/// the region's height inside the band.
pub fn is_in_view(rect: &Rect, viewport: &Viewport, margin: &RootMargin, threshold: f64) -> bool {
    let fraction = visible_fraction(rect, viewport, margin);
    fraction > 0.0 && fraction + EPSILON >= threshold.clamp(0.0, 1.0)
}
