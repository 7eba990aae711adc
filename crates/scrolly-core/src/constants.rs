/// Default inward shrink of the viewport, top and bottom (fraction of height).
/// A region must overlap the middle 40% of the viewport to count as in view.
pub const DEFAULT_MARGIN_PCT: f64 = 0.3;

/// Inward shrink used for once-only entrance reveals.
pub const ENTRANCE_MARGIN_PCT: f64 = 0.1;

/// Default cross-fade duration between scene palettes (ms).
pub const DEFAULT_FADE_MS: f64 = 1100.0;

/// Vertical offset applied by scroll-to navigation to clear a fixed header (px).
pub const DEFAULT_HEADER_OFFSET: f64 = 80.0;

/// Parallax spring stiffness (k). ω = sqrt(k / m).
pub const DEFAULT_SPRING_STIFFNESS: f64 = 150.0;

/// Parallax spring mass (m).
pub const DEFAULT_SPRING_MASS: f64 = 1.0;

/// Normalized pointer range: each axis is clamped to ±this value.
pub const POINTER_HALF_RANGE: f64 = 0.5;

/// Default period of an ambient decoration loop (ms).
pub const DEFAULT_AMBIENT_PERIOD_MS: f64 = 20_000.0;

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-9;
