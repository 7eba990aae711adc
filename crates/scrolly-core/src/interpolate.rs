//! Derived visual values: interpolation, cross-fades and scene palettes.

use crate::color::{Backdrop, Color, Gradient};
use crate::constants::DEFAULT_FADE_MS;
use crate::easing::Easing;
use crate::scene::SceneDescriptor;

/// Values that can be blended. `t = 0` yields `self`, `t = 1` yields `other`.
pub trait Interpolate: Clone + PartialEq {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Color {
            r: self.r.lerp(&other.r, t),
            g: self.g.lerp(&other.g, t),
            b: self.b.lerp(&other.b, t),
            a: self.a.lerp(&other.a, t),
        }
    }
}

impl Interpolate for Gradient {
    /// Stop-wise blend. Gradients of different lengths are resampled to the
    /// longer length first.
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let n = self.stops.len().max(other.stops.len());
        let sample = |g: &Gradient, i: usize| {
            if n <= 1 {
                g.at(0.0)
            } else {
                g.at(i as f64 / (n - 1) as f64)
            }
        };
        Gradient::new(
            (0..n)
                .map(|i| sample(self, i).lerp(&sample(other, i), t))
                .collect(),
        )
    }
}

impl Interpolate for Backdrop {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Backdrop {
            color: self.color.lerp(&other.color, t),
            blur_px: self.blur_px.lerp(&other.blur_px, t),
        }
    }
}

/// Timed transition between two values that can be retargeted mid-flight.
///
/// Retargeting starts the new fade from whatever is on screen at that moment,
/// so rapid back-and-forth scene changes never queue up a backlog of fades.
#[derive(Clone, Debug)]
pub struct Crossfade<T: Interpolate> {
    from: T,
    to: T,
    started_ms: f64,
    duration_ms: f64,
    easing: Easing,
}

impl<T: Interpolate> Crossfade<T> {
    /// A settled fade resting on `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            from: initial.clone(),
            to: initial,
            started_ms: f64::NEG_INFINITY,
            duration_ms: DEFAULT_FADE_MS,
            easing: Easing::default(),
        }
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn target(&self) -> &T {
        &self.to
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Raw (un-eased) progress of the current fade in [0, 1].
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Eased progress of the current fade in [0, 1].
    pub fn eased_progress(&self, now_ms: f64) -> f64 {
        self.easing.apply(self.progress(now_ms))
    }

    pub fn is_settled(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Displayed value at `now_ms`.
    pub fn sample(&self, now_ms: f64) -> T {
        let t = self.eased_progress(now_ms);
        if t >= 1.0 {
            return self.to.clone();
        }
        self.from.lerp(&self.to, t)
    }

    /// Point the fade at a new target. Retargeting to the current target is a
    /// no-op; otherwise the in-progress fade is interrupted, not queued.
    pub fn retarget(&mut self, to: T, now_ms: f64) {
        if to == self.to {
            return;
        }
        self.from = self.sample(now_ms);
        self.to = to;
        self.started_ms = now_ms;
    }
}

/// Maps a scene to the visual token that drives the page background.
pub trait Palette {
    type Token: Interpolate;

    fn token(&self, scene: &SceneDescriptor) -> Self::Token;
}

/// Reads each scene's own palette token as a CSS colour.
#[derive(Clone, Debug, Default)]
pub struct HexPalette {
    pub fallback: Color,
}

impl HexPalette {
    pub fn new(fallback: Color) -> Self {
        Self { fallback }
    }
}

impl Palette for HexPalette {
    type Token = Color;

    fn token(&self, scene: &SceneDescriptor) -> Color {
        Color::parse(&scene.palette).unwrap_or_else(|e| {
            tracing::warn!(scene = %scene.id, "{e}; using fallback {}", self.fallback);
            self.fallback
        })
    }
}

/// A page-wide table of colours indexed by scene order, wrapping around.
#[derive(Clone, Debug)]
pub struct TablePalette {
    pub colors: Vec<Color>,
}

impl TablePalette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }
}

impl Palette for TablePalette {
    type Token = Color;

    fn token(&self, scene: &SceneDescriptor) -> Color {
        if self.colors.is_empty() {
            return Color::default();
        }
        self.colors[scene.order % self.colors.len()]
    }
}

/// Reads each scene's palette token as a `|`-separated gradient.
#[derive(Clone, Debug, Default)]
pub struct GradientPalette {
    pub fallback: Color,
}

impl Palette for GradientPalette {
    type Token = Gradient;

    fn token(&self, scene: &SceneDescriptor) -> Gradient {
        Gradient::parse(&scene.palette).unwrap_or_else(|e| {
            tracing::warn!(scene = %scene.id, "{e}; using fallback {}", self.fallback);
            Gradient::new(vec![self.fallback])
        })
    }
}

/// Reads `<colour> blur(<px>)` tokens so the backdrop blur fades along with
/// the colour.
#[derive(Clone, Debug, Default)]
pub struct BackdropPalette {
    pub fallback: Backdrop,
}

impl BackdropPalette {
    pub fn new(fallback: Backdrop) -> Self {
        Self { fallback }
    }
}

impl Palette for BackdropPalette {
    type Token = Backdrop;

    fn token(&self, scene: &SceneDescriptor) -> Backdrop {
        Backdrop::parse(&scene.palette, self.fallback.blur_px).unwrap_or_else(|e| {
            tracing::warn!(scene = %scene.id, "{e}; using fallback {}", self.fallback.color);
            self.fallback
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64_lerp() {
        assert_eq!(2.0_f64.lerp(&4.0, 0.5), 3.0);
    }

    #[test]
    fn test_crossfade_settled_initially() {
        let f = Crossfade::new(Color::BLACK);
        assert!(f.is_settled(0.0));
        assert_eq!(f.sample(0.0), Color::BLACK);
    }

    #[test]
    fn test_crossfade_runs_over_duration() {
        let mut f = Crossfade::new(0.0_f64).with_duration(1000.0);
        f.retarget(1.0, 0.0);
        assert_eq!(f.sample(0.0), 0.0);
        assert!((f.sample(500.0) - 0.5).abs() < 1e-9);
        assert!(f.sample(250.0) < 0.25, "ease-in-out starts slow");
        assert_eq!(f.sample(1000.0), 1.0);
        assert!(f.is_settled(1200.0));
    }

    #[test]
    fn test_retarget_same_target_does_not_restart() {
        let mut f = Crossfade::new(0.0_f64).with_duration(1000.0);
        f.retarget(1.0, 0.0);
        f.retarget(1.0, 600.0);
        assert!((f.progress(600.0) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_retarget_interrupts_from_displayed_value() {
        let mut f = Crossfade::new(0.0_f64)
            .with_duration(1000.0)
            .with_easing(Easing::Linear);
        f.retarget(10.0, 0.0);
        let shown = f.sample(300.0);
        f.retarget(0.0, 300.0);
        // New fade starts where the old one was, no jump.
        assert!((f.sample(300.0) - shown).abs() < 1e-9);
        assert_eq!(f.progress(300.0), 0.0);
        assert_eq!(f.sample(1300.0), 0.0);
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let mut f = Crossfade::new(Color::BLACK).with_duration(0.0);
        f.retarget(Color::WHITE, 5.0);
        assert_eq!(f.sample(5.0), Color::WHITE);
    }

    #[test]
    fn test_hex_palette_fallback() {
        let p = HexPalette::new(Color::WHITE);
        assert_eq!(
            p.token(&SceneDescriptor::new("a", "#000")),
            Color::BLACK
        );
        assert_eq!(
            p.token(&SceneDescriptor::new("b", "not-a-colour")),
            Color::WHITE
        );
    }

    #[test]
    fn test_table_palette_wraps() {
        let p = TablePalette::new(vec![Color::BLACK, Color::WHITE]);
        let mut d = SceneDescriptor::new("x", "");
        d.order = 3;
        assert_eq!(p.token(&d), Color::WHITE);
        assert_eq!(TablePalette::new(vec![]).token(&d), Color::BLACK);
    }

    #[test]
    fn test_gradient_lerp_resamples() {
        let a = Gradient::new(vec![Color::BLACK]);
        let b = Gradient::new(vec![Color::WHITE, Color::BLACK]);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.stops.len(), 2);
        assert!((mid.stops[0].r - 0.5).abs() < 1e-9);
        assert!(mid.stops[1].r.abs() < 1e-9);
    }

    #[test]
    fn test_gradient_palette() {
        let p = GradientPalette::default();
        let g = p.token(&SceneDescriptor::new("a", "#fff|#000"));
        assert_eq!(g.stops, vec![Color::WHITE, Color::BLACK]);
    }

    #[test]
    fn test_backdrop_blur_fades_with_colour() {
        let p = BackdropPalette::default();
        let from = p.token(&SceneDescriptor::new("a", "#000 blur(0px)"));
        let to = p.token(&SceneDescriptor::new("b", "#fff blur(20px)"));
        let mut f = Crossfade::new(from)
            .with_duration(1000.0)
            .with_easing(Easing::Linear);
        f.retarget(to, 0.0);
        let mid = f.sample(500.0);
        assert!((mid.blur_px - 10.0).abs() < 1e-9);
        assert!((mid.color.g - 0.5).abs() < 1e-9);

        let bad = p.token(&SceneDescriptor::new("c", "fog"));
        assert_eq!(bad, Backdrop::default());
    }
}
