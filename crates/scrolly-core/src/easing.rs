use serde::{Deserialize, Serialize};

/// Timing curve for cross-fades. Maps normalized time to progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    /// Smooth S-curve, cubic.
    #[default]
    EaseInOut,
    EaseOutQuad,
    EaseOutCubic,
}

impl Easing {
    /// Apply easing to a normalized time parameter t ∈ [0, 1].
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::EaseOutQuad => 1.0 - (1.0 - t).powi(2),
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }

    /// Lenient name lookup; unknown names fall back to the default curve.
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().replace('_', "-").as_str() {
            "linear" => Self::Linear,
            "ease-out" | "ease-out-quad" => Self::EaseOutQuad,
            "ease-out-cubic" => Self::EaseOutCubic,
            _ => Self::EaseInOut,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseInOut => "ease-in-out",
            Self::EaseOutQuad => "ease-out-quad",
            Self::EaseOutCubic => "ease-out-cubic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseInOut,
        Easing::EaseOutQuad,
        Easing::EaseOutCubic,
    ];

    #[test]
    fn test_endpoints() {
        for e in ALL {
            assert!(e.apply(0.0).abs() < 1e-12, "{e:?} at 0");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?} at 1");
        }
    }

    #[test]
    fn test_clamps_outside_range() {
        assert_eq!(Easing::EaseInOut.apply(-3.0), 0.0);
        assert_eq!(Easing::EaseInOut.apply(7.0), 1.0);
    }

    #[test]
    fn test_ease_in_out_symmetric() {
        let e = Easing::EaseInOut;
        assert!((e.apply(0.5) - 0.5).abs() < 1e-12);
        assert!((e.apply(0.2) + e.apply(0.8) - 1.0).abs() < 1e-12);
        assert!(e.apply(0.1) < 0.1, "slow start");
    }

    #[test]
    fn test_monotonic() {
        for e in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = e.apply(i as f64 / 100.0);
                assert!(v >= prev, "{e:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_names_roundtrip() {
        for e in ALL {
            assert_eq!(Easing::from_name(e.as_str()), e);
        }
        assert_eq!(Easing::from_name("ease_out"), Easing::EaseOutQuad);
        assert_eq!(Easing::from_name("bogus"), Easing::EaseInOut);
    }
}
