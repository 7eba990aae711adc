//! Decorative background motion that runs independently of the active scene.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_AMBIENT_PERIOD_MS;

/// Parameters of one looping decoration (a slowly rotating, breathing orb).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmbientSpec {
    #[serde(default = "default_period")]
    pub period_ms: f64,
    /// Degrees turned per period.
    #[serde(default = "default_rotation")]
    pub rotation_deg: f64,
    #[serde(default = "default_scale")]
    pub scale_min: f64,
    #[serde(default = "default_scale_max")]
    pub scale_max: f64,
}

fn default_period() -> f64 {
    DEFAULT_AMBIENT_PERIOD_MS
}

fn default_rotation() -> f64 {
    360.0
}

fn default_scale() -> f64 {
    1.0
}

fn default_scale_max() -> f64 {
    1.2
}

impl Default for AmbientSpec {
    fn default() -> Self {
        Self {
            period_ms: default_period(),
            rotation_deg: default_rotation(),
            scale_min: default_scale(),
            scale_max: default_scale_max(),
        }
    }
}

/// Rotation and scale sampled from an ambient loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AmbientFrame {
    pub rotation_deg: f64,
    pub scale: f64,
}

impl AmbientFrame {
    pub const REST: AmbientFrame = AmbientFrame {
        rotation_deg: 0.0,
        scale: 1.0,
    };
}

/// A running decorative loop. Sampling is a pure function of time; the only
/// state is the start time, the phase offset and whether it has been stopped.
#[derive(Clone, Debug)]
pub struct AmbientLoop {
    spec: AmbientSpec,
    started_ms: f64,
    phase: f64,
    running: bool,
}

impl AmbientLoop {
    pub fn start(spec: AmbientSpec, now_ms: f64) -> Self {
        Self {
            spec,
            started_ms: now_ms,
            phase: 0.0,
            running: true,
        }
    }

    /// Start at a random point in the cycle so sibling decorations drift
    /// out of step with each other.
    pub fn start_with_random_phase(spec: AmbientSpec, now_ms: f64, rng: &mut impl Rng) -> Self {
        Self {
            phase: rng.random_range(0.0..1.0),
            ..Self::start(spec, now_ms)
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Teardown. A stopped loop samples as [`AmbientFrame::REST`].
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Cycle position in [0, 1).
    fn cycle(&self, now_ms: f64) -> f64 {
        if self.spec.period_ms <= 0.0 {
            return self.phase;
        }
        ((now_ms - self.started_ms) / self.spec.period_ms + self.phase).rem_euclid(1.0)
    }

    pub fn sample(&self, now_ms: f64) -> AmbientFrame {
        if !self.running {
            return AmbientFrame::REST;
        }
        let cycle = self.cycle(now_ms);
        // Scale breathes min → max → min once per period.
        let breath = 0.5 - 0.5 * (cycle * std::f64::consts::TAU).cos();
        AmbientFrame {
            rotation_deg: cycle * self.spec.rotation_deg,
            scale: self.spec.scale_min + (self.spec.scale_max - self.spec.scale_min) * breath,
        }
    }
}
