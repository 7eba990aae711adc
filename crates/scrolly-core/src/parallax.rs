//! Pointer-driven parallax.
//!
//! Raw pointer coordinates are normalized to [-0.5, 0.5] around the viewport
//! centre and then smoothed by a critically damped spring, so pointer jitter
//! never drives decoration layers directly.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SPRING_MASS, DEFAULT_SPRING_STIFFNESS, POINTER_HALF_RANGE};
use crate::geometry::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Critically damped spring on one axis.
///
/// Uses the analytical solution to the critically damped oscillator:
///   x(t) = target + (c1 + c2·t)·e^(−ω·t)
/// where ω = sqrt(k/m), c1 = x0 − target, c2 = v0 + ω·c1.
/// Starting from rest it approaches the target without overshoot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
    pub omega: f64,
}

impl Spring {
    pub fn new(stiffness: f64, mass: f64) -> Self {
        let omega = if mass > 0.0 && stiffness > 0.0 {
            (stiffness / mass).sqrt()
        } else {
            (DEFAULT_SPRING_STIFFNESS / DEFAULT_SPRING_MASS).sqrt()
        };
        Self {
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            omega,
        }
    }

    /// Advance by `dt` seconds. Returns true once settled on the target.
    pub fn step(&mut self, dt: f64) -> bool {
        if dt <= 0.0 {
            return self.is_settled();
        }
        let w = self.omega;
        let c1 = self.position - self.target;
        let c2 = self.velocity + w * c1;
        let exp = (-w * dt).exp();

        self.position = self.target + (c1 + c2 * dt) * exp;
        self.velocity = (c2 - w * (c1 + c2 * dt)) * exp;

        if self.is_settled() {
            self.position = self.target;
            self.velocity = 0.0;
            return true;
        }
        false
    }

    pub fn is_settled(&self) -> bool {
        (self.position - self.target).abs() < 1e-4 && self.velocity.abs() < 1e-3
    }
}

impl Default for Spring {
    fn default() -> Self {
        Self::new(DEFAULT_SPRING_STIFFNESS, DEFAULT_SPRING_MASS)
    }
}

/// Normalized, smoothed pointer position owned by one page instance.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    raw: (f64, f64),
    x: Spring,
    y: Spring,
    attached: bool,
    events: u64,
}

impl PointerTracker {
    pub fn new(stiffness: f64, mass: f64) -> Self {
        Self {
            raw: (0.0, 0.0),
            x: Spring::new(stiffness, mass),
            y: Spring::new(stiffness, mass),
            attached: true,
            events: 0,
        }
    }

    /// Pointer-move notification. Ignored after [`detach`](Self::detach),
    /// for zero-sized viewports and for non-finite coordinates.
    pub fn on_pointer_move(&mut self, raw_x: f64, raw_y: f64, viewport: &Viewport) {
        if !self.attached || viewport.is_empty() {
            return;
        }
        if !(raw_x.is_finite() && raw_y.is_finite()) {
            tracing::debug!(raw_x, raw_y, "ignoring non-finite pointer position");
            return;
        }
        let nx = normalize(raw_x, viewport.width);
        let ny = normalize(raw_y, viewport.height);
        self.raw = (nx, ny);
        self.x.target = nx;
        self.y.target = ny;
        self.events += 1;
    }

    /// Advance the smoothing springs by `dt_ms`.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        let dt = dt_ms / 1000.0;
        let sx = self.x.step(dt);
        let sy = self.y.step(dt);
        sx && sy
    }

    /// Latest normalized position, unsmoothed.
    pub fn normalized(&self) -> (f64, f64) {
        self.raw
    }

    /// Smoothed offset on `axis`, negated when `reverse` (for layers that
    /// move against the pointer).
    pub fn pointer_offset(&self, axis: Axis, reverse: bool) -> f64 {
        let v = match axis {
            Axis::X => self.x.position,
            Axis::Y => self.y.position,
        };
        if reverse { -v } else { v }
    }

    /// Offset scaled to pixels: ±`range_px` at the viewport edge.
    pub fn offset_px(&self, axis: Axis, reverse: bool, range_px: f64) -> f64 {
        self.pointer_offset(axis, reverse) / POINTER_HALF_RANGE * range_px
    }

    /// Teardown: stop listening. Later pointer events are ignored.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Pointer events accepted since creation.
    pub fn events_seen(&self) -> u64 {
        self.events
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SPRING_STIFFNESS, DEFAULT_SPRING_MASS)
    }
}

fn normalize(raw: f64, extent: f64) -> f64 {
    (raw / extent - POINTER_HALF_RANGE).clamp(-POINTER_HALF_RANGE, POINTER_HALF_RANGE)
}
