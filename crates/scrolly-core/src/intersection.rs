//! Viewport intersection tracking.
//!
//! The tracker is notification-driven: the host calls [`IntersectionTracker::update`]
//! whenever the viewport scrolls or resizes, and the tracker reports only the
//! observations whose in-view state actually changed. Nothing here polls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, RootMargin, Viewport, is_in_view};
use crate::scene::TriggerMode;

/// Disposable handle for one observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub u64);

/// What to observe and how strictly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObservedRegion {
    pub scene_index: usize,
    pub margin: RootMargin,
    /// Fraction of the region's height that must be inside the band.
    pub threshold: f64,
    pub mode: TriggerMode,
}

impl ObservedRegion {
    pub fn continuous(scene_index: usize, margin: RootMargin) -> Self {
        Self {
            scene_index,
            margin,
            threshold: 0.0,
            mode: TriggerMode::Continuous,
        }
    }

    pub fn once(scene_index: usize, margin: RootMargin) -> Self {
        Self {
            scene_index,
            margin,
            threshold: 0.0,
            mode: TriggerMode::Once,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

/// One change of in-view state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crossing {
    pub observer: ObserverId,
    pub scene_index: usize,
    pub mode: TriggerMode,
    pub in_view: bool,
}

#[derive(Debug)]
struct Observation {
    region: ObservedRegion,
    rect: Option<Rect>,
    in_view: bool,
}

/// Tracks a set of observed regions against the viewport.
#[derive(Debug, Default)]
pub struct IntersectionTracker {
    observations: BTreeMap<ObserverId, Observation>,
    next_id: u64,
    emitted: u64,
}

impl IntersectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing. The region has no rectangle until
    /// [`set_region_rect`](Self::set_region_rect) is called, and never
    /// reports in view until then.
    pub fn observe(&mut self, region: ObservedRegion) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observations.insert(
            id,
            Observation {
                region,
                rect: None,
                in_view: false,
            },
        );
        id
    }

    /// Update the rectangle for an observation. `None` means detached from
    /// the document. Unknown ids are ignored. Returns whether the id is live.
    pub fn set_region_rect(&mut self, id: ObserverId, rect: Option<Rect>) -> bool {
        match self.observations.get_mut(&id) {
            Some(obs) => {
                obs.rect = rect;
                true
            }
            None => false,
        }
    }

    /// Stop observing. Safe to call repeatedly; returns whether anything was removed.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.observations.remove(&id).is_some()
    }

    pub fn is_observing(&self, id: ObserverId) -> bool {
        self.observations.contains_key(&id)
    }

    pub fn rect(&self, id: ObserverId) -> Option<Rect> {
        self.observations.get(&id).and_then(|o| o.rect)
    }

    pub fn is_in_view(&self, id: ObserverId) -> bool {
        self.observations.get(&id).is_some_and(|o| o.in_view)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Total crossings reported over the tracker's lifetime.
    pub fn crossings_emitted(&self) -> u64 {
        self.emitted
    }

    /// Re-evaluate every observation against `viewport`.
    ///
    /// Returns crossings in observation order. A crossing is reported only
    /// when the in-view state differs from the last reported state. `Once`
    /// observations are removed after their first in-view crossing.
    pub fn update(&mut self, viewport: &Viewport) -> Vec<Crossing> {
        let mut crossings = Vec::new();
        let mut latched = Vec::new();

        for (&id, obs) in self.observations.iter_mut() {
            let now_in_view = obs.rect.is_some_and(|rect| {
                is_in_view(&rect, viewport, &obs.region.margin, obs.region.threshold)
            });
            if now_in_view == obs.in_view {
                continue;
            }
            obs.in_view = now_in_view;
            tracing::debug!(
                scene = obs.region.scene_index,
                mode = obs.region.mode.as_str(),
                in_view = now_in_view,
                "crossing"
            );
            crossings.push(Crossing {
                observer: id,
                scene_index: obs.region.scene_index,
                mode: obs.region.mode,
                in_view: now_in_view,
            });
            if now_in_view && obs.region.mode == TriggerMode::Once {
                latched.push(id);
            }
        }

        for id in latched {
            self.observations.remove(&id);
        }

        self.emitted += crossings.len() as u64;
        crossings
    }
}
