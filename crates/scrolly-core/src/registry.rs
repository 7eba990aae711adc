//! Per-page scene registry.
//!
//! One [`SceneRegistry`] per page instance. It owns the ordered scene list,
//! the intersection tracker, the active-scene resolver, the background
//! cross-fade and the change-listener list. Two registries never share state.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::constants::{DEFAULT_FADE_MS, DEFAULT_HEADER_OFFSET, ENTRANCE_MARGIN_PCT};
use crate::easing::Easing;
use crate::error::SceneError;
use crate::geometry::{Rect, RootMargin, Viewport};
use crate::interpolate::{Crossfade, Palette};
use crate::intersection::{IntersectionTracker, ObservedRegion, ObserverId};
use crate::resolver::{ActiveSceneChange, ActiveSceneResolver};
use crate::scene::{SceneDescriptor, TriggerMode};

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`SceneRegistry::register_scene`]. Only valid for the
/// registry that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionHandle {
    registry: u64,
    index: usize,
}

impl RegionHandle {
    /// Scene order this handle refers to.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Handle returned by [`SceneRegistry::on_active_scene_change`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Tunables for one registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegistryConfig {
    pub margin: RootMargin,
    pub threshold: f64,
    pub entrance_margin: RootMargin,
    pub header_offset: f64,
    pub fade_ms: f64,
    pub easing: Easing,
    pub scroll_behavior: ScrollBehavior,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            margin: RootMargin::default(),
            threshold: 0.0,
            entrance_margin: RootMargin::symmetric(ENTRANCE_MARGIN_PCT),
            header_offset: DEFAULT_HEADER_OFFSET,
            fade_ms: DEFAULT_FADE_MS,
            easing: Easing::default(),
            scroll_behavior: ScrollBehavior::Smooth,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Destination for a programmatic scroll.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScrollTarget {
    pub scene_index: usize,
    pub y: f64,
    pub behavior: ScrollBehavior,
}

/// One row of a sticky table of contents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub order: usize,
    pub is_current: bool,
}

/// Presentation values derived from the active scene at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InterpolatedVisualState<T> {
    pub active_index: usize,
    pub current_color: T,
    /// Eased progress of the running cross-fade, 1.0 when settled.
    pub transition_progress: f64,
    /// Active index over the last index, 0.0 for pages with one scene.
    pub narrative_progress: f64,
}

type Listener = Box<dyn FnMut(ActiveSceneChange, &SceneDescriptor)>;

struct SceneSlot<T> {
    descriptor: SceneDescriptor,
    /// Palette token resolved once at registration.
    token: T,
    rect: Option<Rect>,
    observer: Option<ObserverId>,
    entrance: Option<ObserverId>,
    revealed: bool,
}

impl<T> SceneSlot<T> {
    fn is_live(&self) -> bool {
        self.observer.is_some()
    }
}

pub struct SceneRegistry<P: Palette> {
    id: u64,
    config: RegistryConfig,
    palette: P,
    slots: Vec<SceneSlot<P::Token>>,
    tracker: IntersectionTracker,
    resolver: ActiveSceneResolver,
    fade: Option<Crossfade<P::Token>>,
    listeners: Vec<(u64, Listener)>,
    next_subscription: u64,
    live: usize,
}

impl<P: Palette> SceneRegistry<P> {
    pub fn new(palette: P, config: RegistryConfig) -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            config,
            palette,
            slots: Vec::new(),
            tracker: IntersectionTracker::new(),
            resolver: ActiveSceneResolver::new(0),
            fade: None,
            listeners: Vec::new(),
            next_subscription: 0,
            live: 0,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn palette(&self) -> &P {
        &self.palette
    }

    // --- Registration ---

    /// Register the next scene in page order. The descriptor's `order` is
    /// overwritten with its list position. A duplicate id is logged and the
    /// scene is still registered as a distinct entry.
    pub fn register_scene(&mut self, mut descriptor: SceneDescriptor) -> RegionHandle {
        let index = self.slots.len();
        descriptor.order = index;

        if let Some(first) = self.slots.iter().find(|s| s.descriptor.id == descriptor.id) {
            let err = SceneError::DuplicateSceneId {
                id: descriptor.id.clone(),
                first_order: first.descriptor.order,
            };
            tracing::warn!("{err}; registering as a distinct scene");
        }

        let observer = self.tracker.observe(
            ObservedRegion::continuous(index, self.config.margin)
                .with_threshold(self.config.threshold),
        );

        let token = self.palette.token(&descriptor);
        if self.fade.is_none() {
            self.fade = Some(
                Crossfade::new(token.clone())
                    .with_duration(self.config.fade_ms)
                    .with_easing(self.config.easing),
            );
        }

        tracing::debug!(scene = %descriptor.id, index, "registered scene");
        self.slots.push(SceneSlot {
            descriptor,
            token,
            rect: None,
            observer: Some(observer),
            entrance: None,
            revealed: false,
        });
        self.resolver.set_scene_count(self.slots.len());
        self.live += 1;

        RegionHandle {
            registry: self.id,
            index,
        }
    }

    /// Detach a scene's tracking. Idempotent: returns false (and changes
    /// nothing) for a handle that was already unregistered or is foreign.
    ///
    /// The scene keeps its position in the list, so indexes of later scenes
    /// stay valid. If it was the active scene, the nearest live scene becomes
    /// active without a notification.
    pub fn unregister_scene(&mut self, handle: RegionHandle) -> bool {
        if self.slot(handle).is_none() || !self.tear_down(handle.index) {
            return false;
        }
        if handle.index == self.resolver.current()
            && let Some(next) = self.nearest_live(handle.index)
        {
            tracing::debug!(from = handle.index, to = next, "active scene unregistered");
            self.resolver.reseat(next);
        }
        true
    }

    fn tear_down(&mut self, index: usize) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        let Some(observer) = slot.observer.take() else {
            return false;
        };
        let entrance = slot.entrance.take();
        let id = slot.descriptor.id.clone();

        self.tracker.unobserve(observer);
        if let Some(entrance) = entrance {
            self.tracker.unobserve(entrance);
        }
        self.live -= 1;
        tracing::debug!(scene = %id, "unregistered scene");
        true
    }

    /// Closest live scene to `index`, preferring the earlier one on ties.
    fn nearest_live(&self, index: usize) -> Option<usize> {
        (1..self.slots.len()).find_map(|d| {
            let before = index.checked_sub(d).filter(|&i| self.slots[i].is_live());
            let after = Some(index + d)
                .filter(|&i| self.slots.get(i).is_some_and(|s| s.is_live()));
            before.or(after)
        })
    }

    /// Host layout feed: the scene's rectangle in document coordinates, or
    /// `None` once it has left the document. Returns false for dead handles.
    pub fn set_region_rect(&mut self, handle: RegionHandle, rect: Option<Rect>) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        if !slot.is_live() {
            return false;
        }
        if rect.is_none_or(|r| r.is_empty()) {
            tracing::debug!(
                "{}",
                SceneError::DetachedRegion {
                    id: slot.descriptor.id.clone()
                }
            );
        }
        slot.rect = rect;
        let observers = [slot.observer, slot.entrance];
        for id in observers.into_iter().flatten() {
            self.tracker.set_region_rect(id, rect);
        }
        true
    }

    /// Track a once-only entrance reveal for the scene. Returns false for
    /// dead handles or scenes that are already tracked or revealed.
    pub fn observe_entrance(&mut self, handle: RegionHandle) -> bool {
        let margin = self.config.entrance_margin;
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        if !slot.is_live() || slot.entrance.is_some() || slot.revealed {
            return false;
        }
        let rect = slot.rect;
        let id = self.tracker.observe(ObservedRegion::once(handle.index, margin));
        self.tracker.set_region_rect(id, rect);
        if let Some(slot) = self.slot_mut(handle) {
            slot.entrance = Some(id);
        }
        true
    }

    pub fn is_revealed(&self, handle: RegionHandle) -> bool {
        self.slot(handle).is_some_and(|s| s.revealed)
    }

    pub fn is_live(&self, handle: RegionHandle) -> bool {
        self.slot(handle).is_some_and(|s| s.is_live())
    }

    /// Last rectangle fed for a live scene.
    pub fn rect(&self, handle: RegionHandle) -> Option<Rect> {
        self.slot(handle).filter(|s| s.is_live()).and_then(|s| s.rect)
    }

    /// Bottom edge of the lowest live, laid-out scene.
    pub fn document_height(&self) -> f64 {
        self.slots
            .iter()
            .filter(|s| s.is_live())
            .filter_map(|s| s.rect)
            .map(|r| r.bottom())
            .fold(0.0, f64::max)
    }

    fn slot(&self, handle: RegionHandle) -> Option<&SceneSlot<P::Token>> {
        if handle.registry != self.id {
            tracing::debug!("{}", SceneError::UnknownHandle(handle.index as u64));
            return None;
        }
        self.slots.get(handle.index)
    }

    fn slot_mut(&mut self, handle: RegionHandle) -> Option<&mut SceneSlot<P::Token>> {
        if handle.registry != self.id {
            tracing::debug!("{}", SceneError::UnknownHandle(handle.index as u64));
            return None;
        }
        self.slots.get_mut(handle.index)
    }

    // --- Listeners ---

    /// Subscribe to active-scene changes. The listener receives the change
    /// and the newly active scene.
    pub fn on_active_scene_change<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(ActiveSceneChange, &SceneDescriptor) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        Subscription(id)
    }

    /// Remove a listener. Safe to call repeatedly.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // --- Scroll handling ---

    /// Viewport notification (scroll, resize or post-layout). Runs the
    /// intersection tracker, resolves the active scene, retargets the
    /// background fade and notifies listeners once per net change.
    pub fn on_scroll(&mut self, viewport: &Viewport, now_ms: f64) -> Option<ActiveSceneChange> {
        let crossings = self.tracker.update(viewport);
        if crossings.is_empty() {
            return None;
        }

        for c in crossings.iter().filter(|c| c.mode == TriggerMode::Once && c.in_view) {
            if let Some(slot) = self.slots.get_mut(c.scene_index) {
                slot.revealed = true;
                slot.entrance = None;
            }
        }

        let change = self.resolver.apply_all(&crossings)?;
        self.apply_change(change, now_ms);
        Some(change)
    }

    fn apply_change(&mut self, change: ActiveSceneChange, now_ms: f64) {
        let slot = &self.slots[change.current];
        if let Some(fade) = self.fade.as_mut() {
            fade.retarget(slot.token.clone(), now_ms);
        }
        for (_, listener) in self.listeners.iter_mut() {
            listener(change, &slot.descriptor);
        }
    }

    // --- Navigation ---

    /// Where to scroll to bring scene `id` under the fixed header. A silent
    /// `None` when the scene is unknown, unregistered or not laid out.
    pub fn scroll_to_scene(&self, id: &str) -> Option<ScrollTarget> {
        let slot = self
            .slots
            .iter()
            .find(|s| s.is_live() && s.descriptor.id == id)?;
        let rect = match slot.rect {
            Some(r) if !r.is_empty() => r,
            _ => {
                tracing::debug!(
                    "{}",
                    SceneError::DetachedRegion {
                        id: id.to_string()
                    }
                );
                return None;
            }
        };
        Some(ScrollTarget {
            scene_index: slot.descriptor.order,
            y: (rect.top - self.config.header_offset).max(0.0),
            behavior: self.config.scroll_behavior,
        })
    }

    // --- Queries ---

    /// Always a valid index once a scene is registered; 0 before that.
    pub fn current_index(&self) -> usize {
        self.resolver.current()
    }

    /// `None` once no live scene is left.
    pub fn active_scene(&self) -> Option<&SceneDescriptor> {
        self.slots
            .get(self.resolver.current())
            .filter(|s| s.is_live())
            .map(|s| &s.descriptor)
    }

    /// The ordered scene list, including unregistered positions.
    pub fn scenes(&self) -> impl Iterator<Item = &SceneDescriptor> {
        self.slots.iter().map(|s| &s.descriptor)
    }

    pub fn scene(&self, handle: RegionHandle) -> Option<&SceneDescriptor> {
        self.slot(handle).map(|s| &s.descriptor)
    }

    pub fn is_current(&self, order: usize) -> bool {
        !self.slots.is_empty() && order == self.resolver.current()
    }

    /// Table-of-contents rows for the scenes still mounted.
    pub fn toc(&self) -> Vec<TocEntry> {
        self.slots
            .iter()
            .filter(|s| s.is_live())
            .map(|s| TocEntry {
                id: s.descriptor.id.clone(),
                order: s.descriptor.order,
                is_current: self.is_current(s.descriptor.order),
            })
            .collect()
    }

    /// Number of scene positions (registered at any point).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of scenes still registered.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Crossings the tracker has reported over the registry's lifetime.
    pub fn crossings_emitted(&self) -> u64 {
        self.tracker.crossings_emitted()
    }

    pub fn narrative_progress(&self) -> f64 {
        match self.slots.len() {
            0 | 1 => 0.0,
            n => self.resolver.current() as f64 / (n - 1) as f64,
        }
    }

    /// Derived visuals at `now_ms`. `None` until a scene is registered.
    pub fn visual_state(&self, now_ms: f64) -> Option<InterpolatedVisualState<P::Token>> {
        let fade = self.fade.as_ref()?;
        Some(InterpolatedVisualState {
            active_index: self.resolver.current(),
            current_color: fade.sample(now_ms),
            transition_progress: fade.eased_progress(now_ms),
            narrative_progress: self.narrative_progress(),
        })
    }

    /// Page teardown: unregister every scene and drop every listener. The
    /// active index keeps its last value.
    pub fn unmount(&mut self) {
        for index in 0..self.slots.len() {
            self.tear_down(index);
        }
        self.listeners.clear();
        tracing::debug!(registry = self.id, "registry unmounted");
    }
}
