//! One mounted page: a scene registry, a pointer tracker and the ambient
//! decoration loops, with a single teardown path.

use rand::Rng;
use serde::Serialize;

use scrolly_core::{
    AmbientFrame, AmbientLoop, Axis, PointerTracker, Rect, RegionHandle, SceneRegistry,
    ScrollTarget, Viewport,
};

use crate::config::PageConfig;
use crate::palette::PagePalette;

/// Snapshot of everything a page's decoration layers read.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    pub at_ms: f64,
    pub active_index: usize,
    pub active_id: Option<String>,
    /// The blended palette token in its config syntax.
    pub color: String,
    pub transition_progress: f64,
    pub narrative_progress: f64,
    pub scroll_progress: f64,
    pub pointer: (f64, f64),
    pub parallax_px: (f64, f64),
    pub ambient: Vec<AmbientFrame>,
    pub mounted: bool,
}

pub struct PageSession {
    name: String,
    registry: SceneRegistry<PagePalette>,
    handles: Vec<RegionHandle>,
    pointer: PointerTracker,
    ambient: Vec<AmbientLoop>,
    viewport: Viewport,
    parallax_range: f64,
    last_tick_ms: f64,
    mounted: bool,
}

impl PageSession {
    /// Mount a page: register every scene in order, start ambient loops and
    /// attach the pointer tracker.
    pub fn mount(config: &PageConfig, viewport: Viewport, now_ms: f64, rng: &mut impl Rng) -> Self {
        let mut registry = SceneRegistry::new(config.palette(), config.registry_config());
        let handles: Vec<RegionHandle> = config
            .descriptors()
            .into_iter()
            .map(|d| registry.register_scene(d))
            .collect();
        if config.page.entrance {
            for &h in &handles {
                registry.observe_entrance(h);
            }
        }

        let ambient = config
            .ambient
            .iter()
            .map(|spec| AmbientLoop::start_with_random_phase(*spec, now_ms, rng))
            .collect();

        tracing::info!(
            "mounted page '{}' with {} scenes",
            config.page.name,
            handles.len()
        );

        Self {
            name: config.page.name.clone(),
            registry,
            handles,
            pointer: PointerTracker::new(config.parallax.stiffness, config.parallax.mass),
            ambient,
            viewport,
            parallax_range: config.parallax.range_px,
            last_tick_ms: now_ms,
            mounted: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &SceneRegistry<PagePalette> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SceneRegistry<PagePalette> {
        &mut self.registry
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Live scene for a layout feed by id. Ids may repeat: a rectangle goes
    /// to the first same-id scene not laid out yet and a detach to the first
    /// one that is, falling back to the first same-id scene.
    fn handle_for(&self, scene_id: &str, attach: bool) -> Option<RegionHandle> {
        let matching: Vec<RegionHandle> = self
            .handles
            .iter()
            .copied()
            .filter(|&h| {
                self.registry.is_live(h)
                    && self.registry.scene(h).is_some_and(|s| s.id == scene_id)
            })
            .collect();
        matching
            .iter()
            .copied()
            .find(|&h| self.registry.rect(h).is_some() != attach)
            .or_else(|| matching.first().copied())
    }

    /// Layout feed for one scene, then re-evaluate intersections.
    /// Unknown scene ids are logged and ignored.
    pub fn layout(&mut self, scene_id: &str, rect: Option<Rect>, now_ms: f64) {
        let Some(handle) = self.handle_for(scene_id, rect.is_some()) else {
            tracing::debug!(scene = scene_id, "layout for unknown scene ignored");
            return;
        };
        self.apply_layout(handle, rect, now_ms);
    }

    /// Layout feed addressed by scene order, for pages that repeat ids.
    pub fn layout_at(&mut self, order: usize, rect: Option<Rect>, now_ms: f64) {
        let Some(&handle) = self.handles.get(order) else {
            tracing::debug!(order, "layout for unknown scene order ignored");
            return;
        };
        self.apply_layout(handle, rect, now_ms);
    }

    fn apply_layout(&mut self, handle: RegionHandle, rect: Option<Rect>, now_ms: f64) {
        if self.registry.set_region_rect(handle, rect) {
            self.registry.on_scroll(&self.viewport, now_ms);
        }
    }

    pub fn scroll(&mut self, scroll_y: f64, now_ms: f64) {
        self.viewport = self.viewport.scrolled_to(scroll_y.max(0.0));
        self.registry.on_scroll(&self.viewport, now_ms);
    }

    pub fn resize(&mut self, width: f64, height: f64, now_ms: f64) {
        self.viewport = Viewport {
            width,
            height,
            scroll_y: self.viewport.scroll_y,
        };
        self.registry.on_scroll(&self.viewport, now_ms);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer.on_pointer_move(x, y, &self.viewport);
    }

    /// Animation-frame tick: advance parallax springs to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        let dt = (now_ms - self.last_tick_ms).max(0.0);
        self.last_tick_ms = self.last_tick_ms.max(now_ms);
        self.pointer.tick(dt);
    }

    pub fn scroll_to(&self, scene_id: &str) -> Option<ScrollTarget> {
        self.registry.scroll_to_scene(scene_id)
    }

    /// Teardown: unregister scenes, drop listeners, detach the pointer and
    /// stop ambient loops. Safe to call more than once.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.registry.unmount();
        self.pointer.detach();
        for l in &mut self.ambient {
            l.stop();
        }
        self.mounted = false;
        tracing::info!("unmounted page '{}'", self.name);
    }

    pub fn frame(&self, now_ms: f64) -> Frame {
        let visual = self.registry.visual_state(now_ms);
        Frame {
            at_ms: now_ms,
            active_index: self.registry.current_index(),
            active_id: self.registry.active_scene().map(|s| s.id.clone()),
            color: visual
                .as_ref()
                .map(|v| v.current_color.to_string())
                .unwrap_or_default(),
            transition_progress: visual.as_ref().map_or(1.0, |v| v.transition_progress),
            narrative_progress: self.registry.narrative_progress(),
            scroll_progress: self.viewport.scroll_progress(self.registry.document_height()),
            pointer: self.pointer.normalized(),
            parallax_px: (
                self.pointer.offset_px(Axis::X, false, self.parallax_range),
                self.pointer.offset_px(Axis::Y, false, self.parallax_range),
            ),
            ambient: self.ambient.iter().map(|l| l.sample(now_ms)).collect(),
            mounted: self.mounted,
        }
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.unmount();
    }
}
