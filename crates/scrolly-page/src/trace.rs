//! Headless replay of recorded page events.
//!
//! A trace is a JSON array of tagged events, e.g.
//!
//! ```json
//! [
//!   {"type": "layout", "scene": "intro", "top": 0, "height": 900},
//!   {"type": "scroll", "y": 450, "at_ms": 16},
//!   {"type": "pointer", "x": 640, "y": 360, "at_ms": 20},
//!   {"type": "tick", "at_ms": 1200}
//! ]
//! ```
//!
//! `layout` and `detach` may carry an `order` to pick one of several scenes
//! sharing an id; it wins over `scene`.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use scrolly_core::{Rect, ScrollTarget, Viewport};

use crate::config::PageConfig;
use crate::error::Result;
use crate::session::{Frame, PageSession};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    Layout {
        scene: String,
        #[serde(default)]
        order: Option<usize>,
        top: f64,
        height: f64,
        #[serde(default)]
        left: f64,
        width: Option<f64>,
        at_ms: Option<f64>,
    },
    Detach {
        scene: String,
        #[serde(default)]
        order: Option<usize>,
        at_ms: Option<f64>,
    },
    Scroll {
        y: f64,
        at_ms: f64,
    },
    Resize {
        width: f64,
        height: f64,
        at_ms: f64,
    },
    Pointer {
        x: f64,
        y: f64,
        at_ms: f64,
    },
    Tick {
        at_ms: f64,
    },
    ScrollTo {
        scene: String,
    },
    Unmount,
}

impl TraceEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Layout { .. } => "layout",
            Self::Detach { .. } => "detach",
            Self::Scroll { .. } => "scroll",
            Self::Resize { .. } => "resize",
            Self::Pointer { .. } => "pointer",
            Self::Tick { .. } => "tick",
            Self::ScrollTo { .. } => "scroll_to",
            Self::Unmount => "unmount",
        }
    }

    fn at_ms(&self) -> Option<f64> {
        match self {
            Self::Layout { at_ms, .. } | Self::Detach { at_ms, .. } => *at_ms,
            Self::Scroll { at_ms, .. }
            | Self::Resize { at_ms, .. }
            | Self::Pointer { at_ms, .. }
            | Self::Tick { at_ms } => Some(*at_ms),
            Self::ScrollTo { .. } | Self::Unmount => None,
        }
    }
}

/// Result of applying one event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplayStep {
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_target: Option<ScrollTarget>,
    pub frame: Frame,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplayReport {
    pub page: String,
    pub steps: Vec<ReplayStep>,
    /// Active-index changes observed through the registry's listener.
    pub changes: Vec<usize>,
}

pub fn parse_trace(json: &str) -> Result<Vec<TraceEvent>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceEvent>> {
    let content = fs::read_to_string(path)?;
    parse_trace(&content)
}

/// Mount a page for `config`, apply `events` in order and record a frame
/// after each one. Event timestamps that go backwards are clamped forward.
pub fn replay(
    config: &PageConfig,
    events: &[TraceEvent],
    viewport: Viewport,
    rng: &mut impl Rng,
) -> ReplayReport {
    let mut session = PageSession::mount(config, viewport, 0.0, rng);

    let changes = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = changes.clone();
    session
        .registry_mut()
        .on_active_scene_change(move |change, _| sink.borrow_mut().push(change.current));

    let mut now = 0.0_f64;
    let mut steps = Vec::with_capacity(events.len());

    for event in events {
        if let Some(at) = event.at_ms() {
            now = now.max(at);
        }
        let mut scroll_target = None;
        match event {
            TraceEvent::Layout {
                scene,
                order,
                top,
                height,
                left,
                width,
                ..
            } => {
                let width = width.unwrap_or(session.viewport().width);
                let rect = Some(Rect::new(*left, *top, width, *height));
                match order {
                    Some(order) => session.layout_at(*order, rect, now),
                    None => session.layout(scene, rect, now),
                }
            }
            TraceEvent::Detach { scene, order, .. } => match order {
                Some(order) => session.layout_at(*order, None, now),
                None => session.layout(scene, None, now),
            },
            TraceEvent::Scroll { y, .. } => session.scroll(*y, now),
            TraceEvent::Resize { width, height, .. } => session.resize(*width, *height, now),
            TraceEvent::Pointer { x, y, .. } => {
                session.tick(now);
                session.pointer_move(*x, *y);
            }
            TraceEvent::Tick { .. } => session.tick(now),
            TraceEvent::ScrollTo { scene } => {
                scroll_target = session.scroll_to(scene);
                if let Some(target) = scroll_target {
                    session.scroll(target.y, now);
                }
            }
            TraceEvent::Unmount => session.unmount(),
        }
        steps.push(ReplayStep {
            event: event.kind(),
            scroll_target,
            frame: session.frame(now),
        });
    }

    session.unmount();
    let changes = changes.borrow().clone();
    ReplayReport {
        page: session.name().to_string(),
        steps,
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn config() -> PageConfig {
        PageConfig::from_toml_str(
            r##"
[page]
name = "replay"

[[scenes]]
id = "intro"
palette = "#000000"

[[scenes]]
id = "a"
palette = "#ffffff"

[[scenes]]
id = "b"
palette = "#00ff00"
"##,
        )
        .unwrap()
    }

    const TRACE: &str = r#"[
        {"type": "layout", "scene": "intro", "top": 0, "height": 1000},
        {"type": "layout", "scene": "a", "top": 1000, "height": 1000},
        {"type": "layout", "scene": "b", "top": 2000, "height": 1000},
        {"type": "scroll", "y": 1000, "at_ms": 100},
        {"type": "tick", "at_ms": 1300},
        {"type": "scroll_to", "scene": "b"},
        {"type": "scroll_to", "scene": "nowhere"},
        {"type": "unmount"},
        {"type": "scroll", "y": 0, "at_ms": 1400}
    ]"#;

    #[test]
    fn test_parse_trace_kinds() {
        let events = parse_trace(TRACE).unwrap();
        let kinds: Vec<&str> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "layout",
                "layout",
                "layout",
                "scroll",
                "tick",
                "scroll_to",
                "scroll_to",
                "unmount",
                "scroll"
            ]
        );
    }

    #[test]
    fn test_replay_walkthrough() {
        let events = parse_trace(TRACE).unwrap();
        let report = replay(&config(), &events, Viewport::new(1280.0, 1000.0), &mut rng());

        assert_eq!(report.page, "replay");
        assert_eq!(report.steps.len(), events.len());

        let after_scroll = &report.steps[3].frame;
        assert_eq!(after_scroll.active_index, 1);

        let settled = &report.steps[4].frame;
        assert_eq!(settled.color, "#ffffff");

        let jump = &report.steps[5];
        let target = jump.scroll_target.unwrap();
        assert_eq!(target.scene_index, 2);
        assert_eq!(jump.frame.active_index, 2);

        assert!(report.steps[6].scroll_target.is_none());

        let after_unmount = &report.steps[8].frame;
        assert!(!after_unmount.mounted);
        assert_eq!(after_unmount.active_index, 2);

        assert_eq!(report.changes, vec![1, 2]);
    }

    #[test]
    fn test_bad_trace_is_json_error() {
        let err = parse_trace(r#"[{"type": "teleport"}]"#).unwrap_err();
        assert!(matches!(err, crate::error::PageError::Json(_)));
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let events = parse_trace(
            r#"[
                {"type": "tick", "at_ms": 500},
                {"type": "tick", "at_ms": 100}
            ]"#,
        )
        .unwrap();
        let report = replay(&config(), &events, Viewport::new(800.0, 600.0), &mut rng());
        assert_eq!(report.steps[1].frame.at_ms, 500.0);
    }

    fn kind_config(kind: &str, first: &str, second: &str) -> PageConfig {
        PageConfig::from_toml_str(&format!(
            "[page]\npalette = \"{kind}\"\ndefault_blur_px = 6.0\n\n\
             [[scenes]]\nid = \"one\"\npalette = \"{first}\"\n\n\
             [[scenes]]\nid = \"two\"\npalette = \"{second}\"\n"
        ))
        .unwrap()
    }

    const TWO_SCENES: &str = r#"[
        {"type": "layout", "scene": "one", "top": 0, "height": 1000},
        {"type": "layout", "scene": "two", "top": 1000, "height": 1000},
        {"type": "scroll", "y": 1000, "at_ms": 100},
        {"type": "tick", "at_ms": 1300}
    ]"#;

    fn settled_color(config: &PageConfig) -> (String, String) {
        let events = parse_trace(TWO_SCENES).unwrap();
        let report = replay(config, &events, Viewport::new(800.0, 1000.0), &mut rng());
        (
            report.steps[0].frame.color.clone(),
            report.steps[3].frame.color.clone(),
        )
    }

    #[test]
    fn test_replay_hex_palette() {
        let (start, end) = settled_color(&kind_config("hex", "#000", "#fff"));
        assert_eq!(start, "#000000");
        assert_eq!(end, "#ffffff");
    }

    #[test]
    fn test_replay_gradient_palette() {
        let (start, end) = settled_color(&kind_config("gradient", "#000|#111", "#fff|#eee"));
        assert_eq!(start, "#000000|#111111");
        assert_eq!(end, "#ffffff|#eeeeee");
    }

    #[test]
    fn test_replay_backdrop_palette() {
        let (start, end) = settled_color(&kind_config("backdrop", "#000 blur(20px)", "#fff"));
        assert_eq!(start, "#000000 blur(20px)");
        assert_eq!(end, "#ffffff blur(6px)");
    }

    #[test]
    fn test_replay_order_targets_repeated_ids() {
        let config = PageConfig::from_toml_str(
            "[[scenes]]\nid = \"a\"\n\n[[scenes]]\nid = \"dup\"\n\n[[scenes]]\nid = \"dup\"\n",
        )
        .unwrap();
        let events = parse_trace(
            r#"[
                {"type": "layout", "scene": "dup", "order": 2, "top": 2000, "height": 1000},
                {"type": "layout", "scene": "dup", "order": 1, "top": 1000, "height": 1000},
                {"type": "scroll", "y": 2000, "at_ms": 10},
                {"type": "detach", "scene": "dup", "order": 2},
                {"type": "scroll_to", "scene": "dup"}
            ]"#,
        )
        .unwrap();
        let report = replay(&config, &events, Viewport::new(800.0, 1000.0), &mut rng());
        assert_eq!(report.steps[2].frame.active_index, 2);
        assert_eq!(report.steps[3].frame.active_index, 2);
        assert_eq!(report.steps[4].scroll_target.unwrap().scene_index, 1);
        assert_eq!(report.changes, vec![2, 1]);
    }
}
