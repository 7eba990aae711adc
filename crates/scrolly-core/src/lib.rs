//! Scroll-synchronized narrative engine.
//!
//! Splits a long page into an ordered list of scenes, decides which one is
//! active as the viewport moves, and derives the presentation values that
//! follow it: a cross-faded background colour and blur, table-of-contents
//! highlight, progress ratio, plus a spring-smoothed pointer parallax offset.
//!
//! Zero I/O. The host feeds viewport, layout and pointer notifications in and
//! reads indexes and interpolated values out; nothing here knows how scenes
//! are drawn.

pub mod ambient;
pub mod color;
pub mod constants;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod interpolate;
pub mod intersection;
pub mod parallax;
pub mod registry;
pub mod resolver;
pub mod scene;

pub use ambient::{AmbientFrame, AmbientLoop, AmbientSpec};
pub use color::{Backdrop, Color, Gradient};
pub use constants::{
    DEFAULT_FADE_MS, DEFAULT_HEADER_OFFSET, DEFAULT_MARGIN_PCT, DEFAULT_SPRING_MASS,
    DEFAULT_SPRING_STIFFNESS,
};
pub use easing::Easing;
pub use error::SceneError;
pub use geometry::{Rect, RootMargin, Viewport};
pub use interpolate::{
    BackdropPalette, Crossfade, GradientPalette, HexPalette, Interpolate, Palette, TablePalette,
};
pub use intersection::{Crossing, IntersectionTracker, ObservedRegion, ObserverId};
pub use parallax::{Axis, PointerTracker, Spring};
pub use registry::{
    InterpolatedVisualState, RegionHandle, RegistryConfig, SceneRegistry, ScrollBehavior,
    ScrollTarget, Subscription, TocEntry,
};
pub use resolver::{ActiveSceneChange, ActiveSceneResolver};
pub use scene::{SceneDescriptor, TriggerMode};
