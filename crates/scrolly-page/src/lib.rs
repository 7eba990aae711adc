//! Page-level wiring for scrolly-core: TOML page configs, mount/unmount
//! lifecycle for one page instance, and headless trace replay.

pub mod config;
pub mod error;
pub mod palette;
pub mod session;
pub mod trace;

pub use config::{CONFIG_ENV, PageConfig, PageSection, ParallaxSection, SceneEntry};
pub use error::{PageError, Result};
pub use palette::{PagePalette, PageToken, PaletteKind};
pub use session::{Frame, PageSession};
pub use trace::{ReplayReport, ReplayStep, TraceEvent, load_trace, parse_trace, replay};
