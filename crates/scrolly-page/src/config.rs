use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use scrolly_core::{
    AmbientSpec, Color, DEFAULT_FADE_MS, DEFAULT_HEADER_OFFSET, DEFAULT_MARGIN_PCT,
    DEFAULT_SPRING_MASS, DEFAULT_SPRING_STIFFNESS, Easing, RegistryConfig, RootMargin,
    SceneDescriptor, SceneError, ScrollBehavior,
};

use crate::error::{PageError, Result};
use crate::palette::{PagePalette, PaletteKind};

/// Environment variable naming a page config when none is given explicitly.
pub const CONFIG_ENV: &str = "SCROLLY_CONFIG";

/// A page's scene list and engine tunables, as read from TOML.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub page: PageSection,
    #[serde(default)]
    pub parallax: ParallaxSection,
    #[serde(default)]
    pub ambient: Vec<AmbientSpec>,
    #[serde(default)]
    pub scenes: Vec<SceneEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSection {
    pub name: String,
    pub header_offset: f64,
    pub margin_pct: f64,
    pub threshold: f64,
    pub entrance_margin_pct: f64,
    pub fade_ms: f64,
    pub easing: String,
    pub default_color: String,
    /// How every scene's palette token is read.
    pub palette: PaletteKind,
    /// Blur for backdrop tokens without a `blur(...)` suffix.
    pub default_blur_px: f64,
    /// Animate table-of-contents jumps; `false` jumps instantly.
    pub smooth_scroll: bool,
    /// Track a once-only entrance reveal for every scene.
    pub entrance: bool,
}

impl Default for PageSection {
    fn default() -> Self {
        Self {
            name: "page".to_string(),
            header_offset: DEFAULT_HEADER_OFFSET,
            margin_pct: DEFAULT_MARGIN_PCT,
            threshold: 0.0,
            entrance_margin_pct: scrolly_core::constants::ENTRANCE_MARGIN_PCT,
            fade_ms: DEFAULT_FADE_MS,
            easing: Easing::default().as_str().to_string(),
            default_color: "#000000".to_string(),
            palette: PaletteKind::Hex,
            default_blur_px: 0.0,
            smooth_scroll: true,
            entrance: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxSection {
    pub stiffness: f64,
    pub mass: f64,
    /// Pixel travel at the viewport edge for decoration layers.
    pub range_px: f64,
}

impl Default for ParallaxSection {
    fn default() -> Self {
        Self {
            stiffness: DEFAULT_SPRING_STIFFNESS,
            mass: DEFAULT_SPRING_MASS,
            range_px: 40.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneEntry {
    pub id: String,
    #[serde(default)]
    pub palette: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl PageConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            "loaded page '{}' ({} scenes) from {}",
            config.page.name,
            config.scenes.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and check hard requirements. Soft problems are left to
    /// [`warnings`](Self::warnings).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PageConfig = toml::from_str(content)?;
        if config.scenes.is_empty() {
            return Err(PageError::InvalidData(
                "page config has no [[scenes]]".to_string(),
            ));
        }
        if let Some(empty) = config.scenes.iter().position(|s| s.id.trim().is_empty()) {
            return Err(PageError::InvalidData(format!(
                "scene at position {empty} has an empty id"
            )));
        }
        if config.page.fade_ms < 0.0 {
            return Err(PageError::InvalidData(format!(
                "fade_ms must be non-negative, got {}",
                config.page.fade_ms
            )));
        }
        Ok(config)
    }

    /// Anomalies the engine will tolerate: duplicate ids and palette tokens
    /// the page's palette kind cannot read.
    pub fn warnings(&self) -> Vec<SceneError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut warnings = Vec::new();
        for (order, scene) in self.scenes.iter().enumerate() {
            if let Some(&first_order) = seen.get(scene.id.as_str()) {
                warnings.push(SceneError::DuplicateSceneId {
                    id: scene.id.clone(),
                    first_order,
                });
            } else {
                seen.insert(scene.id.as_str(), order);
            }
            if let Err(e) = self.page.palette.check(&scene.palette) {
                warnings.push(e);
            }
        }
        if let Err(e) = Color::parse(&self.page.default_color) {
            warnings.push(e);
        }
        warnings
    }

    pub fn descriptors(&self) -> Vec<SceneDescriptor> {
        self.scenes
            .iter()
            .enumerate()
            .map(|(order, s)| SceneDescriptor {
                id: s.id.clone(),
                order,
                palette: s.palette.clone(),
                payload: s.payload.clone(),
            })
            .collect()
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            margin: RootMargin::symmetric(self.page.margin_pct),
            threshold: self.page.threshold.clamp(0.0, 1.0),
            entrance_margin: RootMargin::symmetric(self.page.entrance_margin_pct),
            header_offset: self.page.header_offset,
            fade_ms: self.page.fade_ms,
            easing: Easing::from_name(&self.page.easing),
            scroll_behavior: if self.page.smooth_scroll {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Instant
            },
        }
    }

    pub fn palette(&self) -> PagePalette {
        let fallback = Color::parse(&self.page.default_color).unwrap_or_else(|e| {
            tracing::warn!("{e}; default_color falls back to black");
            Color::BLACK
        });
        PagePalette::new(self.page.palette, fallback, self.page.default_blur_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = r##"
[page]
name = "story"
header_offset = 64.0
margin_pct = 0.4
easing = "linear"

[parallax]
stiffness = 200.0

[[ambient]]
period_ms = 12000.0
scale_max = 1.3

[[scenes]]
id = "intro"
palette = "#0f172a"
payload = { title = "Intro", step = 1 }

[[scenes]]
id = "growth"
palette = "rgb(30, 58, 138)"
"##;

    #[test]
    fn test_parse_full() {
        let c = PageConfig::from_toml_str(STORY).unwrap();
        assert_eq!(c.page.name, "story");
        assert_eq!(c.page.header_offset, 64.0);
        assert_eq!(c.page.fade_ms, DEFAULT_FADE_MS);
        assert_eq!(c.parallax.stiffness, 200.0);
        assert_eq!(c.parallax.mass, DEFAULT_SPRING_MASS);
        assert_eq!(c.ambient.len(), 1);
        assert_eq!(c.ambient[0].scale_max, 1.3);
        assert_eq!(c.ambient[0].scale_min, 1.0);
        assert_eq!(c.scenes.len(), 2);
        assert_eq!(c.scenes[0].payload["title"], "Intro");
        assert!(c.warnings().is_empty());
    }

    #[test]
    fn test_registry_config_mapping() {
        let c = PageConfig::from_toml_str(STORY).unwrap();
        let rc = c.registry_config();
        assert_eq!(rc.margin, RootMargin::symmetric(0.4));
        assert_eq!(rc.easing, Easing::Linear);
        assert_eq!(rc.header_offset, 64.0);
        assert_eq!(rc.scroll_behavior, ScrollBehavior::Smooth);
        assert!(matches!(c.palette(), PagePalette::Hex(_)));
    }

    #[test]
    fn test_instant_scroll_and_backdrop_palette() {
        let c = PageConfig::from_toml_str(
            r##"
[page]
palette = "backdrop"
default_blur_px = 16.0
smooth_scroll = false

[[scenes]]
id = "a"
palette = "#0f172a blur(24px)"

[[scenes]]
id = "b"
palette = "#1e3a8a"
"##,
        )
        .unwrap();
        assert_eq!(c.registry_config().scroll_behavior, ScrollBehavior::Instant);
        assert_eq!(c.palette().kind(), PaletteKind::Backdrop);
        assert!(c.warnings().is_empty());
    }

    #[test]
    fn test_warnings_follow_palette_kind() {
        let toml = "[page]\npalette = \"KIND\"\n\n[[scenes]]\nid = \"a\"\npalette = \"#000|#fff\"\n";
        let hex = PageConfig::from_toml_str(&toml.replace("KIND", "hex")).unwrap();
        assert_eq!(
            hex.warnings(),
            vec![SceneError::InvalidPalette("#000|#fff".into())]
        );
        let gradient = PageConfig::from_toml_str(&toml.replace("KIND", "gradient")).unwrap();
        assert!(gradient.warnings().is_empty());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let c = PageConfig::from_toml_str("[[scenes]]\nid = \"only\"\n").unwrap();
        assert_eq!(c.page.name, "page");
        assert_eq!(c.page.margin_pct, DEFAULT_MARGIN_PCT);
        assert!(c.ambient.is_empty());
        let d = c.descriptors();
        assert_eq!(d[0].order, 0);
        assert!(d[0].payload.is_null());
    }

    #[test]
    fn test_no_scenes_rejected() {
        let err = PageConfig::from_toml_str("[page]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, PageError::InvalidData(_)));
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = PageConfig::from_toml_str("[[scenes]]\nid = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("empty id"));
    }

    #[test]
    fn test_bad_toml_is_toml_error() {
        let err = PageConfig::from_toml_str("[[scenes]\nid=").unwrap_err();
        assert!(matches!(err, PageError::Toml(_)));
    }

    #[test]
    fn test_warnings_duplicates_and_palettes() {
        let c = PageConfig::from_toml_str(
            r##"
[[scenes]]
id = "a"
palette = "#000"

[[scenes]]
id = "a"
palette = "sunset"
"##,
        )
        .unwrap();
        let w = c.warnings();
        assert_eq!(w.len(), 2);
        assert!(w.contains(&SceneError::DuplicateSceneId {
            id: "a".into(),
            first_order: 0
        }));
        assert!(w.contains(&SceneError::InvalidPalette("sunset".into())));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.toml");
        fs::write(&path, STORY).unwrap();
        let c = PageConfig::load(&path).unwrap();
        assert_eq!(c.scenes.len(), 2);

        let missing = PageConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, PageError::Io(_)));
    }
}
