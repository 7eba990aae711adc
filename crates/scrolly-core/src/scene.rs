use serde::{Deserialize, Serialize};

/// One semantic section of a long scrolling page.
///
/// The engine never interprets `palette` or `payload`: palette tokens are
/// handed to the page's [`Palette`](crate::interpolate::Palette) and payloads
/// are passed back to the host untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub id: String,
    /// Position in the page's scene list. Assigned by the registry.
    #[serde(default)]
    pub order: usize,
    #[serde(default)]
    pub palette: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl SceneDescriptor {
    pub fn new(id: &str, palette: &str) -> Self {
        Self {
            id: id.to_string(),
            order: 0,
            palette: palette.to_string(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Whether an observation latches after its first hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Latches true after the first hit and detaches. Entrance animations.
    Once,
    /// Flips between in view and out of view. Active-scene tracking.
    #[default]
    Continuous,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Continuous => "continuous",
        }
    }
}
