use std::fmt;

/// Anomalies the engine absorbs locally.
///
/// None of these ever escape an engine operation: they are logged and the
/// operation degrades to a no-op or a default value.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A scene id was registered twice in the same registry.
    DuplicateSceneId { id: String, first_order: usize },
    /// The region for a scene is zero-sized or no longer in the document.
    DetachedRegion { id: String },
    /// A handle that does not (or no longer) belongs to this registry.
    UnknownHandle(u64),
    /// A palette token that could not be turned into a colour.
    InvalidPalette(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::DuplicateSceneId { id, first_order } => {
                write!(f, "duplicate scene id '{id}' (first registered at {first_order})")
            }
            SceneError::DetachedRegion { id } => write!(f, "region for scene '{id}' is detached"),
            SceneError::UnknownHandle(h) => write!(f, "unknown region handle {h}"),
            SceneError::InvalidPalette(token) => write!(f, "invalid palette token: {token}"),
        }
    }
}

impl std::error::Error for SceneError {}
