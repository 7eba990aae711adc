use std::fmt;

#[derive(Debug)]
pub enum PageError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    InvalidData(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::Io(e) => write!(f, "I/O error: {e}"),
            PageError::Toml(e) => write!(f, "config error: {e}"),
            PageError::Json(e) => write!(f, "trace error: {e}"),
            PageError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageError::Io(e) => Some(e),
            PageError::Toml(e) => Some(e),
            PageError::Json(e) => Some(e),
            PageError::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for PageError {
    fn from(e: std::io::Error) -> Self {
        PageError::Io(e)
    }
}

impl From<toml::de::Error> for PageError {
    fn from(e: toml::de::Error) -> Self {
        PageError::Toml(e)
    }
}

impl From<serde_json::Error> for PageError {
    fn from(e: serde_json::Error) -> Self {
        PageError::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, PageError>;
