//! Page-level palette selection. A page picks one palette kind in its
//! config; every scene token is read through that kind.

use std::fmt;

use serde::{Deserialize, Serialize};

use scrolly_core::{
    Backdrop, BackdropPalette, Color, Gradient, GradientPalette, HexPalette, Interpolate, Palette,
    SceneDescriptor, SceneError,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    /// One CSS colour per scene.
    #[default]
    Hex,
    /// `|`-separated colour stops.
    Gradient,
    /// `<colour> blur(<px>)`.
    Backdrop,
}

impl PaletteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Gradient => "gradient",
            Self::Backdrop => "backdrop",
        }
    }

    /// Parse a scene token the way this kind will read it at mount time.
    pub fn check(&self, token: &str) -> Result<(), SceneError> {
        match self {
            Self::Hex => Color::parse(token).map(|_| ()),
            Self::Gradient => Gradient::parse(token).map(|_| ()),
            Self::Backdrop => Backdrop::parse(token, 0.0).map(|_| ()),
        }
    }
}

/// The palette a mounted page reads its scene tokens through.
#[derive(Clone, Debug)]
pub enum PagePalette {
    Hex(HexPalette),
    Gradient(GradientPalette),
    Backdrop(BackdropPalette),
}

impl PagePalette {
    pub fn new(kind: PaletteKind, fallback: Color, default_blur_px: f64) -> Self {
        match kind {
            PaletteKind::Hex => Self::Hex(HexPalette::new(fallback)),
            PaletteKind::Gradient => Self::Gradient(GradientPalette { fallback }),
            PaletteKind::Backdrop => {
                Self::Backdrop(BackdropPalette::new(Backdrop::new(fallback, default_blur_px)))
            }
        }
    }

    pub fn kind(&self) -> PaletteKind {
        match self {
            Self::Hex(_) => PaletteKind::Hex,
            Self::Gradient(_) => PaletteKind::Gradient,
            Self::Backdrop(_) => PaletteKind::Backdrop,
        }
    }
}

impl Palette for PagePalette {
    type Token = PageToken;

    fn token(&self, scene: &SceneDescriptor) -> PageToken {
        match self {
            Self::Hex(p) => PageToken::Color(p.token(scene)),
            Self::Gradient(p) => PageToken::Gradient(p.token(scene)),
            Self::Backdrop(p) => PageToken::Backdrop(p.token(scene)),
        }
    }
}

/// A resolved scene token of whichever kind the page uses.
#[derive(Clone, Debug, PartialEq)]
pub enum PageToken {
    Color(Color),
    Gradient(Gradient),
    Backdrop(Backdrop),
}

impl Interpolate for PageToken {
    /// Tokens of one kind blend; mismatched kinds cut over at the end of the
    /// fade.
    fn lerp(&self, other: &Self, t: f64) -> Self {
        match (self, other) {
            (Self::Color(a), Self::Color(b)) => Self::Color(a.lerp(b, t)),
            (Self::Gradient(a), Self::Gradient(b)) => Self::Gradient(a.lerp(b, t)),
            (Self::Backdrop(a), Self::Backdrop(b)) => Self::Backdrop(a.lerp(b, t)),
            _ if t >= 1.0 => other.clone(),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(c) => write!(f, "{c}"),
            Self::Gradient(g) => write!(f, "{g}"),
            Self::Backdrop(b) => write!(f, "{b}"),
        }
    }
}
