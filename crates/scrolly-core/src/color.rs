use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::SceneError;

static RGB_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba?\(\s*([\d.]+)\s*,\s*([\d.]+)\s*,\s*([\d.]+)\s*(?:,\s*([\d.]+)\s*)?\)$")
        .unwrap()
});
static HEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#([0-9a-fA-F]+)$").unwrap());
static BLUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*blur\(\s*([\d.]+)\s*(?:px)?\s*\)$").unwrap());

/// Straight (non-premultiplied) RGBA colour, channels in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }

    /// Parse a CSS colour token: `#rgb`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn parse(token: &str) -> Result<Self, SceneError> {
        let token = token.trim();
        let invalid = || SceneError::InvalidPalette(token.to_string());

        if let Some(caps) = HEX.captures(token) {
            let hex = &caps[1];
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| invalid());
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return match hex.len() {
                3 => Ok(Self::rgba8(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, 255)),
                6 => Ok(Self::rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
                8 => Ok(Self::rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
                _ => Err(invalid()),
            };
        }

        if let Some(caps) = RGB_FN.captures(token) {
            let channel = |i: usize| -> Result<f64, SceneError> {
                let v: f64 = caps[i].parse().map_err(|_| invalid())?;
                Ok((v / 255.0).clamp(0.0, 1.0))
            };
            let a = match caps.get(4) {
                Some(m) => m
                    .as_str()
                    .parse::<f64>()
                    .map_err(|_| invalid())?
                    .clamp(0.0, 1.0),
                None => 1.0,
            };
            return Ok(Self {
                r: channel(1)?,
                g: channel(2)?,
                b: channel(3)?,
                a,
            });
        }

        Err(invalid())
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        if q(self.a) == 255 {
            format!("#{:02x}{:02x}{:02x}", q(self.r), q(self.g), q(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                q(self.r),
                q(self.g),
                q(self.b),
                q(self.a)
            )
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Ordered colour stops, evenly spaced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub stops: Vec<Color>,
}

impl Gradient {
    pub fn new(stops: Vec<Color>) -> Self {
        Self { stops }
    }

    /// Parse stops separated by `|`, e.g. `#0f172a|#1e3a8a`.
    pub fn parse(token: &str) -> Result<Self, SceneError> {
        let stops = token
            .split('|')
            .map(Color::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stops })
    }

    /// Colour at position `t ∈ [0, 1]` along the gradient.
    pub fn at(&self, t: f64) -> Color {
        match self.stops.len() {
            0 => Color::default(),
            1 => self.stops[0],
            n => {
                let scaled = t.clamp(0.0, 1.0) * (n - 1) as f64;
                let i = (scaled.floor() as usize).min(n - 2);
                crate::interpolate::Interpolate::lerp(
                    &self.stops[i],
                    &self.stops[i + 1],
                    scaled - i as f64,
                )
            }
        }
    }
}

/// Same `|`-separated form that [`Gradient::parse`] reads.
impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stop) in self.stops.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{stop}")?;
        }
        Ok(())
    }
}

/// Background colour plus a backdrop blur radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Backdrop {
    pub color: Color,
    pub blur_px: f64,
}

impl Backdrop {
    pub fn new(color: Color, blur_px: f64) -> Self {
        Self {
            color,
            blur_px: blur_px.max(0.0),
        }
    }

    /// Parse `<colour> blur(<px>)`, e.g. `#0f172a blur(24px)`. Without a
    /// `blur(...)` suffix the blur is `default_blur_px`.
    pub fn parse(token: &str, default_blur_px: f64) -> Result<Self, SceneError> {
        let token = token.trim();
        match BLUR.captures(token) {
            Some(caps) => {
                let blur: f64 = caps[2]
                    .parse()
                    .map_err(|_| SceneError::InvalidPalette(token.to_string()))?;
                Ok(Self::new(Color::parse(&caps[1])?, blur))
            }
            None => Ok(Self::new(Color::parse(token)?, default_blur_px)),
        }
    }
}

impl fmt::Display for Backdrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} blur({}px)", self.color, self.blur_px)
    }
}
