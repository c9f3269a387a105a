use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::from_rgb(255, 0, 0);
    pub const GRAY: Color = Color::from_rgb(160, 160, 160);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Srgb> for Color {
    fn from(rgb: Srgb) -> Self {
        let rgb: Srgb<u8> = rgb.into_format();
        Color::from_rgb(rgb.red, rgb.green, rgb.blue)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error returned when a `#rrggbb` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid colour '{}', expected #rrggbb", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let err = || ParseColorError(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        Ok(Color::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Number of hues the subset colour cycle walks through before repeating.
const CYCLE_LEN: usize = 8;

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color::from(rgb)
        })
        .collect()
}

/// The `index`-th colour of the subset colour cycle.
pub fn cycle_color(index: usize) -> Color {
    let palette = generate_palette(CYCLE_LEN);
    palette[index % CYCLE_LEN]
}

// ---------------------------------------------------------------------------
// VisualStyle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Circle,
    Square,
    Plus,
    Cross,
}

/// How a subset is drawn by views. Opaque to the subset logic itself.
///
/// Fields are read freely, but writes on a subset's style go through
/// [`StyleEditor`](crate::subset::StyleEditor) so every change is observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualStyle {
    pub color: Color,
    pub alpha: f32,
    pub line_width: f32,
    pub line_style: LineStyle,
    pub marker: Marker,
    pub marker_size: f32,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            color: Color::RED,
            alpha: 1.0,
            line_width: 1.0,
            line_style: LineStyle::Solid,
            marker: Marker::Circle,
            marker_size: 3.0,
        }
    }
}

impl VisualStyle {
    /// Default style drawn in the given colour.
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}
