/// Shading presets selected per model by its render style
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Linear RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Relative luminance, used by the terminal preview
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

impl FromStr for Color {
    type Err = ViewerError;

    /// Parse a CSS hex color, `#rgb` or `#rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ViewerError::InvalidColor(s.to_string());
        let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let hex = match digits.len() {
            6 => u32::from_str_radix(digits, 16).map_err(|_| invalid())?,
            3 => {
                let short = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
                let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                (r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11)
            }
            _ => return Err(invalid()),
        };
        Ok(Self::from_hex(hex))
    }
}

/// How a configured model is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    Shaded,
    Transparent,
    Wireframe,
    Hidden,
}

/// Lighting model of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Lit with a specular highlight
    Phong,
    /// Flat color, unaffected by lights
    Basic,
}

/// A resolved material, ready for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialPreset {
    pub shading: Shading,
    pub color: Color,
    pub specular: f32,
    pub shininess: f32,
    pub transparent: bool,
    pub opacity: f32,
    pub wireframe: bool,
    pub line_width: f32,
}

/// Color of the outline drawn over every visible mesh
pub const EDGE_COLOR: Color = Color::new(85.0 / 255.0, 85.0 / 255.0, 85.0 / 255.0);

impl MaterialPreset {
    /// Select the preset for `style`. Hidden models get no material.
    pub fn select(color: Color, style: RenderStyle) -> Option<Self> {
        let phong = Self {
            shading: Shading::Phong,
            color,
            specular: 1.0,
            shininess: 10.0,
            transparent: false,
            opacity: 1.0,
            wireframe: false,
            line_width: 1.0,
        };

        match style {
            RenderStyle::Shaded => Some(phong),
            RenderStyle::Transparent => Some(Self {
                transparent: true,
                opacity: 0.5,
                ..phong
            }),
            RenderStyle::Wireframe => Some(Self {
                shading: Shading::Basic,
                specular: 0.0,
                shininess: 0.0,
                wireframe: true,
                line_width: 40.0,
                ..phong
            }),
            RenderStyle::Hidden => None,
        }
    }

    /// Material for the edge overlay lines
    pub fn edge_lines() -> Self {
        Self {
            shading: Shading::Basic,
            color: EDGE_COLOR,
            specular: 0.0,
            shininess: 0.0,
            transparent: false,
            opacity: 1.0,
            wireframe: false,
            line_width: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_hex() {
        assert_eq!("#ff0000".parse::<Color>().unwrap(), Color::new(1.0, 0.0, 0.0));
        assert_eq!("#0f0".parse::<Color>().unwrap(), Color::new(0.0, 1.0, 0.0));
        assert_eq!("#A4D3EE".parse::<Color>().unwrap(), Color::from_hex(0xA4D3EE));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["red", "#12", "#gggggg", "A4D3EE", "#+12345"] {
            assert!(bad.parse::<Color>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_selection_is_pure() {
        let color = Color::from_hex(0xA9A9A9);
        for style in [RenderStyle::Shaded, RenderStyle::Transparent, RenderStyle::Wireframe] {
            assert_eq!(
                MaterialPreset::select(color, style),
                MaterialPreset::select(color, style)
            );
        }
    }

    #[test]
    fn test_presets_differ_in_flags() {
        let color = Color::from_hex(0xFFFF00);
        let shaded = MaterialPreset::select(color, RenderStyle::Shaded).unwrap();
        let transparent = MaterialPreset::select(color, RenderStyle::Transparent).unwrap();
        let wireframe = MaterialPreset::select(color, RenderStyle::Wireframe).unwrap();

        assert!(!shaded.transparent && shaded.opacity == 1.0 && !shaded.wireframe);
        assert!(transparent.transparent && transparent.opacity == 0.5 && !transparent.wireframe);
        assert!(wireframe.wireframe && wireframe.shading == Shading::Basic);
        assert_eq!(shaded.shininess, 10.0);
        assert_eq!(wireframe.color, color);
    }

    #[test]
    fn test_hidden_has_no_material() {
        assert_eq!(MaterialPreset::select(Color::from_hex(0), RenderStyle::Hidden), None);
    }

    #[test]
    fn test_unknown_style_is_rejected() {
        assert!(serde_json::from_str::<RenderStyle>("\"glossy\"").is_err());
        assert_eq!(
            serde_json::from_str::<RenderStyle>("\"wireframe\"").unwrap(),
            RenderStyle::Wireframe
        );
    }
}
