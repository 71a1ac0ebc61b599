/// The fixed light rig shared by both viewer variants
use nalgebra::Vector3;

use crate::material::{Color, MaterialPreset, Shading};

/// Sky/ground gradient light, lit from +Y
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub hemisphere: HemisphereLight,
    pub ambient: AmbientLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            hemisphere: HemisphereLight {
                sky: Color::from_hex(0xffffff),
                ground: Color::from_hex(0x222222),
                intensity: 0.8,
            },
            ambient: AmbientLight {
                color: Color::from_hex(0x404040),
                intensity: 1.0,
            },
        }
    }
}

impl Lighting {
    /// Irradiance arriving at a surface with world-space `normal`
    pub fn irradiance(&self, normal: &Vector3<f32>) -> Color {
        let weight = 0.5 * normal.y + 0.5;
        let h = &self.hemisphere;
        let a = &self.ambient;
        let mix = |sky: f32, ground: f32, ambient: f32| {
            (ground + (sky - ground) * weight) * h.intensity + ambient * a.intensity
        };
        Color::new(
            mix(h.sky.r, h.ground.r, a.color.r),
            mix(h.sky.g, h.ground.g, a.color.g),
            mix(h.sky.b, h.ground.b, a.color.b),
        )
    }

    /// Final color of a surface point, before alpha blending.
    ///
    /// The rig has no directional light, so Phong surfaces only differ from
    /// basic ones through the diffuse term; the WebGL shader mirrors this.
    pub fn shade(&self, material: &MaterialPreset, normal: &Vector3<f32>) -> Color {
        match material.shading {
            Shading::Basic => material.color,
            Shading::Phong => {
                let light = self.irradiance(normal);
                Color::new(
                    (material.color.r * light.r).min(1.0),
                    (material.color.g * light.g).min(1.0),
                    (material.color.b * light.b).min(1.0),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::RenderStyle;

    #[test]
    fn test_upward_faces_are_brighter() {
        let lighting = Lighting::default();
        let up = lighting.irradiance(&Vector3::y()).luminance();
        let down = lighting.irradiance(&-Vector3::y()).luminance();
        assert!(up > down);
        assert!((up - (0.8 + 64.0 / 255.0)).abs() < 1e-4);
    }

    #[test]
    fn test_basic_material_ignores_lights() {
        let lighting = Lighting::default();
        let color = Color::from_hex(0x336699);
        let wire = MaterialPreset::select(color, RenderStyle::Wireframe).unwrap();
        assert_eq!(lighting.shade(&wire, &-Vector3::y()), color);
    }
}
