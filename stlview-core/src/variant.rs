/// The two viewer presets: a fixed top-down orthographic plan view and a
/// perspective turntable
use std::fmt;
use std::str::FromStr;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::controls::OrbitControls;
use crate::projection::{aspect_ratio, Camera};
use crate::transform::RotationState;

pub const NEAR_PLANE: f32 = 0.1;
/// Far plane distance in multiples of the scene's largest extent
pub const FAR_PLANE_FACTOR: f32 = 4.0;
/// Visible height of the top-down view relative to the scene's X extent
pub const TOP_DOWN_FRUSTUM_FACTOR: f32 = 0.35;
pub const TURNTABLE_FOV_DEG: f32 = 35.0;
pub const TURNTABLE_AUTO_ROTATE_SPEED: f32 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKind {
    TopDown,
    #[default]
    Turntable,
}

impl FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-down" | "2d" => Ok(Self::TopDown),
            "turntable" | "3d" => Ok(Self::Turntable),
            other => Err(format!("unknown viewer variant {other:?}")),
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopDown => f.write_str("top-down"),
            Self::Turntable => f.write_str("turntable"),
        }
    }
}

/// Camera, controls, and model orientation preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerVariant {
    /// Orthographic camera looking down -Y, zoom only. Every model is laid
    /// flat and turned by `alpha_deg` about the vertical axis.
    TopDown { alpha_deg: f32 },
    /// Perspective camera slowly orbiting the scene
    Turntable,
}

impl ViewerVariant {
    pub fn new(kind: VariantKind, alpha_deg: f32) -> Self {
        match kind {
            VariantKind::TopDown => Self::TopDown { alpha_deg },
            VariantKind::Turntable => Self::Turntable,
        }
    }

    pub fn kind(&self) -> VariantKind {
        match self {
            Self::TopDown { .. } => VariantKind::TopDown,
            Self::Turntable => VariantKind::Turntable,
        }
    }

    pub fn alpha_deg(&self) -> f32 {
        match self {
            Self::TopDown { alpha_deg } => *alpha_deg,
            Self::Turntable => 0.0,
        }
    }

    /// Object rotation given to every mesh and its edge overlay
    pub fn model_rotation(&self) -> RotationState {
        match self {
            Self::TopDown { alpha_deg } => RotationState::top_down(*alpha_deg),
            Self::Turntable => RotationState::zero(),
        }
    }

    /// Frame a camera on a scene whose aggregate box is `bounds`, for a
    /// container of `width` x `height` pixels.
    pub fn frame(&self, bounds: &BoundingBox, width: u32, height: u32) -> (Camera, OrbitControls) {
        let aspect = aspect_ratio(width, height);
        let size = bounds.size();
        // An empty or flat scene would collapse the frustum.
        let max_extent = if bounds.max_extent() > 0.0 {
            bounds.max_extent()
        } else {
            1.0
        };
        let far = max_extent * FAR_PLANE_FACTOR;

        match self {
            Self::TopDown { .. } => {
                let frustum_size = if size.x > 0.0 {
                    size.x * TOP_DOWN_FRUSTUM_FACTOR
                } else {
                    max_extent * TOP_DOWN_FRUSTUM_FACTOR
                };
                let mut camera = Camera::orthographic(frustum_size, aspect, NEAR_PLANE, far);
                camera.position = Point3::new(0.0, max_extent * 1.2, 0.0);
                camera.target = Point3::origin();
                camera.up = -Vector3::z();

                (camera, OrbitControls::top_down())
            }
            Self::Turntable => {
                let mut camera = Camera::perspective(TURNTABLE_FOV_DEG, aspect, NEAR_PLANE, far);
                camera.position = Point3::new(
                    -max_extent * 0.5,
                    max_extent * 0.5,
                    max_extent * 1.2,
                );
                camera.target = Point3::origin();

                (camera, OrbitControls::turntable(TURNTABLE_AUTO_ROTATE_SPEED))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{Projection, ProjectionMode};

    fn scenario_bounds() -> BoundingBox {
        BoundingBox::from_corners(Point3::new(-5.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0))
    }

    #[test]
    fn test_top_down_framing() {
        let variant = ViewerVariant::TopDown { alpha_deg: 4.0 };
        let (camera, controls) = variant.frame(&scenario_bounds(), 200, 100);

        assert_eq!(camera.mode(), ProjectionMode::Orthographic);
        assert!((camera.position - Point3::new(0.0, 18.0, 0.0)).norm() < 1e-5);
        assert_eq!(camera.far, 60.0);
        match camera.projection {
            Projection::Orthographic {
                frustum_size,
                left,
                top,
                ..
            } => {
                assert!((frustum_size - 5.25).abs() < 1e-5);
                assert!((left + 5.25).abs() < 1e-5);
                assert!((top - 2.625).abs() < 1e-5);
            }
            _ => unreachable!(),
        }
        assert!(!controls.enable_rotate);
        assert!(controls.enable_zoom);
        assert!(!controls.auto_rotate);
    }

    #[test]
    fn test_turntable_framing() {
        let (camera, controls) = ViewerVariant::Turntable.frame(&scenario_bounds(), 100, 100);

        assert_eq!(camera.mode(), ProjectionMode::Perspective);
        assert!((camera.position - Point3::new(-7.5, 7.5, 18.0)).norm() < 1e-5);
        assert_eq!(camera.target, Point3::origin());
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 60.0);
        assert_eq!(
            camera.projection,
            Projection::Perspective {
                fov: 35.0,
                aspect: 1.0
            }
        );
        assert!(controls.auto_rotate);
        assert_eq!(controls.auto_rotate_speed, -0.5);
    }

    #[test]
    fn test_framed_controls_drive_their_camera() {
        let variant = ViewerVariant::TopDown { alpha_deg: 0.0 };
        let (mut camera, mut controls) = variant.frame(&scenario_bounds(), 100, 100);
        let start = camera.position;
        controls.rotate_by_pixels(120.0, 40.0, 100);
        controls.update(&mut camera);
        assert_eq!(camera.position, start);

        let (mut camera, mut controls) = ViewerVariant::Turntable.frame(&scenario_bounds(), 100, 100);
        let start = camera.position;
        controls.update(&mut camera);
        assert!((camera.position - start).norm() > 1e-4);
        assert!(((camera.position.coords.norm()) - start.coords.norm()).abs() < 1e-3);
    }

    #[test]
    fn test_empty_scene_still_frames() {
        let (camera, _) = ViewerVariant::TopDown { alpha_deg: 0.0 }.frame(&BoundingBox::empty(), 10, 10);
        assert!(camera.far > camera.near);
        assert!(camera.projection_matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_model_rotation_per_variant() {
        assert_eq!(ViewerVariant::Turntable.model_rotation(), RotationState::zero());
        let r = ViewerVariant::TopDown { alpha_deg: 180.0 }.model_rotation();
        assert!((r.x + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((r.z + std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_variant_kind_parsing() {
        assert_eq!("top-down".parse::<VariantKind>(), Ok(VariantKind::TopDown));
        assert_eq!("3d".parse::<VariantKind>(), Ok(VariantKind::Turntable));
        assert!("sideways".parse::<VariantKind>().is_err());
        assert_eq!(VariantKind::TopDown.to_string(), "top-down");
    }
}
