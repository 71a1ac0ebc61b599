/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Projection parameters for either camera kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Box frustum; `frustum_size` is the visible height and stays fixed
    /// across resizes while the horizontal bounds follow the aspect ratio.
    Orthographic {
        frustum_size: f32,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
    },
    Perspective {
        /// Vertical field of view in degrees
        fov: f32,
        aspect: f32,
    },
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub near: f32,
    pub far: f32,
    /// Magnification applied to orthographic bounds
    pub zoom: f32,
    pub projection: Projection,
}

/// Width over height, tolerating a collapsed container
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Project a point through `mvp` onto a `width` x `height` raster.
///
/// Returns raster coordinates and NDC depth, or `None` when the point is
/// behind the camera or outside the near/far range. Points beyond the left,
/// right, top, or bottom edges are returned as is, for per-pixel clipping.
pub fn project_point(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * point.to_homogeneous();
    if clip.w <= 1e-6 {
        return None;
    }

    let ndc = clip.xyz() / clip.w;
    if !(-1.0..=1.0).contains(&ndc.z) {
        return None;
    }

    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;
    Some((screen_x, screen_y, ndc.z))
}

impl Camera {
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            near,
            far,
            zoom: 1.0,
            projection: Projection::Perspective { fov, aspect },
        }
    }

    pub fn orthographic(frustum_size: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            near,
            far,
            zoom: 1.0,
            projection: Projection::Orthographic {
                frustum_size,
                left: 0.0,
                right: 0.0,
                top: 0.0,
                bottom: 0.0,
            },
        };
        camera.set_aspect(aspect);
        camera
    }

    pub fn mode(&self) -> ProjectionMode {
        match self.projection {
            Projection::Orthographic { .. } => ProjectionMode::Orthographic,
            Projection::Perspective { .. } => ProjectionMode::Perspective,
        }
    }

    /// Recompute projection parameters for a new aspect ratio
    pub fn set_aspect(&mut self, new_aspect: f32) {
        match &mut self.projection {
            Projection::Orthographic {
                frustum_size,
                left,
                right,
                top,
                bottom,
            } => {
                *left = -*frustum_size * new_aspect / 2.0;
                *right = *frustum_size * new_aspect / 2.0;
                *top = *frustum_size / 2.0;
                *bottom = -*frustum_size / 2.0;
            }
            Projection::Perspective { aspect, .. } => *aspect = new_aspect,
        }
    }

    /// Container resized to `width` x `height` pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        self.set_aspect(aspect_ratio(width, height));
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            Projection::Perspective { fov, aspect } => {
                Matrix4::new_perspective(aspect, fov.to_radians(), self.near, self.far)
            }
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                ..
            } => {
                let cx = (left + right) / 2.0;
                let cy = (top + bottom) / 2.0;
                let half_w = (right - left) / (2.0 * self.zoom);
                let half_h = (top - bottom) / (2.0 * self.zoom);
                Matrix4::new_orthographic(
                    cx - half_w,
                    cx + half_w,
                    cy - half_h,
                    cy + half_h,
                    self.near,
                    self.far,
                )
            }
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(45.0, aspect_ratio(800, 600), 0.1, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::default();
        assert_eq!(camera.mode(), ProjectionMode::Perspective);
        match camera.projection {
            Projection::Perspective { aspect, .. } => {
                assert!((aspect - 800.0 / 600.0).abs() < 1e-6)
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::default();
        assert!(camera.view_matrix().norm() > 0.0);
    }

    #[test]
    fn test_orthographic_resize_keeps_frustum_height() {
        let mut camera = Camera::orthographic(100.0, 1.0, 0.1, 10.0);
        camera.resize(400, 200);
        match camera.projection {
            Projection::Orthographic {
                frustum_size,
                left,
                right,
                top,
                bottom,
            } => {
                assert_eq!(frustum_size, 100.0);
                assert_eq!((left, right), (-100.0, 100.0));
                assert_eq!((top, bottom), (50.0, -50.0));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_perspective_resize_updates_aspect() {
        let mut camera = Camera::perspective(35.0, 1.0, 0.1, 10.0);
        camera.resize(300, 150);
        assert_eq!(
            camera.projection,
            Projection::Perspective {
                fov: 35.0,
                aspect: 2.0
            }
        );
    }

    #[test]
    fn test_zero_height_does_not_divide_by_zero() {
        assert_eq!(aspect_ratio(640, 0), 640.0);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::default();
        let (x, y, _) = project_point(&camera.view_projection(), &Point3::origin(), 800, 600).unwrap();
        assert!((x - 400.0).abs() < 1e-3);
        assert!((y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_point_behind_camera_is_clipped() {
        let camera = Camera::default();
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(project_point(&camera.view_projection(), &behind, 800, 600).is_none());
    }

    #[test]
    fn test_point_off_to_the_side_is_kept() {
        let camera = Camera::default();
        let (x, _, _) =
            project_point(&camera.view_projection(), &Point3::new(50.0, 0.0, 0.0), 800, 600).unwrap();
        assert!(x > 800.0);
    }
}
