/// Orbit-style camera controls: rotate, zoom, and pan around a target
use nalgebra::{Point3, Vector3};

use crate::projection::{Camera, Projection};

const PHI_EPS: f32 = 1e-6;

/// Accumulates pointer input between frames and applies it to a camera in
/// [`OrbitControls::update`], once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub auto_rotate: bool,
    /// 2.0 is one orbit every 30 seconds at 60 frames per second; negative
    /// values orbit clockwise when seen from above
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Point3::origin(),
            enable_zoom: true,
            enable_rotate: true,
            enable_pan: true,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_zoom: 0.0,
            max_zoom: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zeros(),
        }
    }
}

impl OrbitControls {
    /// Zoom only; the camera keeps looking straight down
    pub fn top_down() -> Self {
        Self {
            enable_rotate: false,
            ..Self::default()
        }
    }

    /// Free orbit that also spins on its own at `auto_rotate_speed`
    pub fn turntable(auto_rotate_speed: f32) -> Self {
        Self {
            auto_rotate: true,
            auto_rotate_speed,
            ..Self::default()
        }
    }

    /// Angle added per frame while auto-rotating
    pub fn auto_rotation_angle(&self) -> f32 {
        2.0 * std::f32::consts::PI / 60.0 / 60.0 * self.auto_rotate_speed
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    /// Pointer dragged by `dx`/`dy` pixels over an element `height` tall
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, height: u32) {
        if !self.enable_rotate {
            return;
        }
        let h = height.max(1) as f32;
        self.theta_delta -= 2.0 * std::f32::consts::PI * dx / h * self.rotate_speed;
        self.phi_delta -= 2.0 * std::f32::consts::PI * dy / h * self.rotate_speed;
    }

    /// Mouse wheel moved; negative `delta_y` zooms in
    pub fn zoom_by_wheel(&mut self, delta_y: f32) {
        if !self.enable_zoom || delta_y == 0.0 {
            return;
        }
        if delta_y < 0.0 {
            self.scale *= self.zoom_scale();
        } else {
            self.scale /= self.zoom_scale();
        }
    }

    /// Pointer dragged with the pan button over a `width` x `height` element
    pub fn pan_by_pixels(&mut self, camera: &Camera, dx: f32, dy: f32, width: u32, height: u32) {
        if !self.enable_pan {
            return;
        }
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let (left_dist, up_dist) = match camera.projection {
            Projection::Perspective { fov, .. } => {
                let distance =
                    (camera.position - self.target).norm() * (fov.to_radians() / 2.0).tan();
                (2.0 * dx * distance / h, 2.0 * dy * distance / h)
            }
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                ..
            } => (
                dx * (right - left) / camera.zoom / w,
                dy * (top - bottom) / camera.zoom / h,
            ),
        };

        let forward = (self.target - camera.position).normalize();
        let right = forward.cross(&camera.up).normalize();
        let up = right.cross(&forward);
        self.pan_offset += -right * left_dist + up * up_dist;
    }

    /// Apply pending input and auto-rotation to `camera`
    pub fn update(&mut self, camera: &mut Camera) {
        if self.auto_rotate {
            self.theta_delta -= self.auto_rotation_angle();
        }

        let mut offset = camera.position - self.target;

        if self.theta_delta != 0.0 || self.phi_delta != 0.0 {
            let radius = offset.norm();
            if radius > 0.0 {
                let theta = offset.x.atan2(offset.z) + self.theta_delta;
                let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + self.phi_delta)
                    .clamp(PHI_EPS, std::f32::consts::PI - PHI_EPS);
                offset = Vector3::new(
                    radius * phi.sin() * theta.sin(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.cos(),
                );
            }
        }

        match camera.projection {
            Projection::Perspective { .. } => offset *= self.scale,
            Projection::Orthographic { .. } => {
                camera.zoom = (camera.zoom / self.scale).clamp(self.min_zoom, self.max_zoom);
            }
        }

        self.target += self.pan_offset;
        camera.position = self.target + offset;
        camera.target = self.target;

        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vector3::zeros();
    }
}
