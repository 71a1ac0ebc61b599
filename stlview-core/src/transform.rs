/// Object orientation as Euler rotations
use nalgebra::{Matrix4, Vector3};

/// Euler angles in radians, applied in X, Y, Z order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Orientation used by the top-down viewer: the part is laid flat with a
    /// fixed -90° turn about X, then turned by `alpha_deg` about its own Z.
    pub fn top_down(alpha_deg: f32) -> Self {
        Self::new(
            -std::f32::consts::FRAC_PI_2,
            0.0,
            -alpha_deg.to_radians(),
        )
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for object rotations
pub struct Transform;

impl Transform {
    /// Rotation matrix for intrinsic X-then-Y-then-Z Euler angles
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        rx * ry * rz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_euler_order_is_x_then_y_then_z() {
        let rotation = RotationState::new(0.3, -0.7, 1.1);
        let expected = Matrix4::new_rotation(Vector3::x() * 0.3)
            * Matrix4::new_rotation(Vector3::y() * -0.7)
            * Matrix4::new_rotation(Vector3::z() * 1.1);
        assert!((Transform::rotation_matrix(&rotation) - expected).norm() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(&RotationState::zero());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_top_down_lays_z_up_along_y() {
        // A point on the part's +Z axis ends up pointing at the camera (+Y).
        let matrix = Transform::rotation_matrix(&RotationState::top_down(0.0));
        let p = matrix.transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_top_down_alpha_turns_about_vertical() {
        let matrix = Transform::rotation_matrix(&RotationState::top_down(90.0));
        let p = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        // -90° about local Z sends +X to -Y locally, which the X turn maps to +Z.
        assert!((p - Point3::new(0.0, 0.0, 1.0)).norm() < 1e-5);
    }
}
