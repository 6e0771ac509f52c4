/// Homogeneous transform builders and rotation state
use log::error;
use nalgebra::{Matrix4, Point3, Vector3};

/// Tolerance for every degenerate-input guard in the engine.
///
/// Single precision epsilon, even though the math runs in `f64`: device
/// coordinates come from integer pixels and the guards only need to catch
/// true zeros and float noise around them.
pub const EPSILON: f64 = f32::EPSILON as f64;

/// Rotation about the three coordinate axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for the matrices the view stack is made of
pub struct Transform;

impl Transform {
    pub fn translation(v: &Vector3<f64>) -> Matrix4<f64> {
        Matrix4::new_translation(v)
    }

    pub fn scaling(v: &Vector3<f64>) -> Matrix4<f64> {
        Matrix4::new_nonuniform_scaling(v)
    }

    /// Rotation about X, then Y, then Z, each applied in the frame left by
    /// the previous one (`Rx · Ry · Rz`).
    pub fn rotation(rotation: &RotationState) -> Matrix4<f64> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        rx * ry * rz
    }

    /// Right-handed look-at matrix from `eye` towards `target`.
    ///
    /// Up is +Z, or +Y when the viewing direction is vertical. Coincident
    /// points give the identity so the view simply does not rotate.
    pub fn look_at(eye: &Point3<f64>, target: &Point3<f64>) -> Matrix4<f64> {
        let dir = eye - target;
        let length = dir.norm();

        if length <= EPSILON {
            return Matrix4::identity();
        }

        let horizontal = (dir.x * dir.x + dir.y * dir.y).sqrt();
        let up = if horizontal > EPSILON {
            Vector3::z()
        } else {
            Vector3::y()
        };

        Matrix4::look_at_rh(eye, target, &up)
    }

    /// Inverse of `m`.
    ///
    /// Every matrix on the view stack is invertible as long as callers keep
    /// to the degenerate guards, so a singular matrix here means an
    /// invariant is already broken. Debug builds stop; release builds log
    /// and carry on with the identity.
    pub fn invert(m: &Matrix4<f64>) -> Matrix4<f64> {
        match m.try_inverse() {
            Some(inverse) => inverse,
            None => {
                debug_assert!(false, "singular view transform: {m}");
                error!("singular view transform, substituting identity");
                Matrix4::identity()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_state_is_zero() {
        assert!(RotationState::zero().is_zero());
        assert!(RotationState::default().is_zero());
        assert!(!RotationState::new(0.0, 0.0, 1e-12).is_zero());
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation(&RotationState::zero());
        assert!((matrix - Matrix4::identity()).norm() < 1e-9);
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        let rotation = RotationState::new(0.3, -0.7, 1.1);
        let expected = Matrix4::from_axis_angle(&Vector3::x_axis(), 0.3)
            * Matrix4::from_axis_angle(&Vector3::y_axis(), -0.7)
            * Matrix4::from_axis_angle(&Vector3::z_axis(), 1.1);

        assert!((Transform::rotation(&rotation) - expected).norm() < 1e-9);
    }

    #[test]
    fn test_look_at_coincident_points_is_identity() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform::look_at(&p, &p), Matrix4::identity());
    }

    #[test]
    fn test_look_at_default_view_is_identity() {
        let view = Transform::look_at(&Point3::origin(), &Point3::new(0.0, 0.0, -1.0));
        assert!((view - Matrix4::identity()).norm() < 1e-9);
    }

    #[test]
    fn test_look_at_vertical_direction_is_finite() {
        let view = Transform::look_at(&Point3::new(0.0, 0.0, 10.0), &Point3::origin());
        assert!(view.iter().all(|v| v.is_finite()));

        // the target lands straight ahead on the negative view axis
        let target = view.transform_point(&Point3::origin());
        assert!(target.x.abs() < 1e-9 && target.y.abs() < 1e-9);
        assert!((target.z + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_look_at_up_switch_is_absolute() {
        // a far eye only slightly off the vertical still counts as oblique
        let view = Transform::look_at(&Point3::new(1e-3, 0.0, 1e6), &Point3::origin());
        assert!(view.iter().all(|v| v.is_finite()));
        let up = view.transform_vector(&Vector3::z());
        assert!(up.y > 0.0);
    }

    #[test]
    fn test_look_at_keeps_z_up_for_oblique_views() {
        let view = Transform::look_at(&Point3::new(5.0, -5.0, 2.0), &Point3::origin());
        let up = view.transform_vector(&Vector3::z());

        // world up stays in the upper half of the view plane
        assert!(up.y > 0.0);
        assert!(up.x.abs() < 1e-9);
    }

    #[test]
    fn test_invert_round_trip() {
        let m = Transform::translation(&Vector3::new(1.0, -2.0, 3.0))
            * Transform::scaling(&Vector3::new(2.0, 4.0, 0.5));
        assert!((Transform::invert(&m) * m - Matrix4::identity()).norm() < 1e-9);
    }
}
