use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Placement of one primitive draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: Vec3,
    /// Rotations about X, Y and Z in degrees.
    pub rotation_degrees: Vec3,
    pub translation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_degrees: Vec3::ZERO,
            translation: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn new(scale: Vec3, rotation_degrees: Vec3, translation: Vec3) -> Self {
        Self {
            scale,
            rotation_degrees,
            translation,
        }
    }

    /// Unrotated transform.
    pub fn scaled_at(scale: Vec3, translation: Vec3) -> Self {
        Self::new(scale, Vec3::ZERO, translation)
    }

    /// Model matrix `T · Rx · Ry · Rz · S`: scale first, then Z, Y and X
    /// rotations, then translation.
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = self.rotation_degrees;
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_x(rotation.x.to_radians())
            * Mat4::from_rotation_y(rotation.y.to_radians())
            * Mat4::from_rotation_z(rotation.z.to_radians())
            * Mat4::from_scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn scale_then_rotate_then_translate() {
        let transform = Transform::new(
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(0.0, 90.0, 0.0),
            Vec3::new(0.0, 0.0, 5.0),
        );
        let point = transform.model_matrix().transform_point3(Vec3::X);
        // X is stretched to 2, swung onto -Z by the Y rotation, then moved.
        assert!(close(point, Vec3::new(0.0, 0.0, 3.0)), "{point}");
    }

    #[test]
    fn x_rotation_is_applied_after_y() {
        let transform = Transform::new(Vec3::ONE, Vec3::new(90.0, 90.0, 0.0), Vec3::ZERO);
        let point = transform.model_matrix().transform_point3(Vec3::X);
        // Ry maps X to -Z, then Rx maps -Z to +Y.
        assert!(close(point, Vec3::Y), "{point}");

        let swapped = Mat4::from_rotation_y(90f32.to_radians())
            * Mat4::from_rotation_x(90f32.to_radians());
        assert!(!close(swapped.transform_point3(Vec3::X), Vec3::Y));
    }

    #[test]
    fn matches_explicit_product() {
        let transform = Transform::new(
            Vec3::new(3.0, 0.5, 2.0),
            Vec3::new(30.0, -45.0, 10.0),
            Vec3::new(-12.0, 1.0, 4.0),
        );
        let expected = Mat4::from_translation(transform.translation)
            * Mat4::from_rotation_x(30f32.to_radians())
            * Mat4::from_rotation_y((-45f32).to_radians())
            * Mat4::from_rotation_z(10f32.to_radians())
            * Mat4::from_scale(transform.scale);
        assert!(transform.model_matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform::default().model_matrix(), Mat4::IDENTITY);
    }
}
