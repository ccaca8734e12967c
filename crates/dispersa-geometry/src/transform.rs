//! Rigid placement transforms.
//!
//! A [`Transform`] positions a volume in its mother's frame: rotate about
//! the local origin, then translate. Sub-element placements never rotate
//! (spheres are rotation-invariant); envelope placements may.

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// An affine transformation: rotation matrix + translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// 3x3 rotation matrix.
    pub matrix: Matrix3<f64>,
    /// Translation vector (internal units).
    pub translation: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }
}

impl Transform {
    /// Create a pure translation.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::new(dx, dy, dz),
        }
    }

    /// Rotate about x, then y, then z (angles in degrees), then translate.
    pub fn from_rotation_deg(angles: [f64; 3], translation: [f64; 3]) -> Self {
        let [rx, ry, rz] = angles.map(f64::to_radians);
        Self {
            matrix: *Rotation3::from_euler_angles(rx, ry, rz).matrix(),
            translation: Vector3::from(translation),
        }
    }

    /// Apply this transformation to a 3D point.
    pub fn apply(&self, point: &[f64; 3]) -> [f64; 3] {
        let v = Vector3::new(point[0], point[1], point[2]);
        let result = self.matrix * v + self.translation;
        [result.x, result.y, result.z]
    }

    /// Compose two transforms: self followed by other.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            matrix: other.matrix * self.matrix,
            translation: other.matrix * self.translation + other.translation,
        }
    }

    /// Translation as a plain array.
    pub fn offset(&self) -> [f64; 3] {
        [self.translation.x, self.translation.y, self.translation.z]
    }

    pub fn is_rotation_free(&self) -> bool {
        self.matrix == Matrix3::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_transform() {
        let t = Transform::default();
        let p = [1.0, 2.0, 3.0];
        assert_eq!(t.apply(&p), p);
        assert!(t.is_rotation_free());
    }

    #[test]
    fn test_translate_then_rotate() {
        // Local offset inside a mother rotated 90° about z and shifted along x.
        let local = Transform::translation(1.0, 0.0, 0.0);
        let mother = Transform::from_rotation_deg([0.0, 0.0, 90.0], [10.0, 0.0, 0.0]);
        let world = local.then(&mother);
        let p = world.apply(&[0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(p[0], 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], 0.0, epsilon = 1e-12);
        assert!(!world.is_rotation_free());
    }
}
