//! Euler rotation matrices

use super::Vector3D;
use std::ops::Mul;

/// A 3x3 rotation matrix stored row-major
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix {
    rows: [[f64; 3]; 3],
}

impl RotationMatrix {
    /// Identity matrix (no rotation)
    pub const IDENTITY: Self = Self {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Rotation about the X axis
    pub fn about_x(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            rows: [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]],
        }
    }

    /// Rotation about the Y axis
    ///
    /// A positive angle turns +Z towards +X.
    pub fn about_y(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            rows: [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]],
        }
    }

    /// Rotation about the Z axis
    pub fn about_z(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            rows: [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Combined rotation `Ry · Rx · Rz` from Euler angles in degrees
    pub fn from_euler_degrees(rotation: Vector3D) -> Self {
        let rx = Self::about_x(rotation.x.to_radians());
        let ry = Self::about_y(rotation.y.to_radians());
        let rz = Self::about_z(rotation.z.to_radians());
        ry * rx * rz
    }

    /// Rotate a vector by this matrix
    pub fn apply(&self, v: Vector3D) -> Vector3D {
        let [r0, r1, r2] = self.rows;
        Vector3D::new(
            r0[0] * v.x + r0[1] * v.y + r0[2] * v.z,
            r1[0] * v.x + r1[1] * v.y + r1[2] * v.z,
            r2[0] * v.x + r2[1] * v.y + r2[2] * v.z,
        )
    }
}

impl Mul for RotationMatrix {
    type Output = RotationMatrix;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        RotationMatrix { rows }
    }
}
