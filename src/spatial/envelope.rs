//! Rotated envelopes and pivot back-solving

use super::{RotationMatrix, Vector3D};

/// Round to 3 decimal digits
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Size of the axis-aligned box that encloses a box of `size` rotated by
/// `rotation_degrees`
///
/// The box is centered at the origin; its 8 corners are rotated and the
/// component-wise extent of the result is returned, rounded to 3 decimals.
/// `rotate_aabb(size, ZERO) == size` for sizes given to 3 decimals.
pub fn rotate_aabb(size: Vector3D, rotation_degrees: Vector3D) -> Vector3D {
    let rotation = RotationMatrix::from_euler_degrees(rotation_degrees);
    let half = size * 0.5;

    let mut lo = Vector3D::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut hi = Vector3D::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                let corner = Vector3D::new(sx * half.x, sy * half.y, sz * half.z);
                let rotated = rotation.apply(corner);
                lo = lo.min(&rotated);
                hi = hi.max(&rotated);
            }
        }
    }

    (hi - lo).map(round3)
}

/// World position for an asset's pivot so that its geometric center lands
/// on `target_center`
///
/// `local_pivot_offset` is the local-space vector from pivot to center. It is
/// rotated with the same matrix as [`rotate_aabb`] and subtracted from the
/// target, rounded to 3 decimals.
pub fn pivot_for_target_center(
    target_center: Vector3D,
    rotation_degrees: Vector3D,
    local_pivot_offset: Vector3D,
) -> Vector3D {
    let rotation = RotationMatrix::from_euler_degrees(rotation_degrees);
    (target_center - rotation.apply(local_pivot_offset)).map(round3)
}
