//! Spatial primitives for scene layout
//!
//! Uses the left-handed coordinate system of the placement oracle:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-), the floor is at Y = 0
//! - Z: Forward (+) / Backward (-), zero rotation faces +Z
//!
//! Rotations are Euler angles in degrees, composed as `Ry · Rx · Rz`
//! (Z applied first, then X, then Y). Every function here uses the same
//! composition through [`RotationMatrix::from_euler_degrees`].

mod envelope;
mod rotation;
mod vector3d;

pub use envelope::{pivot_for_target_center, rotate_aabb, round3};
pub use rotation::RotationMatrix;
pub use vector3d::Vector3D;
