//! 3D vector used for sizes, centers and Euler rotations

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A vector in 3D space
///
/// Serialized as a plain `[x, y, z]` array, which is the shape the oracle
/// and the renderer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    /// Zero vector
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new 3D vector
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Components as an array, in x/y/z order
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Component-wise minimum
    pub fn min(&self, other: &Vector3D) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum
    pub fn max(&self, other: &Vector3D) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Apply `f` to every component
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z))
    }

    /// True when no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Swap the Y and Z components (Y-up to Z-up axes and back)
    pub fn swap_yz(self) -> Self {
        Self::new(self.x, self.z, self.y)
    }
}

impl From<[f64; 3]> for Vector3D {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector3D> for [f64; 3] {
    fn from(v: Vector3D) -> Self {
        v.to_array()
    }
}

impl Add for Vector3D {
    type Output = Vector3D;

    fn add(self, rhs: Self) -> Self::Output {
        Vector3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3D {
    type Output = Vector3D;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3D {
    type Output = Vector3D;

    fn mul(self, rhs: f64) -> Self::Output {
        Vector3D::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3D {
    type Output = Vector3D;

    fn neg(self) -> Self::Output {
        Vector3D::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_array() {
        let v = Vector3D::new(1.0, 2.5, -3.0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[1.0,2.5,-3.0]");

        let back: Vector3D = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_rejects_wrong_arity() {
        assert!(serde_json::from_str::<Vector3D>("[1.0, 2.0]").is_err());
        assert!(serde_json::from_str::<Vector3D>("[1.0, 2.0, 3.0, 4.0]").is_err());
    }

    #[test]
    fn test_min_max() {
        let a = Vector3D::new(1.0, -2.0, 3.0);
        let b = Vector3D::new(-1.0, 2.0, 0.0);
        assert_eq!(a.min(&b), Vector3D::new(-1.0, -2.0, 0.0));
        assert_eq!(a.max(&b), Vector3D::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_is_finite() {
        assert!(Vector3D::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Vector3D::new(f64::NAN, 2.0, 3.0).is_finite());
        assert!(!Vector3D::new(1.0, f64::INFINITY, 3.0).is_finite());
    }

    #[test]
    fn test_swap_yz() {
        let v = Vector3D::new(1.0, 2.0, 3.0);
        assert_eq!(v.swap_yz(), Vector3D::new(1.0, 3.0, 2.0));
    }
}
