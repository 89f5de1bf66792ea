//! Data model shared by the layout stages

use crate::spatial::{rotate_aabb, Vector3D};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An object to be placed: display name plus asset size
///
/// Names are unique within a run; duplicates are suffixed before they get
/// here (see [`crate::assets::prepare_descriptors`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub name: String,
    pub size: Vector3D,
}

impl ObjectDescriptor {
    pub fn new(name: impl Into<String>, size: Vector3D) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Stable identity of a placed object within one run
///
/// Assigned from the object's position in the input order, so two objects
/// that happen to share a display name are still told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A center/rotation pair as returned by the placement oracle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub center: Vector3D,
    /// Euler angles in degrees
    pub rotation: Vector3D,
}

impl Placement {
    pub fn new(center: Vector3D, rotation: Vector3D) -> Self {
        Self { center, rotation }
    }

    /// Reason this placement can't be used, if any
    pub fn defect(&self) -> Option<String> {
        if !self.center.is_finite() {
            return Some(format!("center {:?} is not finite", self.center.to_array()));
        }
        if !self.rotation.is_finite() {
            return Some(format!(
                "rotation {:?} is not finite",
                self.rotation.to_array()
            ));
        }
        None
    }
}

/// An object with a decided placement
///
/// `size_after_rotation` is derived from `size` and `rotation` and is only
/// ever written through [`PlacedObject::apply`], which keeps it in sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedObject {
    #[serde(skip)]
    id: ObjectId,
    name: String,
    size: Vector3D,
    center: Vector3D,
    rotation: Vector3D,
    size_after_rotation: Vector3D,
}

impl PlacedObject {
    /// Create a placed object, computing its rotated envelope
    pub fn new(id: ObjectId, descriptor: &ObjectDescriptor, placement: Placement) -> Self {
        Self {
            id,
            name: descriptor.name.clone(),
            size: descriptor.size,
            center: placement.center,
            rotation: placement.rotation,
            size_after_rotation: rotate_aabb(descriptor.size, placement.rotation),
        }
    }

    /// Overwrite center and rotation, recomputing the envelope
    pub fn apply(&mut self, placement: Placement) {
        self.center = placement.center;
        self.rotation = placement.rotation;
        self.size_after_rotation = rotate_aabb(self.size, placement.rotation);
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Vector3D {
        self.size
    }

    pub fn center(&self) -> Vector3D {
        self.center
    }

    pub fn rotation(&self) -> Vector3D {
        self.rotation
    }

    pub fn size_after_rotation(&self) -> Vector3D {
        self.size_after_rotation
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.center, self.rotation)
    }
}
