//! Axis-aligned overlap tests between placed objects
//!
//! Objects are compared through their rotated envelopes
//! (`size_after_rotation`), never as oriented boxes.

use crate::spatial::Vector3D;
use crate::types::{ObjectId, PlacedObject};
use std::collections::{BTreeMap, BTreeSet};

/// Default tolerance band, in scene units
pub const DEFAULT_EPSILON: f64 = 0.1;

/// True if two axis-aligned boxes overlap by at least `epsilon` on every axis
///
/// Boxes that merely touch, or overlap by less than `epsilon` on some axis,
/// do not count: a frame hung flush against a wall is not a collision.
/// Symmetric in its two boxes.
pub fn boxes_intersect(
    center_a: Vector3D,
    size_a: Vector3D,
    center_b: Vector3D,
    size_b: Vector3D,
    epsilon: f64,
) -> bool {
    let axes = center_a
        .to_array()
        .into_iter()
        .zip(size_a.to_array())
        .zip(center_b.to_array().into_iter().zip(size_b.to_array()));

    for ((ca, sa), (cb, sb)) in axes {
        let (min_a, max_a) = (ca - sa / 2.0, ca + sa / 2.0);
        let (min_b, max_b) = (cb - sb / 2.0, cb + sb / 2.0);
        if max_a < min_b + epsilon || max_b < min_a + epsilon {
            return false;
        }
    }
    true
}

/// True if the envelopes of two placed objects intersect
pub fn objects_intersect(a: &PlacedObject, b: &PlacedObject, epsilon: f64) -> bool {
    boxes_intersect(
        a.center(),
        a.size_after_rotation(),
        b.center(),
        b.size_after_rotation(),
        epsilon,
    )
}

/// Objects in `placed` whose envelopes intersect the object at `index`
///
/// Self-exclusion goes by [`ObjectId`], not by name.
pub fn conflicts_for(placed: &[PlacedObject], index: usize, epsilon: f64) -> BTreeSet<ObjectId> {
    let Some(subject) = placed.get(index) else {
        return BTreeSet::new();
    };

    placed
        .iter()
        .filter(|other| other.id() != subject.id())
        .filter(|other| objects_intersect(subject, other, epsilon))
        .map(PlacedObject::id)
        .collect()
}

/// Conflict sets for every object in `placed`
///
/// Every object has an entry, empty when nothing intersects it. The
/// relation is symmetric.
pub fn find_collisions(
    placed: &[PlacedObject],
    epsilon: f64,
) -> BTreeMap<ObjectId, BTreeSet<ObjectId>> {
    let mut collisions: BTreeMap<ObjectId, BTreeSet<ObjectId>> = placed
        .iter()
        .map(|object| (object.id(), BTreeSet::new()))
        .collect();

    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            if a.id() != b.id() && objects_intersect(a, b, epsilon) {
                collisions.entry(a.id()).or_default().insert(b.id());
                collisions.entry(b.id()).or_default().insert(a.id());
            }
        }
    }

    collisions
}
