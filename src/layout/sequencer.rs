//! One-by-one placement of an ordered object list

use crate::error::{name_mismatch, LayoutError, Result};
use crate::oracle::PlacementOracle;
use crate::types::{ObjectDescriptor, ObjectId, PlacedObject};
use tracing::{debug, info, warn};

/// Place `descriptors` in the given order, one oracle call each
///
/// Every call sees all earlier placements with their rotated envelopes
/// already computed. The input order is a precondition and is never
/// changed; the output has exactly one object per descriptor, in order.
pub async fn sequence(
    descriptors: &[ObjectDescriptor],
    scene_context: &str,
    constraints: &str,
    oracle: &dyn PlacementOracle,
) -> Result<Vec<PlacedObject>> {
    let mut placed: Vec<PlacedObject> = Vec::with_capacity(descriptors.len());

    for (index, descriptor) in descriptors.iter().enumerate() {
        let placement = oracle
            .place(
                scene_context,
                &descriptor.name,
                descriptor.size,
                &placed,
                constraints,
            )
            .await
            .map_err(|e| LayoutError::from_oracle(&descriptor.name, e))?;

        if let Some(reason) = placement.defect() {
            return Err(LayoutError::InvalidPlacementResponse {
                object_name: descriptor.name.clone(),
                reason,
            });
        }

        let object = PlacedObject::new(ObjectId(index), descriptor, placement);
        info!(
            "Placed {} at {:?} rotation {:?}",
            object.name(),
            object.center().to_array(),
            object.rotation().to_array()
        );
        debug!(
            "{} envelope {:?}",
            object.name(),
            object.size_after_rotation().to_array()
        );
        placed.push(object);
    }

    verify_order(descriptors, &placed)?;
    Ok(placed)
}

/// Check that `placed` matches `descriptors` one-to-one, in order
pub fn verify_order(descriptors: &[ObjectDescriptor], placed: &[PlacedObject]) -> Result<()> {
    let expected: Vec<String> = descriptors.iter().map(|d| d.name.clone()).collect();
    let actual: Vec<String> = placed.iter().map(|p| p.name().to_string()).collect();

    if expected != actual {
        warn!(
            "Order mismatch, differing names: {:?}",
            name_mismatch(&expected, &actual)
        );
        return Err(LayoutError::OrderIntegrity { expected, actual });
    }
    Ok(())
}
