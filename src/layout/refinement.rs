//! Single-sweep correction of colliding placements
//!
//! Objects are visited once, in order. An object whose envelope intersects
//! any other object (in the state current at that moment of the sweep) gets
//! one `update` call and its placement is overwritten. Visited objects are
//! never looked at again, even when a later correction collides with them.

use crate::collision::conflicts_for;
use crate::error::{LayoutError, Result};
use crate::oracle::PlacementOracle;
use crate::types::{ObjectId, PlacedObject};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// One applied correction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correction {
    pub id: ObjectId,
    pub name: String,
    /// Names of the objects it intersected before the correction
    pub conflicts: BTreeSet<String>,
}

/// What a refinement sweep changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefinementReport {
    pub corrections: Vec<Correction>,
}

impl RefinementReport {
    pub fn corrected_count(&self) -> usize {
        self.corrections.len()
    }
}

/// Run the correction sweep over `placed`, mutating it in place
pub async fn refine(
    placed: &mut [PlacedObject],
    scene_context: &str,
    constraints: &str,
    oracle: &dyn PlacementOracle,
    epsilon: f64,
) -> Result<RefinementReport> {
    let names: HashMap<ObjectId, String> = placed
        .iter()
        .map(|p| (p.id(), p.name().to_string()))
        .collect();
    let mut report = RefinementReport::default();

    for index in 0..placed.len() {
        let conflicts = conflicts_for(placed, index, epsilon);
        if conflicts.is_empty() {
            continue;
        }

        let object_name = placed[index].name().to_string();
        let conflicting_names: BTreeSet<String> = conflicts
            .iter()
            .filter_map(|id| names.get(id).cloned())
            .collect();
        debug!("{} intersects {:?}", object_name, conflicting_names);

        let placement = oracle
            .update(
                scene_context,
                &object_name,
                placed,
                constraints,
                &conflicting_names,
            )
            .await
            .map_err(|e| LayoutError::from_oracle(&object_name, e))?;

        if let Some(reason) = placement.defect() {
            return Err(LayoutError::InvalidPlacementResponse {
                object_name,
                reason,
            });
        }

        let object = &mut placed[index];
        object.apply(placement);
        info!(
            "Corrected {} to {:?} rotation {:?}",
            object.name(),
            object.center().to_array(),
            object.rotation().to_array()
        );

        report.corrections.push(Correction {
            id: object.id(),
            name: object_name,
            conflicts: conflicting_names,
        });
    }

    Ok(report)
}
