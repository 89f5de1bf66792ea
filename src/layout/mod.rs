//! Layout pipeline: sequential placement followed by one correction sweep

pub mod refinement;
pub mod sequencer;

use crate::config::LayoutSettings;
use crate::error::Result;
use crate::oracle::PlacementOracle;
use crate::types::{ObjectDescriptor, PlacedObject};
use std::sync::Arc;
use tracing::info;

pub use refinement::{refine, Correction, RefinementReport};
pub use sequencer::{sequence, verify_order};

/// Result of a full layout run
#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    /// Final placements, in input order
    pub placed: Vec<PlacedObject>,
    /// `None` when refinement was skipped
    pub refinement: Option<RefinementReport>,
}

/// Runs sequencing and refinement against one oracle
///
/// Output is reproducible exactly when the oracle is deterministic; a
/// sampling model makes every run different.
pub struct LayoutEngine {
    oracle: Arc<dyn PlacementOracle>,
    settings: LayoutSettings,
}

impl LayoutEngine {
    pub fn new(oracle: Arc<dyn PlacementOracle>, settings: LayoutSettings) -> Self {
        Self { oracle, settings }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Place every descriptor, then correct collisions unless refinement
    /// is disabled
    pub async fn run(
        &self,
        descriptors: &[ObjectDescriptor],
        scene_context: &str,
        constraints: &str,
    ) -> Result<LayoutOutcome> {
        info!("Placing {} objects", descriptors.len());
        let mut placed =
            sequence(descriptors, scene_context, constraints, self.oracle.as_ref()).await?;

        if self.settings.skip_refinement {
            info!("Refinement skipped");
            return Ok(LayoutOutcome {
                placed,
                refinement: None,
            });
        }

        let report = refine(
            &mut placed,
            scene_context,
            constraints,
            self.oracle.as_ref(),
            self.settings.collision_epsilon,
        )
        .await?;
        verify_order(descriptors, &placed)?;
        info!("Refinement corrected {} objects", report.corrected_count());

        Ok(LayoutOutcome {
            placed,
            refinement: Some(report),
        })
    }
}
