//! Output records handed to the renderer
//!
//! Serialization happens only here, at the process boundary; the layout
//! stages pass typed values to each other.

use crate::assets::{AssetCatalog, PreparedObject};
use crate::error::{LayoutError, Result};
use crate::layout::LayoutOutcome;
use crate::spatial::{pivot_for_target_center, round3, Vector3D};
use crate::types::PlacedObject;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Final placement of one object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub name: String,
    pub center: Vector3D,
    /// Euler angles in degrees
    pub rotation: Vector3D,
    pub size: Vector3D,
    pub size_after_rotation: Vector3D,
}

impl From<&PlacedObject> for OutputRecord {
    fn from(object: &PlacedObject) -> Self {
        Self {
            name: object.name().to_string(),
            center: object.center().map(round3),
            rotation: object.rotation().map(round3),
            size: object.size().map(round3),
            size_after_rotation: object.size_after_rotation().map(round3),
        }
    }
}

pub fn output_records(placed: &[PlacedObject]) -> Vec<OutputRecord> {
    placed.iter().map(OutputRecord::from).collect()
}

/// Placement of an asset's pivot in the renderer's Z-up frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRecord {
    pub uid: String,
    pub name: String,
    pub position: Vector3D,
    pub rotation: Vector3D,
    pub pre_rotation: Vector3D,
}

/// Convert placements into renderer records
///
/// The pivot is back-solved from the object's center using the placement
/// rotation plus the asset's fixed correction. Positions and rotations are
/// then moved from the Y-up left-handed layout frame into Z-up axes.
pub fn render_records(
    placed: &[PlacedObject],
    prepared: &[PreparedObject],
    catalog: &AssetCatalog,
) -> Result<Vec<RenderRecord>> {
    let expected: Vec<String> = prepared.iter().map(|p| p.descriptor.name.clone()).collect();
    let actual: Vec<String> = placed.iter().map(|p| p.name().to_string()).collect();
    if expected != actual {
        return Err(LayoutError::OrderIntegrity { expected, actual });
    }

    Ok(placed
        .iter()
        .zip(prepared)
        .map(|(object, source)| {
            let fixed = catalog.fixed_rotation(&source.asset_id);
            let pivot = pivot_for_target_center(
                object.center(),
                object.rotation() + fixed,
                catalog.pivot_offset(&source.asset_id),
            );
            RenderRecord {
                uid: source.asset_id.clone(),
                name: object.name().to_string(),
                position: pivot.swap_yz(),
                rotation: (-object.rotation()).swap_yz().map(round3),
                pre_rotation: fixed,
            }
        })
        .collect())
}

/// Summary written next to the records
#[derive(Debug, Clone, Serialize)]
pub struct LayoutManifest {
    pub generated_at: DateTime<Utc>,
    pub scene: String,
    pub object_count: usize,
    pub refined: bool,
    pub corrected: Vec<String>,
}

impl LayoutManifest {
    pub fn new(scene: &str, outcome: &LayoutOutcome) -> Self {
        Self {
            generated_at: Utc::now(),
            scene: scene.to_string(),
            object_count: outcome.placed.len(),
            refined: outcome.refinement.is_some(),
            corrected: outcome
                .refinement
                .iter()
                .flat_map(|r| r.corrections.iter().map(|c| c.name.clone()))
                .collect(),
        }
    }
}

/// Write `value` as pretty-printed JSON, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
