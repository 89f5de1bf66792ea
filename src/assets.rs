//! Asset metadata and descriptor preparation
//!
//! Each attribute has its own typed accessor; missing optional metadata
//! falls back to a neutral value instead of failing.

use crate::error::{name_mismatch, LayoutError, Result};
use crate::spatial::Vector3D;
use crate::types::ObjectDescriptor;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::warn;

/// One entry of the asset catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    pub name: String,
    /// Bounding box size in the asset's local frame
    pub size: Vector3D,
    /// Local vector from the asset's pivot to its geometric center
    #[serde(default)]
    pub pivot_offset: Option<Vector3D>,
    /// Correction that turns the asset to face +Z
    #[serde(default)]
    pub fixed_rotation: Option<Vector3D>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    assets: Vec<AssetRecord>,
}

/// Resolved asset metadata, keyed by asset id
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    assets: HashMap<String, AssetRecord>,
}

impl AssetCatalog {
    pub fn new(records: impl IntoIterator<Item = AssetRecord>) -> Self {
        Self {
            assets: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Load `{"assets": [...]}` from a JSON file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read asset catalog: {}", path.display()))?;
        let file: CatalogFile = serde_json::from_str(&text)
            .with_context(|| format!("Invalid asset catalog: {}", path.display()))?;
        Ok(Self::new(file.assets))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn record(&self, id: &str) -> Result<&AssetRecord> {
        self.assets
            .get(id)
            .ok_or_else(|| LayoutError::Asset(format!("unknown asset '{}'", id)))
    }

    pub fn display_name(&self, id: &str) -> Result<&str> {
        self.record(id).map(|r| r.name.as_str())
    }

    pub fn size(&self, id: &str) -> Result<Vector3D> {
        self.record(id).map(|r| r.size)
    }

    /// Pivot-to-center offset, zero when the pivot is the center
    pub fn pivot_offset(&self, id: &str) -> Vector3D {
        self.assets
            .get(id)
            .and_then(|r| r.pivot_offset)
            .unwrap_or(Vector3D::ZERO)
    }

    /// Orientation correction, `[0, 0, 0]` when none was recorded
    pub fn fixed_rotation(&self, id: &str) -> Vector3D {
        self.assets
            .get(id)
            .and_then(|r| r.fixed_rotation)
            .unwrap_or(Vector3D::ZERO)
    }
}

/// A descriptor ready for layout, with the asset it came from
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedObject {
    pub descriptor: ObjectDescriptor,
    pub asset_id: String,
}

/// Build layout descriptors for `asset_ids`, keeping their order
///
/// Repeated display names get numbered (`Chair`, `Chair2`, `Chair3`),
/// skipping any number whose name is already in use. When
/// an asset's yaw correction is an odd number of quarter turns its x and z
/// sizes are swapped so the descriptor matches the corrected orientation.
pub fn prepare_descriptors(
    catalog: &AssetCatalog,
    asset_ids: &[String],
) -> Result<Vec<PreparedObject>> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut prepared = Vec::with_capacity(asset_ids.len());

    for asset_id in asset_ids {
        let base_name = catalog.display_name(asset_id)?;
        let mut size = catalog.size(asset_id)?;
        if !size.is_finite() || size.x < 0.0 || size.y < 0.0 || size.z < 0.0 {
            return Err(LayoutError::Asset(format!(
                "asset '{}' has invalid size {:?}",
                asset_id,
                size.to_array()
            )));
        }

        let count = seen.entry(base_name).or_insert(0);
        let name = loop {
            *count += 1;
            let candidate = if *count == 1 {
                base_name.to_string()
            } else {
                format!("{}{}", base_name, count)
            };
            if !emitted.contains(&candidate) {
                break candidate;
            }
        };
        emitted.insert(name.clone());

        let fixed = catalog.fixed_rotation(asset_id);
        if is_odd_quarter_turn(fixed.y) {
            size = Vector3D::new(size.z, size.y, size.x);
        } else if fixed.y % 90.0 != 0.0 {
            warn!(
                "Asset {} has a yaw correction of {} degrees; size left unswapped",
                asset_id, fixed.y
            );
        }

        prepared.push(PreparedObject {
            descriptor: ObjectDescriptor::new(name, size),
            asset_id: asset_id.clone(),
        });
    }

    Ok(prepared)
}

/// Reorder `prepared` to follow `order`, a list of descriptor names
///
/// `order` must name every prepared object exactly once; anything added,
/// dropped or repeated is an [`LayoutError::OrderIntegrity`].
pub fn apply_order(prepared: Vec<PreparedObject>, order: &[String]) -> Result<Vec<PreparedObject>> {
    let expected: Vec<String> = prepared.iter().map(|p| p.descriptor.name.clone()).collect();
    let mut by_name: HashMap<String, PreparedObject> = prepared
        .into_iter()
        .map(|p| (p.descriptor.name.clone(), p))
        .collect();

    let ordered: Option<Vec<PreparedObject>> =
        order.iter().map(|name| by_name.remove(name)).collect();
    match ordered {
        Some(ordered) if by_name.is_empty() => Ok(ordered),
        _ => {
            warn!(
                "Resolved order differs from the object list: {:?}",
                name_mismatch(&expected, order)
            );
            Err(LayoutError::OrderIntegrity {
                expected,
                actual: order.to_vec(),
            })
        }
    }
}

fn is_odd_quarter_turn(degrees: f64) -> bool {
    let turns = degrees / 90.0;
    turns.fract() == 0.0 && (turns as i64).rem_euclid(2) == 1
}
