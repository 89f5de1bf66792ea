//! Replay oracle answering from a fixed script of placements

use crate::error::OracleError;
use crate::oracle::PlacementOracle;
use crate::spatial::Vector3D;
use crate::types::{PlacedObject, Placement};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Placements keyed by object name
///
/// ```json
/// {
///   "place":  { "Table": { "center": [0, 0.5, 0], "rotation": [0, 0, 0] } },
///   "update": { "Cup":   { "center": [0, 1.0, 0], "rotation": [0, 0, 0] } }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementScript {
    #[serde(default)]
    pub place: BTreeMap<String, Placement>,
    #[serde(default)]
    pub update: BTreeMap<String, Placement>,
}

/// Deterministic oracle: the same name always gets the same answer
#[derive(Debug, Clone, Default)]
pub struct ScriptedOracle {
    script: PlacementScript,
}

impl ScriptedOracle {
    pub fn new(script: PlacementScript) -> Self {
        Self { script }
    }

    /// Load a script from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read placement script: {}", path.display()))?;
        let script: PlacementScript = serde_json::from_str(&text)
            .with_context(|| format!("Invalid placement script: {}", path.display()))?;
        Ok(Self::new(script))
    }

    pub fn with_place(mut self, name: impl Into<String>, placement: Placement) -> Self {
        self.script.place.insert(name.into(), placement);
        self
    }

    pub fn with_update(mut self, name: impl Into<String>, placement: Placement) -> Self {
        self.script.update.insert(name.into(), placement);
        self
    }
}

#[async_trait]
impl PlacementOracle for ScriptedOracle {
    async fn place(
        &self,
        _scene_context: &str,
        object_name: &str,
        _object_size: Vector3D,
        _placed_so_far: &[PlacedObject],
        _constraints: &str,
    ) -> Result<Placement, OracleError> {
        self.script
            .place
            .get(object_name)
            .copied()
            .ok_or_else(|| OracleError::Transport(anyhow!("no scripted placement for '{}'", object_name)))
    }

    async fn update(
        &self,
        _scene_context: &str,
        object_name: &str,
        _placed_so_far: &[PlacedObject],
        _constraints: &str,
        _conflicting_names: &BTreeSet<String>,
    ) -> Result<Placement, OracleError> {
        self.script
            .update
            .get(object_name)
            .copied()
            .ok_or_else(|| OracleError::Transport(anyhow!("no scripted update for '{}'", object_name)))
    }
}
