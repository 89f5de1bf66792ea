//! Placement oracle backed by a language model
//!
//! Renders each request as a prompt, sends it through a [`ModelProvider`]
//! and reads a `{"center": [x, y, z], "rotation": [x, y, z]}` object back.

use crate::error::OracleError;
use crate::oracle::model::{GenerationConfig, ModelProvider};
use crate::oracle::PlacementOracle;
use crate::spatial::Vector3D;
use crate::types::{PlacedObject, Placement};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// System message for providers that answer placement requests
pub const PLACEMENT_SYSTEM_MESSAGE: &str = "\
You are an expert in 3D object placement. Given a scene description and the objects already \
placed, you decide the position and rotation of one new object at a time. The task takes \
careful spatial reasoning and some arithmetic.";

const COORDINATE_RULES: &str = "\
Coordinate system: left-handed. +X is right, +Y is up, +Z is forward.
An object with rotation [0, 0, 0] faces +Z. Rotations are Euler angles [x, y, z] in degrees.
A positive rotation around Y turns an object from +Z towards +X.
The floor is at Y = 0 and the room is centered at X = Z = 0.
Centers are the geometric center of the object's bounding box.
Each placed object lists its size and its size_after_rotation, the axis-aligned
extent of the box after its rotation is applied.
Scene description takes priority over constraints when they disagree.
Answer with a single JSON object: {\"center\": [x, y, z], \"rotation\": [x, y, z]}.";

/// Oracle that asks a model for placements
///
/// Every prompt carries the coordinate rules. The provider is expected to
/// hold [`PLACEMENT_SYSTEM_MESSAGE`]; [`crate::oracle::create_oracle`] sets it.
pub struct ModelOracle {
    provider: Arc<dyn ModelProvider>,
    generation: GenerationConfig,
}

impl ModelOracle {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            generation: GenerationConfig {
                json_mode: true,
                ..Default::default()
            },
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    fn render_place_prompt(
        scene_context: &str,
        object_name: &str,
        object_size: Vector3D,
        placed_so_far: &[PlacedObject],
        constraints: &str,
    ) -> String {
        format!(
            "{COORDINATE_RULES}\n\n\
             Scene description: {scene_context}\n\
             Constraints: {constraints}\n\
             Already placed objects: {placed}\n\n\
             Decide the center and rotation of the new object '{object_name}' with size {size:?}.",
            placed = render_placed(placed_so_far),
            size = object_size.to_array(),
        )
    }

    fn render_update_prompt(
        scene_context: &str,
        object_name: &str,
        placed_so_far: &[PlacedObject],
        constraints: &str,
        conflicting_names: &BTreeSet<String>,
    ) -> String {
        let conflicts = conflicting_names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{COORDINATE_RULES}\n\n\
             Scene description: {scene_context}\n\
             Constraints: {constraints}\n\
             Placed objects: {placed}\n\n\
             The bounding box of '{object_name}' intersects: {conflicts}.\n\
             Decide whether each intersection makes sense for the scene and give a corrected \
             center and rotation for '{object_name}' only.",
            placed = render_placed(placed_so_far),
        )
    }

    async fn ask(&self, prompt: &str) -> Result<Placement, OracleError> {
        let response = self
            .provider
            .generate(prompt, &self.generation)
            .await
            .map_err(OracleError::Transport)?;
        if let Some(reasoning) = &response.reasoning {
            debug!(model = %response.model, "oracle reasoning: {}", reasoning);
        }
        parse_placement(&response.content)
    }
}

#[async_trait]
impl PlacementOracle for ModelOracle {
    async fn place(
        &self,
        scene_context: &str,
        object_name: &str,
        object_size: Vector3D,
        placed_so_far: &[PlacedObject],
        constraints: &str,
    ) -> Result<Placement, OracleError> {
        let prompt = Self::render_place_prompt(
            scene_context,
            object_name,
            object_size,
            placed_so_far,
            constraints,
        );
        self.ask(&prompt).await
    }

    async fn update(
        &self,
        scene_context: &str,
        object_name: &str,
        placed_so_far: &[PlacedObject],
        constraints: &str,
        conflicting_names: &BTreeSet<String>,
    ) -> Result<Placement, OracleError> {
        let prompt = Self::render_update_prompt(
            scene_context,
            object_name,
            placed_so_far,
            constraints,
            conflicting_names,
        );
        self.ask(&prompt).await
    }
}

fn render_placed(placed: &[PlacedObject]) -> String {
    serde_json::to_string(placed).unwrap_or_else(|_| "[]".to_string())
}

/// Pull the JSON object out of a model reply
///
/// Accepts a bare object, an object inside a Markdown code fence, or an
/// object surrounded by prose.
fn extract_json(content: &str) -> &str {
    let fenced = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```")
        .ok()
        .and_then(|re| re.captures(content))
        .and_then(|caps| caps.get(1));
    if let Some(m) = fenced {
        return m.as_str();
    }

    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content.trim(),
    }
}

/// Parse a model reply into a placement
pub fn parse_placement(content: &str) -> Result<Placement, OracleError> {
    let value: Value = serde_json::from_str(extract_json(content))
        .map_err(|e| OracleError::Unparseable(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| OracleError::InvalidPlacement("expected a JSON object".to_string()))?;

    let center = vector_field(object, "center")?;
    let rotation = vector_field(object, "rotation")?;
    Ok(Placement::new(center, rotation))
}

fn vector_field(object: &Map<String, Value>, key: &str) -> Result<Vector3D, OracleError> {
    let field = object
        .get(key)
        .ok_or_else(|| OracleError::InvalidPlacement(format!("missing `{}`", key)))?;
    let items = field
        .as_array()
        .ok_or_else(|| OracleError::InvalidPlacement(format!("`{}` is not an array", key)))?;
    if items.len() != 3 {
        return Err(OracleError::InvalidPlacement(format!(
            "`{}` has {} components, expected 3",
            key,
            items.len()
        )));
    }

    let mut components = [0.0; 3];
    for (slot, item) in components.iter_mut().zip(items) {
        *slot = item.as_f64().ok_or_else(|| {
            OracleError::InvalidPlacement(format!("`{}` contains non-numeric value {}", key, item))
        })?;
    }
    Ok(components.into())
}
