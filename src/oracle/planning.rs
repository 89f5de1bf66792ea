//! Scene planning steps that run before placement
//!
//! [`ConstraintGenerator`] turns a scene description into placement
//! constraints; [`OrderResolver`] sorts the objects so that supports come
//! before the things resting on them.

use crate::assets::{apply_order, PreparedObject};
use crate::error::{LayoutError, OracleError};
use crate::oracle::model::{GenerationConfig, ModelProvider};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

const CONSTRAINT_INSTRUCTIONS: &str = "\
You are given a scene description and the list of objects in that scene.
Write positional and rotational constraints for the objects. Start with the constraints the
scene description already states, then add what is missing so the scene makes sense: what each
object stands on, whether it is against a wall, and whether it needs space around it.
Give at least one constraint per object, e.g. \"The lamp stands on the desk.\" or
\"The bed is against the north wall.\"
Only mention objects from the list. Do not use absolute measurements.
Never contradict the scene description. Output only the constraints.";

const ORDER_INSTRUCTIONS: &str = "\
You are given placement constraints and the list of objects in a scene.
Sort the list so that placing the objects one at a time is easiest: if the cup is on the
table, the table comes before the cup.
Never add or remove objects and keep every name exactly as given.
Answer with a JSON array of the object names.";

/// Writes placement constraints for a scene
pub struct ConstraintGenerator {
    provider: Arc<dyn ModelProvider>,
    generation: GenerationConfig,
}

impl ConstraintGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub async fn generate(
        &self,
        scene_context: &str,
        object_names: &[String],
    ) -> Result<String, OracleError> {
        let prompt = format!(
            "{CONSTRAINT_INSTRUCTIONS}\n\n\
             Scene description: {scene_context}\n\
             Objects: {objects}",
            objects = serde_json::to_string(object_names).unwrap_or_default(),
        );
        let response = self
            .provider
            .generate(&prompt, &self.generation)
            .await
            .map_err(OracleError::Transport)?;

        let constraints = response.content.trim();
        if constraints.is_empty() {
            return Err(OracleError::Unparseable("empty constraint list".to_string()));
        }
        debug!("Generated constraints:\n{}", constraints);
        Ok(constraints.to_string())
    }
}

/// Decides the order objects are placed in
pub struct OrderResolver {
    provider: Arc<dyn ModelProvider>,
    generation: GenerationConfig,
}

impl OrderResolver {
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

    /// Ask for a placement order of `object_names`
    ///
    /// The reply is returned as given; use [`OrderResolver::arrange`] to
    /// have it checked against the object list.
    pub async fn resolve(
        &self,
        constraints: &str,
        object_names: &[String],
    ) -> Result<Vec<String>, OracleError> {
        let prompt = format!(
            "{ORDER_INSTRUCTIONS}\n\n\
             Constraints: {constraints}\n\
             Objects: {objects}",
            objects = serde_json::to_string(object_names).unwrap_or_default(),
        );
        let response = self
            .provider
            .generate(&prompt, &self.generation)
            .await
            .map_err(OracleError::Transport)?;
        parse_order(&response.content)
    }

    /// Reorder `prepared` by the model's answer
    ///
    /// Fails with [`LayoutError::OrderIntegrity`] if the answer adds, drops
    /// or repeats an object.
    pub async fn arrange(
        &self,
        constraints: &str,
        prepared: Vec<PreparedObject>,
    ) -> crate::error::Result<Vec<PreparedObject>> {
        let names: Vec<String> = prepared.iter().map(|p| p.descriptor.name.clone()).collect();
        let order = self
            .resolve(constraints, &names)
            .await
            .map_err(|cause| LayoutError::Planning {
                step: "ordering",
                cause,
            })?;
        let ordered = apply_order(prepared, &order)?;
        info!("Placement order: {}", order.join(", "));
        Ok(ordered)
    }
}

/// Parse a JSON array of names out of a model reply
pub fn parse_order(content: &str) -> Result<Vec<String>, OracleError> {
    let fenced = Regex::new(r"(?s)```(?:json)?\s*(\[.*?\])\s*```")
        .ok()
        .and_then(|re| re.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let json = match fenced {
        Some(json) => json,
        None => match (content.find('['), content.rfind(']')) {
            (Some(start), Some(end)) if start < end => &content[start..=end],
            _ => content.trim(),
        },
    };

    serde_json::from_str(json).map_err(|e| OracleError::Unparseable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::providers::MockProvider;
    use crate::spatial::Vector3D;
    use crate::types::ObjectDescriptor;

    fn prepared(names: &[&str]) -> Vec<PreparedObject> {
        names
            .iter()
            .map(|name| PreparedObject {
                descriptor: ObjectDescriptor::new(*name, Vector3D::new(1.0, 1.0, 1.0)),
                asset_id: name.to_lowercase(),
            })
            .collect()
    }

    #[test]
    fn test_parse_order_forms() {
        assert_eq!(parse_order(r#"["Table", "Cup"]"#).unwrap(), vec!["Table", "Cup"]);
        assert_eq!(
            parse_order("Order:\n```json\n[\"Desk\", \"Lamp\"]\n```").unwrap(),
            vec!["Desk", "Lamp"]
        );
        assert!(matches!(
            parse_order("Table first, then the cup"),
            Err(OracleError::Unparseable(_))
        ));
        assert!(parse_order("[1, 2]").is_err());
    }

    #[tokio::test]
    async fn test_constraints_prompt_and_reply() {
        let provider = Arc::new(MockProvider::new("  The cup is on the table.\n"));
        let generator = ConstraintGenerator::new(provider.clone());
        let names = vec!["Table".to_string(), "Cup".to_string()];

        let constraints = generator.generate("A kitchen", &names).await.unwrap();

        assert_eq!(constraints, "The cup is on the table.");
        let prompts = provider.prompts();
        assert!(prompts[0].contains("A kitchen"));
        assert!(prompts[0].contains(r#"["Table","Cup"]"#));
    }

    #[tokio::test]
    async fn test_empty_constraints_rejected() {
        let generator = ConstraintGenerator::new(Arc::new(MockProvider::new("   ")));
        let err = generator.generate("A kitchen", &[]).await.unwrap_err();
        assert!(matches!(err, OracleError::Unparseable(_)));
    }

    #[tokio::test]
    async fn test_arrange_follows_reply() {
        let provider = Arc::new(MockProvider::new(r#"["Table", "Cup"]"#));
        let resolver = OrderResolver::new(provider.clone());

        let ordered = resolver
            .arrange("The cup is on the table.", prepared(&["Cup", "Table"]))
            .await
            .unwrap();

        let names: Vec<&str> = ordered.iter().map(|p| p.descriptor.name.as_str()).collect();
        assert_eq!(names, vec!["Table", "Cup"]);
        assert!(provider.prompts()[0].contains("The cup is on the table."));
    }

    #[tokio::test]
    async fn test_arrange_rejects_dropped_object() {
        let resolver = OrderResolver::new(Arc::new(MockProvider::new(r#"["Table"]"#)));

        let err = resolver
            .arrange("", prepared(&["Cup", "Table"]))
            .await
            .unwrap_err();

        match err {
            LayoutError::OrderIntegrity { expected, actual } => {
                assert_eq!(expected, vec!["Cup", "Table"]);
                assert_eq!(actual, vec!["Table"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_arrange_rejects_invented_object() {
        let resolver =
            OrderResolver::new(Arc::new(MockProvider::new(r#"["Table", "Cup", "Saucer"]"#)));

        let err = resolver
            .arrange("", prepared(&["Cup", "Table"]))
            .await
            .unwrap_err();
        assert!(matches!(err, LayoutError::OrderIntegrity { .. }));
    }

    #[tokio::test]
    async fn test_arrange_unparseable_reply() {
        let resolver = OrderResolver::new(Arc::new(MockProvider::new("Table, then Cup")));

        let err = resolver
            .arrange("", prepared(&["Cup", "Table"]))
            .await
            .unwrap_err();
        assert!(matches!(err, LayoutError::Planning { step: "ordering", .. }));
    }
}
