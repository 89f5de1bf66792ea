//! Oracle Factory
//!
//! Builds the placement oracle and planning steps named by the configuration.

use crate::config::ModelConfig;
use crate::oracle::model::{GenerationConfig, ModelProvider, ProviderKind};
use crate::oracle::providers::MockProvider;
use crate::oracle::llm::PLACEMENT_SYSTEM_MESSAGE;
use crate::oracle::{
    ConstraintGenerator, ModelOracle, OrderResolver, PlacementOracle, ScriptedOracle,
};
use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Create a placement oracle from configuration
///
/// `"replay"` loads a [`ScriptedOracle`] from `replay_file`; any other value
/// names a model provider wrapped in a [`ModelOracle`].
pub fn create_oracle(config: &ModelConfig) -> Result<Arc<dyn PlacementOracle>> {
    if config.provider.eq_ignore_ascii_case("replay") {
        let path = config
            .replay_file
            .as_ref()
            .ok_or_else(|| anyhow!("provider \"replay\" requires model.replay_file"))?;
        return Ok(Arc::new(ScriptedOracle::from_file(path)?));
    }

    let provider = create_provider(config, Some(PLACEMENT_SYSTEM_MESSAGE))?;
    let generation = GenerationConfig {
        temperature: Some(config.temperature),
        json_mode: true,
        ..Default::default()
    };
    Ok(Arc::new(
        ModelOracle::new(provider).with_generation_config(generation),
    ))
}

/// Constraint generation and ordering backed by the configured model
pub struct Planner {
    pub constraints: ConstraintGenerator,
    pub order: OrderResolver,
}

/// Create the planning steps, or `None` when the provider can't write them
///
/// `"replay"` and `"mock"` only answer placements, so runs using them take
/// constraints and order from their inputs.
pub fn create_planner(config: &ModelConfig) -> Result<Option<Planner>> {
    if config.provider.eq_ignore_ascii_case("replay") {
        return Ok(None);
    }
    let provider = create_provider(config, None)?;
    if provider.kind() == ProviderKind::Mock {
        return Ok(None);
    }

    let temperature = Some(config.temperature);
    Ok(Some(Planner {
        constraints: ConstraintGenerator::new(provider.clone()).with_generation_config(
            GenerationConfig {
                temperature,
                ..Default::default()
            },
        ),
        order: OrderResolver::new(provider).with_generation_config(GenerationConfig {
            temperature,
            json_mode: true,
            ..Default::default()
        }),
    }))
}

/// Create a model provider from configuration
pub fn create_provider(
    config: &ModelConfig,
    system_message: Option<&str>,
) -> Result<Arc<dyn ModelProvider>> {
    let provider_kind = ProviderKind::from_str(&config.provider)
        .ok_or_else(|| anyhow!("Unknown provider: {}", config.provider))?;

    match provider_kind {
        ProviderKind::Mock => {
            let mut provider = MockProvider::default();
            if let Some(ref model_name) = config.model_name {
                provider = provider.with_model_name(model_name.clone());
            }
            if let Some(message) = system_message {
                provider = provider.with_system_message(message);
            }
            Ok(Arc::new(provider))
        }

        #[cfg(feature = "ollama")]
        ProviderKind::Ollama => {
            use crate::oracle::providers::OllamaProvider;

            let mut provider = match config.base_url {
                Some(ref url) => OllamaProvider::with_base_url(url.clone()),
                None => OllamaProvider::new(),
            };
            if let Some(ref model_name) = config.model_name {
                provider = provider.with_model(model_name.clone());
            }
            if let Some(message) = system_message {
                provider = provider.with_system_message(message);
            }
            Ok(Arc::new(provider))
        }
    }
}
