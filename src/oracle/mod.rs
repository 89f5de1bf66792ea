//! Placement oracle: the external service that decides where objects go
//!
//! The layout engine treats the oracle as a black box and only relies on
//! the shape of its reply. Implementations:
//! - [`ModelOracle`] asks a language model through a [`ModelProvider`]
//! - [`ScriptedOracle`] replays fixed placements, for tests and offline runs
//!
//! The [`planning`] module holds the model-backed steps that run before
//! placement: constraint generation and ordering.

pub mod factory;
pub mod llm;
pub mod model;
pub mod planning;
pub mod providers;
pub mod scripted;

use crate::error::OracleError;
use crate::spatial::Vector3D;
use crate::types::{PlacedObject, Placement};
use async_trait::async_trait;
use std::collections::BTreeSet;

pub use factory::create_oracle;
pub use llm::ModelOracle;
pub use model::{GenerationConfig, ModelProvider, ModelResponse, ProviderKind};
pub use planning::{ConstraintGenerator, OrderResolver};
pub use scripted::ScriptedOracle;

/// Decision service consulted once per object during sequencing and once
/// per conflicting object during refinement
///
/// Calls are issued strictly one after another; each sees the placements
/// produced by the calls before it.
#[async_trait]
pub trait PlacementOracle: Send + Sync {
    /// Decide center and rotation for a new object
    async fn place(
        &self,
        scene_context: &str,
        object_name: &str,
        object_size: Vector3D,
        placed_so_far: &[PlacedObject],
        constraints: &str,
    ) -> Result<Placement, OracleError>;

    /// Decide a replacement center and rotation for an object that
    /// intersects `conflicting_names`
    async fn update(
        &self,
        scene_context: &str,
        object_name: &str,
        placed_so_far: &[PlacedObject],
        constraints: &str,
        conflicting_names: &BTreeSet<String>,
    ) -> Result<Placement, OracleError>;
}
