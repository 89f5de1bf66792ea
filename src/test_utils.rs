//! Test doubles for the placement oracle

use crate::error::OracleError;
use crate::oracle::PlacementOracle;
use crate::spatial::Vector3D;
use crate::types::{PlacedObject, Placement};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
enum PlaceMode {
    /// Object n goes to x = 10 * n, far from the others
    Stacking,
    Fixed(Placement),
}

#[derive(Debug, Default)]
struct Calls {
    place: Vec<(String, usize)>,
    update: Vec<(String, BTreeSet<String>)>,
}

/// Oracle that records every call it receives
///
/// `place` answers from per-name overrides, then the configured mode.
/// `update` answers from per-name overrides, otherwise it returns the
/// object's current placement unchanged, so conflicts persist.
#[derive(Debug)]
pub struct RecordingOracle {
    mode: PlaceMode,
    place_overrides: HashMap<String, Placement>,
    update_overrides: HashMap<String, Placement>,
    failing: Option<String>,
    calls: Mutex<Calls>,
}

impl RecordingOracle {
    fn with_mode(mode: PlaceMode) -> Self {
        Self {
            mode,
            place_overrides: HashMap::new(),
            update_overrides: HashMap::new(),
            failing: None,
            calls: Mutex::new(Calls::default()),
        }
    }

    /// Place objects along +X, ten units apart
    pub fn stacking() -> Self {
        Self::with_mode(PlaceMode::Stacking)
    }

    /// Place every object at the same spot
    pub fn fixed(placement: Placement) -> Self {
        Self::with_mode(PlaceMode::Fixed(placement))
    }

    pub fn with_place(mut self, name: &str, placement: Placement) -> Self {
        self.place_overrides.insert(name.to_string(), placement);
        self
    }

    pub fn with_update(mut self, name: &str, placement: Placement) -> Self {
        self.update_overrides.insert(name.to_string(), placement);
        self
    }

    /// Fail with a transport error whenever `name` is requested
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing = Some(name.to_string());
        self
    }

    pub fn place_calls(&self) -> usize {
        self.calls.lock().map(|c| c.place.len()).unwrap_or(0)
    }

    pub fn update_calls(&self) -> usize {
        self.calls.lock().map(|c| c.update.len()).unwrap_or(0)
    }

    /// Number of already-placed objects each `place` call saw
    pub fn context_sizes(&self) -> Vec<usize> {
        self.calls
            .lock()
            .map(|c| c.place.iter().map(|(_, n)| *n).collect())
            .unwrap_or_default()
    }

    /// Object names and conflict sets of every `update` call, in order
    pub fn update_requests(&self) -> Vec<(String, BTreeSet<String>)> {
        self.calls
            .lock()
            .map(|c| c.update.clone())
            .unwrap_or_default()
    }

    fn check_failure(&self, object_name: &str) -> Result<(), OracleError> {
        match &self.failing {
            Some(name) if name == object_name => Err(OracleError::Transport(anyhow!(
                "simulated outage for '{}'",
                object_name
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PlacementOracle for RecordingOracle {
    async fn place(
        &self,
        _scene_context: &str,
        object_name: &str,
        _object_size: Vector3D,
        placed_so_far: &[PlacedObject],
        _constraints: &str,
    ) -> Result<Placement, OracleError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls
                .place
                .push((object_name.to_string(), placed_so_far.len()));
        }
        self.check_failure(object_name)?;

        if let Some(placement) = self.place_overrides.get(object_name) {
            return Ok(*placement);
        }
        Ok(match self.mode {
            PlaceMode::Stacking => Placement::new(
                Vector3D::new(10.0 * placed_so_far.len() as f64, 0.0, 0.0),
                Vector3D::ZERO,
            ),
            PlaceMode::Fixed(placement) => placement,
        })
    }

    async fn update(
        &self,
        _scene_context: &str,
        object_name: &str,
        placed_so_far: &[PlacedObject],
        _constraints: &str,
        conflicting_names: &BTreeSet<String>,
    ) -> Result<Placement, OracleError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls
                .update
                .push((object_name.to_string(), conflicting_names.clone()));
        }
        self.check_failure(object_name)?;

        if let Some(placement) = self.update_overrides.get(object_name) {
            return Ok(*placement);
        }
        placed_so_far
            .iter()
            .find(|p| p.name() == object_name)
            .map(PlacedObject::placement)
            .ok_or_else(|| OracleError::InvalidPlacement(format!("unknown object '{}'", object_name)))
    }
}
