//! Oracle-driven 3D scene layout
//!
//! Objects are placed one at a time by a [`PlacementOracle`], then a single
//! refinement sweep asks the oracle to move anything that collides.

pub mod assets;
pub mod cli;
pub mod collision;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod oracle;
pub mod spatial;
pub mod test_utils;
pub mod types;

pub use error::{LayoutError, OracleError, Result};
pub use layout::{LayoutEngine, LayoutOutcome};
pub use oracle::PlacementOracle;
pub use spatial::Vector3D;
pub use types::{ObjectDescriptor, ObjectId, PlacedObject, Placement};
