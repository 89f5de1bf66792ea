//! Error types for layout runs

use std::collections::BTreeSet;

/// Errors that abort a layout run
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Placement oracle failed for '{object_name}': {cause}")]
    OracleFailure {
        object_name: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("Invalid placement for '{object_name}': {reason}")]
    InvalidPlacementResponse { object_name: String, reason: String },

    #[error("Placed objects {actual:?} do not match requested order {expected:?}")]
    OrderIntegrity {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Constraint generation or ordering failed before placement started
    #[error("Scene planning failed at {step}: {cause}")]
    Planning {
        step: &'static str,
        #[source]
        cause: OracleError,
    },

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LayoutError {
    /// Attach the object name to an oracle error
    pub fn from_oracle(object_name: &str, err: OracleError) -> Self {
        let object_name = object_name.to_string();
        match err {
            OracleError::Transport(cause) => Self::OracleFailure { object_name, cause },
            OracleError::Unparseable(msg) => Self::OracleFailure {
                object_name,
                cause: anyhow::anyhow!("unparseable response: {}", msg),
            },
            OracleError::InvalidPlacement(reason) => {
                Self::InvalidPlacementResponse { object_name, reason }
            }
        }
    }
}

/// Errors returned by [`crate::oracle::PlacementOracle`] implementations
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The call itself failed (connection, HTTP status, missing script entry)
    #[error("transport error: {0}")]
    Transport(#[from] anyhow::Error),

    /// The reply was not JSON at all
    #[error("unparseable response: {0}")]
    Unparseable(String),

    /// JSON without a usable center/rotation
    #[error("invalid placement: {0}")]
    InvalidPlacement(String),
}

/// Names that differ between two orderings, for error messages
pub(crate) fn name_mismatch(expected: &[String], actual: &[String]) -> BTreeSet<String> {
    let expected: BTreeSet<_> = expected.iter().cloned().collect();
    let actual: BTreeSet<_> = actual.iter().cloned().collect();
    expected.symmetric_difference(&actual).cloned().collect()
}

pub type Result<T> = std::result::Result<T, LayoutError>;
