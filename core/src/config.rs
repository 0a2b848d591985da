//! Solver configuration
//!
//! Every knob the solvers read lives in [`SolverConfig`]. It deserializes from
//! JSON with every field optional, so a config file only names what it
//! overrides.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on cluster size.
pub const DEFAULT_MAX_ITEMS: usize = 32;

/// Default fixed-point lift applied to target rates.
pub const DEFAULT_SCALE: u64 = 1_000_000;

/// Largest cluster the exhaustive oracle accepts by default.
pub const DEFAULT_BRUTE_FORCE_LIMIT: usize = 20;

/// How a node's distance label is raised when it has excess but no
/// admissible arc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelabelPolicy {
    /// Raise the label by one.
    #[default]
    Increment,
    /// Raise the label to one above the lowest residual neighbour.
    MinNeighbor,
}

impl fmt::Display for RelabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelabelPolicy::Increment => write!(f, "increment"),
            RelabelPolicy::MinNeighbor => write!(f, "min-neighbor"),
        }
    }
}

impl FromStr for RelabelPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "increment" => Ok(RelabelPolicy::Increment),
            "min-neighbor" => Ok(RelabelPolicy::MinNeighbor),
            other => Err(ConfigError::InvalidParameter {
                name: "relabel".to_string(),
                reason: format!("unknown policy '{}'", other),
            }),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Clusters with more items are rejected before solving.
    pub max_items: usize,
    /// Fixed-point lift for weight assignment; must be positive.
    pub scale: u64,
    pub relabel: RelabelPolicy,
    /// Largest cluster the brute-force oracle will enumerate.
    pub brute_force_limit: usize,
    /// Check every candidate for closure and nesting while solving.
    pub check_invariants: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            scale: DEFAULT_SCALE,
            relabel: RelabelPolicy::Increment,
            brute_force_limit: DEFAULT_BRUTE_FORCE_LIMIT,
            check_invariants: true,
        }
    }
}

impl SolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "scale".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.brute_force_limit >= u64::BITS as usize {
            return Err(ConfigError::InvalidParameter {
                name: "brute_force_limit".to_string(),
                reason: format!("must be below {}", u64::BITS),
            });
        }
        Ok(())
    }
}
