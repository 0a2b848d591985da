//! Core solver trait definitions
//!
//! Every way of finding a maximum feerate closure, the parametric solver and
//! the oracles that check it, sits behind [`ClosureSolver`], so callers and
//! tests can swap them freely.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_structures::{Cluster, ClusterError, FeeRate, ItemSet};

use super::graph::min_cut::FlowError;

/// Comprehensive error types for solver operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("invalid cluster: {0}")]
    Cluster(#[from] ClusterError),

    #[error("flow engine: {0}")]
    Flow(#[from] FlowError),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("brute force refuses {items} items (limit {limit})")]
    TooLargeForBruteForce { items: usize, limit: usize },

    #[error("weights for total fee {fee} and size {size} exceed the capacity range")]
    WeightOverflow { fee: u64, size: u64 },
}

impl SolveError {
    pub(crate) fn weight_overflow(cluster: &Cluster) -> Self {
        let total = cluster.feerate_of(&cluster.full_set());
        SolveError::WeightOverflow {
            fee: total.fee,
            size: total.size,
        }
    }
}

/// A closure together with its aggregate rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub closure: ItemSet,
    pub rate: FeeRate,
}

impl Solution {
    pub fn new(closure: ItemSet, rate: FeeRate) -> Self {
        Self { closure, rate }
    }

    /// Solution built from `closure`, with its rate recomputed.
    pub fn of(cluster: &Cluster, closure: ItemSet) -> Self {
        let rate = cluster.feerate_of(&closure);
        Self { closure, rate }
    }

    /// The empty closure of `cluster`.
    pub fn empty(cluster: &Cluster) -> Self {
        Self {
            closure: cluster.empty_set(),
            rate: FeeRate::ZERO,
        }
    }
}

/// Maximum feerate closure solver
///
/// # Invariants
/// - The returned closure is closed under dependency.
/// - Its rate is the recomputed rate of the returned set.
/// - No closure of the cluster has a strictly higher rate.
pub trait ClosureSolver: Debug {
    /// Short identifier, e.g. `"ggt"`
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn solve(&mut self, cluster: &Cluster) -> Result<Solution, SolveError>;
}
