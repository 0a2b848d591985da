//! Independent answer checking
//!
//! A [`Claim`] is what a solver printed: a fee/size pair and a list of item
//! indices. [`validate`] accepts it only if it is as good as the reference
//! optimum, names real items, adds up to the claimed fee and size, and is
//! closed under dependency.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::parametric::ParametricSolver;
use crate::algorithm::traits::{ClosureSolver, SolveError};
use crate::config::SolverConfig;
use crate::data_structures::{Cluster, FeeRate, ItemSet};

use super::oracle::BruteForceSolver;

/// A solution as reported by some solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub rate: FeeRate,
    pub indices: Vec<usize>,
}

/// Reasons a claim is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("claimed rate {claimed} is below the optimum {optimal}")]
    Suboptimal { claimed: FeeRate, optimal: FeeRate },

    #[error("index {index} out of range for {items} items")]
    IndexOutOfRange { index: usize, items: usize },

    #[error("claimed {claimed} but the listed items add up to {actual}")]
    RateMismatch { claimed: FeeRate, actual: FeeRate },

    #[error("item {item} is claimed without its dependency {dependency}")]
    NotAClosure { item: usize, dependency: usize },

    #[error("reference solver failed: {0}")]
    Reference(#[from] SolveError),
}

/// Exhaustive search when the cluster is small enough, otherwise the
/// parametric solver.
pub fn reference_solver(cluster: &Cluster, config: &SolverConfig) -> Box<dyn ClosureSolver> {
    if cluster.len() <= config.brute_force_limit {
        Box::new(BruteForceSolver::from_config(config))
    } else {
        Box::new(ParametricSolver::new(config.clone()))
    }
}

pub fn validate(cluster: &Cluster, claim: &Claim, reference: &mut dyn ClosureSolver) -> Result<(), Rejection> {
    let optimal = reference.solve(cluster)?;
    if claim.rate.compare(&optimal.rate).is_lt() {
        return Err(Rejection::Suboptimal {
            claimed: claim.rate,
            optimal: optimal.rate,
        });
    }

    let items = cluster.len();
    if let Some(&index) = claim.indices.iter().find(|&&index| index >= items) {
        return Err(Rejection::IndexOutOfRange { index, items });
    }
    let claimed = ItemSet::from_indices(items, claim.indices.iter().copied());

    let actual = cluster.feerate_of(&claimed);
    if actual != claim.rate {
        return Err(Rejection::RateMismatch {
            claimed: claim.rate,
            actual,
        });
    }

    if !cluster.is_closure(&claimed) {
        let (item, dependency) = claimed
            .iter()
            .flat_map(|item| cluster.dependencies(item).iter().map(move |dep| (item, dep)))
            .find(|&(_, dep)| !claimed.contains(dep))
            .unwrap_or_default();
        return Err(Rejection::NotAClosure { item, dependency });
    }
    Ok(())
}
