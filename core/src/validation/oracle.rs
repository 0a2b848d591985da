//! Reference solvers
//!
//! Two independent ways of computing the maximum feerate closure, used to
//! cross-check the parametric solver:
//!
//! - [`BruteForceSolver`] enumerates every subset (in parallel) and keeps the
//!   best closure. Exponential, so it refuses clusters above a size limit.
//! - [`FractionalSolver`] runs the plain fractional-programming iteration:
//!   exact cross-product weights and a fresh max-weight-closure every round,
//!   with no flow reuse.

use std::cmp::Ordering;

use log::debug;
use rayon::prelude::*;

use crate::algorithm::graph::min_cut::{max_weight_closure, Capacity};
use crate::algorithm::parametric::ParametricSolver;
use crate::algorithm::traits::{ClosureSolver, SolveError, Solution};
use crate::config::SolverConfig;
use crate::data_structures::{Cluster, ClusterError, FeeRate, ItemSet};

/// Exhaustive search over all `2^N` subsets.
#[derive(Debug, Clone)]
pub struct BruteForceSolver {
    limit: usize,
}

impl BruteForceSolver {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.min(u64::BITS as usize - 1),
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.brute_force_limit)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// `mask` contains the dependencies of each of its members.
fn is_closed(mask: u64, dependencies: &[u64]) -> bool {
    let mut rest = mask;
    while rest != 0 {
        let item = rest.trailing_zeros() as usize;
        if dependencies[item] & !mask != 0 {
            return false;
        }
        rest &= rest - 1;
    }
    true
}

fn rate_of(mask: u64, rates: &[FeeRate]) -> FeeRate {
    let mut total = FeeRate::ZERO;
    let mut rest = mask;
    while rest != 0 {
        total += rates[rest.trailing_zeros() as usize];
        rest &= rest - 1;
    }
    total
}

/// Higher rate wins; among equivalent rates the smaller mask does.
fn better((mask_a, rate_a): (u64, FeeRate), (mask_b, rate_b): (u64, FeeRate)) -> (u64, FeeRate) {
    match rate_a.compare(&rate_b) {
        Ordering::Greater => (mask_a, rate_a),
        Ordering::Less => (mask_b, rate_b),
        Ordering::Equal if mask_a <= mask_b => (mask_a, rate_a),
        Ordering::Equal => (mask_b, rate_b),
    }
}

impl ClosureSolver for BruteForceSolver {
    fn name(&self) -> &'static str {
        "bf"
    }

    fn description(&self) -> &'static str {
        "Exhaustive enumeration of every subset, in parallel; exact but exponential."
    }

    fn solve(&mut self, cluster: &Cluster) -> Result<Solution, SolveError> {
        let items = cluster.len();
        if items > self.limit {
            return Err(SolveError::TooLargeForBruteForce {
                items,
                limit: self.limit,
            });
        }

        let dependencies: Vec<u64> = (0..items)
            .map(|item| cluster.dependencies(item).iter().fold(0u64, |mask, dep| mask | 1 << dep))
            .collect();
        let rates = cluster.rates();

        let (mask, rate) = (1u64..1u64 << items)
            .into_par_iter()
            .filter(|&mask| is_closed(mask, &dependencies))
            .map(|mask| (mask, rate_of(mask, rates)))
            .reduce(|| (0, FeeRate::ZERO), better);

        debug!("brute force over {} items: best {} at {}", items, mask, rate);
        Ok(Solution::new(ItemSet::from_mask(items, mask), rate))
    }
}

/// Fractional-programming solver: fresh max-weight closure per round.
#[derive(Debug, Clone)]
pub struct FractionalSolver {
    config: SolverConfig,
    iterations: usize,
}

impl FractionalSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            iterations: 0,
        }
    }

    /// Rounds taken by the last solve.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl Default for FractionalSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

/// Exact weights `fee_i * S - size_i * F` for target `F/S`.
///
/// For a zero-size target every non-empty item weighs `fee + size`.
pub fn cross_weights(cluster: &Cluster, target: &FeeRate) -> Vec<Capacity> {
    cluster
        .rates()
        .iter()
        .map(|rate| {
            if target.size == 0 {
                rate.fee as Capacity + rate.size as Capacity
            } else {
                rate.cross(target)
            }
        })
        .collect()
}

impl ClosureSolver for FractionalSolver {
    fn name(&self) -> &'static str {
        "fp"
    }

    fn description(&self) -> &'static str {
        "Fractional programming over max-weight closures; recomputes every flow from scratch."
    }

    fn solve(&mut self, cluster: &Cluster) -> Result<Solution, SolveError> {
        if cluster.len() > self.config.max_items {
            return Err(ClusterError::TooManyItems {
                count: cluster.len(),
                max: self.config.max_items,
            }
            .into());
        }

        self.iterations = 0;
        let mut best = ParametricSolver::seed(cluster);
        if cluster.is_empty() {
            return Ok(best);
        }
        // every cross weight and their sum stay within 2 * fee * size of the whole cluster
        let total = cluster.feerate_of(&cluster.full_set());
        (total.fee as Capacity)
            .checked_add(1)
            .and_then(|fee| fee.checked_mul(total.size as Capacity + 1))
            .and_then(|bound| bound.checked_mul(2))
            .ok_or_else(|| SolveError::weight_overflow(cluster))?;

        loop {
            let weights = cross_weights(cluster, &best.rate);
            let closure = max_weight_closure(cluster, &weights, self.config.relabel)?;
            let candidate = Solution::of(cluster, closure);
            self.iterations += 1;
            debug!(
                "fractional round {}: target {} -> {} at {}",
                self.iterations, best.rate, candidate.closure, candidate.rate
            );
            if !candidate.rate.is_better_than(&best.rate) {
                break;
            }
            best = candidate;
        }
        Ok(best)
    }
}
