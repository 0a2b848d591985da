//! Parametric Maximum Feerate Closure
//!
//! Implements the Gallo-Grigoriadis-Tarjan parametric scheme on top of the
//! push-relabel engine. Starting from a single dependency-free item, every
//! iteration lifts the best rate found so far into node weights, resumes the
//! preflow under the new capacities and reads off the minimal max-weight
//! closure. The loop stops at the first candidate that does not strictly beat
//! the current best.
//!
//! # Nesting
//! Targets only rise, so weights only fall: source capacities grow and sink
//! capacities shrink. The minimal cuts are then nested downwards; every
//! candidate is contained in the one before it. The flow state is never
//! reset, which is where the speed comes from.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::data_structures::{Cluster, ClusterError, ItemSet};

use super::graph::min_cut::{FlowMetrics, MinCutEngine};
use super::traits::{ClosureSolver, SolveError, Solution};
use super::weights::WeightAssignment;

/// Record of the last solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Number of min-cut runs
    pub iterations: usize,
    /// Closure each min-cut run produced, in order
    pub candidates: Vec<Solution>,
    /// Engine counters accumulated over the whole solve
    pub flow: FlowMetrics,
}

/// GGT solver: parametric push-relabel with flow reuse.
#[derive(Debug, Clone)]
pub struct ParametricSolver {
    config: SolverConfig,
    stats: SolveStats,
}

impl ParametricSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            stats: SolveStats::default(),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Starting point: the first item without dependencies, or nothing.
    pub fn seed(cluster: &Cluster) -> Solution {
        match cluster.roots().next() {
            Some(root) => Solution::new(ItemSet::singleton(cluster.len(), root), cluster.rate(root)),
            None => Solution::empty(cluster),
        }
    }

    fn verify(cluster: &Cluster, candidate: &Solution, previous: Option<&ItemSet>) -> Result<(), SolveError> {
        if !cluster.is_closure(&candidate.closure) {
            return Err(SolveError::InvariantViolation(format!(
                "min-cut produced {} which is not a closure",
                candidate.closure
            )));
        }
        if let Some(previous) = previous {
            if !candidate.closure.is_subset(previous) {
                return Err(SolveError::InvariantViolation(format!(
                    "candidate {} is not nested in previous candidate {}",
                    candidate.closure, previous
                )));
            }
        }
        Ok(())
    }
}

impl Default for ParametricSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl ClosureSolver for ParametricSolver {
    fn name(&self) -> &'static str {
        "ggt"
    }

    fn description(&self) -> &'static str {
        "Gallo-Grigoriadis-Tarjan parametric push-relabel; reuses one preflow across a rising sequence of target rates."
    }

    fn solve(&mut self, cluster: &Cluster) -> Result<Solution, SolveError> {
        if cluster.len() > self.config.max_items {
            return Err(ClusterError::TooManyItems {
                count: cluster.len(),
                max: self.config.max_items,
            }
            .into());
        }

        self.stats = SolveStats::default();
        if cluster.is_empty() {
            return Ok(Solution::empty(cluster));
        }

        let assignment = WeightAssignment::for_cluster(cluster, self.config.scale)
            .ok_or_else(|| SolveError::weight_overflow(cluster))?;
        let mut engine = MinCutEngine::for_cluster(cluster, self.config.relabel);
        let mut best = Self::seed(cluster);
        let mut previous: Option<ItemSet> = None;
        trace!("seed {} at {}, scale {}", best.closure, best.rate, assignment.scale());

        loop {
            engine.set_capacities(assignment.capacities(cluster, &best.rate))?;
            let candidate = Solution::of(cluster, engine.min_cut());
            self.stats.iterations += 1;
            debug!(
                "iteration {}: target {} -> candidate {} at {} ({} pushes, {} relabels)",
                self.stats.iterations,
                best.rate,
                candidate.closure,
                candidate.rate,
                engine.metrics().push_operations,
                engine.metrics().relabel_operations
            );

            if self.config.check_invariants {
                Self::verify(cluster, &candidate, previous.as_ref())?;
            }
            self.stats.candidates.push(candidate.clone());

            if !candidate.rate.is_better_than(&best.rate) {
                break;
            }
            previous = Some(candidate.closure.clone());
            best = candidate;
        }

        self.stats.flow = engine.metrics().clone();
        debug!(
            "optimal closure {} at {} after {} iterations",
            best.closure, best.rate, self.stats.iterations
        );
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::min_cut::max_weight_closure;
    use crate::config::RelabelPolicy;
    use crate::data_structures::{ClusterBuilder, FeeRate};

    fn build(items: &[(u64, u64)], edges: &[(usize, usize)]) -> Cluster {
        let mut builder = ClusterBuilder::new(32);
        for &(fee, size) in items {
            builder.item(fee, size);
        }
        for &(child, parent) in edges {
            builder.depends(child, parent);
        }
        builder.build().unwrap()
    }

    fn solve(cluster: &Cluster) -> Solution {
        ParametricSolver::default().solve(cluster).unwrap()
    }

    #[test]
    fn test_lone_high_rate_item_wins() {
        // {2} at 5/1 beats {0,1} at 11/3
        let cluster = build(&[(10, 2), (1, 1), (5, 1)], &[(0, 1)]);
        let solution = solve(&cluster);
        assert_eq!(solution.closure.to_vec(), vec![2]);
        assert_eq!(solution.rate, FeeRate::new(5, 1));
    }

    #[test]
    fn test_dependency_pair_wins() {
        let cluster = build(&[(10, 2), (1, 1), (3, 1)], &[(0, 1)]);
        let solution = solve(&cluster);
        assert_eq!(solution.closure.to_vec(), vec![0, 1]);
        assert_eq!(solution.rate, FeeRate::new(11, 3));
    }

    #[test]
    fn test_diamond_excluded_when_base_too_heavy() {
        // 0 -> {1, 2} -> 3, item 4 stands alone
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3)];
        let cluster = build(&[(1, 1), (1, 1), (1, 1), (0, 5), (2, 1)], &edges);
        let solution = solve(&cluster);
        assert_eq!(solution.closure.to_vec(), vec![4]);
        assert_eq!(solution.rate, FeeRate::new(2, 1));
    }

    #[test]
    fn test_diamond_included_when_it_pays() {
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3)];
        let cluster = build(&[(20, 1), (20, 1), (20, 1), (0, 5), (2, 1)], &edges);
        let solution = solve(&cluster);
        assert_eq!(solution.closure.to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(solution.rate, FeeRate::new(60, 8));
    }

    #[test]
    fn test_candidates_nest_and_rates_rise() {
        let edges = [(0, 1), (2, 1), (3, 2), (4, 0), (4, 3)];
        let cluster = build(&[(9, 3), (1, 2), (6, 1), (4, 4), (8, 1), (2, 2)], &edges);
        let mut solver = ParametricSolver::default();
        let solution = solver.solve(&cluster).unwrap();

        let candidates = &solver.stats().candidates;
        assert_eq!(candidates.len(), solver.stats().iterations);
        for pair in candidates.windows(2) {
            assert!(pair[1].closure.is_subset(&pair[0].closure));
        }
        // all but the terminating candidate strictly improve
        for pair in candidates[..candidates.len() - 1].windows(2) {
            assert!(pair[1].rate.is_better_than(&pair[0].rate));
        }
        let last = candidates.last().unwrap();
        assert!(!last.rate.is_better_than(&solution.rate));
        assert!(cluster.is_closure(&solution.closure));
    }

    #[test]
    fn test_optimal_target_admits_no_improvement() {
        let cluster = build(&[(10, 2), (1, 1), (5, 1), (7, 3)], &[(0, 1), (3, 2)]);
        let solution = solve(&cluster);

        let assignment = WeightAssignment::for_cluster(&cluster, 1_000_000).unwrap();
        let weights = assignment.weights(&cluster, &solution.rate);
        let closure = max_weight_closure(&cluster, &weights, RelabelPolicy::Increment).unwrap();
        assert!(!cluster.feerate_of(&closure).is_better_than(&solution.rate));
    }

    #[test]
    fn test_zero_size_seed() {
        let cluster = build(&[(5, 0), (1, 1)], &[]);
        let solution = solve(&cluster);
        assert_eq!(solution.closure.to_vec(), vec![0, 1]);
        assert_eq!(solution.rate, FeeRate::new(6, 1));
    }

    #[test]
    fn test_all_zero_size() {
        let cluster = build(&[(3, 0), (4, 0)], &[]);
        let solution = solve(&cluster);
        assert_eq!(solution.closure.to_vec(), vec![0, 1]);
        assert_eq!(solution.rate, FeeRate::new(7, 0));
    }

    #[test]
    fn test_large_sizes_stay_exact() {
        // {1, 2} at 30004/10001 beats the 3/1 seed by about 1e-4; adding
        // item 0 dilutes it
        let cluster = build(&[(30_000, 10_000), (30_003, 10_000), (1, 1)], &[(1, 2)]);
        let solution = solve(&cluster);
        let exact = crate::validation::BruteForceSolver::new(20).solve(&cluster).unwrap();
        assert!(solution.rate.is_equivalent(&exact.rate));
        assert_eq!(solution.closure.to_vec(), vec![1, 2]);
        assert_eq!(solution.rate, FeeRate::new(30_004, 10_001));
    }

    #[test]
    fn test_huge_fees_solve_without_overflow() {
        let quarter = u64::MAX / 4;
        let cluster = build(&[(quarter, 2), (2 * quarter, 1), (1, 1)], &[(1, 0)]);
        let solution = solve(&cluster);
        assert_eq!(solution.closure.to_vec(), vec![0, 1]);
        assert_eq!(solution.rate, FeeRate::new(3 * quarter, 3));
    }

    #[test]
    fn test_unrepresentable_weights_rejected() {
        let cluster = build(&[(1, u64::MAX / 2), (1, 1)], &[]);
        assert_eq!(
            ParametricSolver::default().solve(&cluster),
            Err(SolveError::WeightOverflow {
                fee: 2,
                size: u64::MAX / 2 + 1
            })
        );
    }

    #[test]
    fn test_empty_cluster() {
        let cluster = build(&[], &[]);
        let solution = solve(&cluster);
        assert!(solution.closure.is_empty());
        assert_eq!(solution.rate, FeeRate::ZERO);
    }

    #[test]
    fn test_relabel_policies_agree() {
        let edges = [(0, 1), (2, 1), (3, 2), (4, 0), (4, 3)];
        let cluster = build(&[(9, 3), (1, 2), (6, 1), (4, 4), (8, 1), (2, 2)], &edges);
        let config = SolverConfig {
            relabel: RelabelPolicy::MinNeighbor,
            ..SolverConfig::default()
        };
        let fast = ParametricSolver::new(config).solve(&cluster).unwrap();
        assert!(fast.rate.is_equivalent(&solve(&cluster).rate));
    }

    #[test]
    fn test_capacity_checked_against_config() {
        let cluster = build(&[(1, 1), (1, 1), (1, 1)], &[]);
        let config = SolverConfig {
            max_items: 2,
            ..SolverConfig::default()
        };
        assert!(matches!(
            ParametricSolver::new(config).solve(&cluster),
            Err(SolveError::Cluster(ClusterError::TooManyItems { count: 3, max: 2 }))
        ));
    }

    #[test]
    fn test_seed_prefers_first_root() {
        let cluster = build(&[(1, 1), (2, 1), (3, 1)], &[(0, 2)]);
        assert_eq!(ParametricSolver::seed(&cluster).closure.to_vec(), vec![1]);
    }
}
