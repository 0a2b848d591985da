//! Push-Relabel Minimum Cut over Implicit Closure Networks
//!
//! This module implements the Goldberg-Tarjan preflow-push engine that sits
//! underneath every closure solver. The network is never materialized: it
//! consists of a virtual source, a virtual sink and one node per item, with
//!
//! - an arc `source -> i` of capacity `cap_to_source[i]` (negative weights),
//! - an arc `i -> sink` of capacity `cap_to_sink[i]` (positive weights),
//! - an arc `i -> j` of infinite capacity whenever `j` is a successor of `i`.
//!
//! Successors are the items that depend on `i`, so the set of items that can
//! still reach the sink in the residual network is closed under dependency.
//! That set is the inclusion-minimal maximum-weight closure and is what
//! [`MinCutEngine::min_cut`] returns.
//!
//! The flow state survives between calls. Raising source capacities and
//! lowering sink capacities through [`MinCutEngine::set_capacities`] keeps the
//! preflow and the distance labels valid, which is what lets the parametric
//! driver resume instead of restarting.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RelabelPolicy;
use crate::data_structures::{Cluster, ItemSet};

/// Capacity and flow values. Wide enough for lifted fees of full clusters.
pub type Capacity = i128;

/// Distance label type for push-relabel algorithm
pub type DistanceLabel = usize;

/// Which virtual arc of an item a capacity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalArc {
    Source,
    Sink,
}

/// Flow algorithm errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("{arc:?} capacity of item {item} moved from {previous} to {current} against the parametric order")]
    CapacityRegression {
        item: usize,
        arc: TerminalArc,
        previous: Capacity,
        current: Capacity,
    },

    #[error("capacities cover {got} items, network has {expected}")]
    SizeMismatch { expected: usize, got: usize },
}

/// Flow algorithm performance metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Number of push operations (sink pushes included)
    pub push_operations: usize,
    /// Number of relabel operations
    pub relabel_operations: usize,
    /// Number of discharge calls
    pub discharges: usize,
    /// Number of completed min-cut runs
    pub runs: usize,
}

/// Terminal capacities of every item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Capacities {
    pub to_source: Vec<Capacity>,
    pub to_sink: Vec<Capacity>,
}

impl Capacities {
    pub fn zeroed(nodes: usize) -> Self {
        Self {
            to_source: vec![0; nodes],
            to_sink: vec![0; nodes],
        }
    }

    /// Positive weights become sink capacities, negative weights source
    /// capacities. Exactly one of the two is non-zero per weighted item.
    pub fn from_weights(weights: &[Capacity]) -> Self {
        let mut capacities = Self::zeroed(weights.len());
        for (item, &weight) in weights.iter().enumerate() {
            if weight > 0 {
                capacities.to_sink[item] = weight;
            } else {
                capacities.to_source[item] = -weight;
            }
        }
        capacities
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.to_sink.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.to_sink.is_empty()
    }
}

/// Mutable preflow carried across parametric iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowState {
    /// Inflow minus outflow per item
    pub excess: Vec<Capacity>,
    /// Row-major `nodes x nodes`; entry `u * nodes + v` is the flow on `u -> v`
    pub flow: Vec<Capacity>,
    pub flow_to_source: Vec<Capacity>,
    pub flow_to_sink: Vec<Capacity>,
    /// Labels, non-decreasing over the lifetime of the state
    pub distance: Vec<DistanceLabel>,
    nodes: usize,
}

impl FlowState {
    pub fn new(nodes: usize) -> Self {
        Self {
            excess: vec![0; nodes],
            flow: vec![0; nodes * nodes],
            flow_to_source: vec![0; nodes],
            flow_to_sink: vec![0; nodes],
            distance: vec![0; nodes],
            nodes,
        }
    }

    #[inline]
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Flow on the item arc `from -> to`.
    #[inline]
    pub fn flow(&self, from: usize, to: usize) -> Capacity {
        self.flow[from * self.nodes + to]
    }

    #[inline]
    fn flow_mut(&mut self, from: usize, to: usize) -> &mut Capacity {
        &mut self.flow[from * self.nodes + to]
    }
}

/// Push-relabel solver for one closure network.
#[derive(Debug, Clone)]
pub struct MinCutEngine {
    /// `successors[i]`: heads of the infinite arcs leaving `i`
    successors: Vec<ItemSet>,
    capacities: Capacities,
    state: FlowState,
    policy: RelabelPolicy,
    /// FIFO of active nodes
    active: VecDeque<usize>,
    metrics: FlowMetrics,
    primed: bool,
}

impl MinCutEngine {
    /// Creates an engine with zero capacities and an empty preflow.
    pub fn new(successors: Vec<ItemSet>, policy: RelabelPolicy) -> Self {
        let nodes = successors.len();
        Self {
            successors,
            capacities: Capacities::zeroed(nodes),
            state: FlowState::new(nodes),
            policy,
            active: VecDeque::new(),
            metrics: FlowMetrics::default(),
            primed: false,
        }
    }

    /// Engine whose infinite arcs run from each item to its dependents.
    pub fn for_cluster(cluster: &Cluster, policy: RelabelPolicy) -> Self {
        Self::new(cluster.dependents_relation().to_vec(), policy)
    }

    #[inline]
    pub fn nodes(&self) -> usize {
        self.successors.len()
    }

    /// Label at which a node is known to be cut off from the sink.
    #[inline]
    pub fn dormant_label(&self) -> DistanceLabel {
        self.nodes() + 2
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn metrics(&self) -> &FlowMetrics {
        &self.metrics
    }

    /// Installs new terminal capacities and re-saturates.
    ///
    /// After the first call, source capacities may only grow and sink
    /// capacities may only shrink. Source arcs of live nodes are saturated;
    /// sink flow above the new capacity is returned to its node as excess.
    pub fn set_capacities(&mut self, capacities: Capacities) -> Result<(), FlowError> {
        let nodes = self.nodes();
        if capacities.to_source.len() != nodes || capacities.to_sink.len() != nodes {
            return Err(FlowError::SizeMismatch {
                expected: nodes,
                got: capacities.len(),
            });
        }

        if self.primed {
            for item in 0..nodes {
                let (previous, current) = (self.capacities.to_source[item], capacities.to_source[item]);
                if current < previous {
                    return Err(FlowError::CapacityRegression {
                        item,
                        arc: TerminalArc::Source,
                        previous,
                        current,
                    });
                }
                let (previous, current) = (self.capacities.to_sink[item], capacities.to_sink[item]);
                if current > previous {
                    return Err(FlowError::CapacityRegression {
                        item,
                        arc: TerminalArc::Sink,
                        previous,
                        current,
                    });
                }
            }
        }
        self.capacities = capacities;
        self.primed = true;

        let dormant = self.dormant_label();
        for item in 0..nodes {
            if self.state.distance[item] < dormant {
                let delta = self.capacities.to_source[item] - self.state.flow_to_source[item];
                debug_assert!(delta >= 0, "source arc of item {} over capacity", item);
                self.state.excess[item] += delta;
                self.state.flow_to_source[item] += delta;
            }

            let cap = self.capacities.to_sink[item];
            let delta = self.state.flow_to_sink[item] - self.state.flow_to_sink[item].min(cap);
            self.state.excess[item] += delta;
            self.state.flow_to_sink[item] -= delta;
            debug_assert!(self.state.flow_to_sink[item] <= cap);
        }
        Ok(())
    }

    /// Pushes excess from `from` to `to` along the item arc or its reverse.
    ///
    /// Only admissible when `distance[from] > distance[to]`. Returns the
    /// amount moved, zero if the push was not admissible or the items are not
    /// connected.
    pub fn push(&mut self, from: usize, to: usize) -> Capacity {
        if from == to || self.state.distance[from] <= self.state.distance[to] {
            return 0;
        }
        let available = self.state.excess[from];
        if available <= 0 {
            return 0;
        }

        let pushed = if self.successors[from].contains(to) {
            *self.state.flow_mut(from, to) += available;
            available
        } else if self.successors[to].contains(from) {
            let undo = available.min(self.state.flow(to, from));
            *self.state.flow_mut(to, from) -= undo;
            undo
        } else {
            0
        };

        if pushed > 0 {
            self.state.excess[from] -= pushed;
            self.state.excess[to] += pushed;
            self.metrics.push_operations += 1;
            if self.state.excess[to] == pushed {
                self.active.push_back(to);
            }
        }
        pushed
    }

    /// Moves as much excess as the residual sink arc allows.
    pub fn push_to_sink(&mut self, item: usize) -> Capacity {
        let residual = self.capacities.to_sink[item] - self.state.flow_to_sink[item];
        let pushed = self.state.excess[item].min(residual);
        if pushed > 0 {
            self.state.excess[item] -= pushed;
            self.state.flow_to_sink[item] += pushed;
            self.metrics.push_operations += 1;
        }
        pushed
    }

    /// Raises the label of an active node that has no admissible arc.
    pub fn relabel(&mut self, item: usize) {
        let dormant = self.dormant_label();
        let current = self.state.distance[item];
        let next = match self.policy {
            RelabelPolicy::Increment => current + 1,
            RelabelPolicy::MinNeighbor => self
                .lowest_residual_neighbor(item)
                .map_or(dormant, |label| label + 1)
                .max(current + 1),
        };
        self.state.distance[item] = next.min(dormant);
        self.metrics.relabel_operations += 1;
    }

    fn lowest_residual_neighbor(&self, item: usize) -> Option<DistanceLabel> {
        let mut lowest = if self.capacities.to_sink[item] > self.state.flow_to_sink[item] {
            Some(0)
        } else {
            None
        };
        for next in (0..self.nodes()).filter(|&next| next != item) {
            let residual = self.successors[item].contains(next)
                || (self.successors[next].contains(item) && self.state.flow(next, item) > 0);
            if residual {
                let label = self.state.distance[next];
                lowest = Some(lowest.map_or(label, |low: DistanceLabel| low.min(label)));
            }
        }
        lowest
    }

    /// Push/relabel until `item` has no excess or is cut off from the sink.
    pub fn discharge(&mut self, item: usize) {
        let dormant = self.dormant_label();
        self.metrics.discharges += 1;

        while self.state.distance[item] < dormant && self.state.excess[item] > 0 {
            self.push_to_sink(item);
            if self.state.excess[item] == 0 {
                break;
            }

            for next in 0..self.nodes() {
                if self.state.excess[item] == 0 {
                    break;
                }
                self.push(item, next);
            }
            if self.state.excess[item] == 0 {
                break;
            }

            self.relabel(item);
        }
    }

    /// Runs the preflow to completion and returns the minimal sink side.
    pub fn min_cut(&mut self) -> ItemSet {
        let dormant = self.dormant_label();
        self.active.clear();
        for item in 0..self.nodes() {
            if self.state.distance[item] < dormant && self.state.excess[item] > 0 {
                self.active.push_back(item);
            }
        }

        while let Some(item) = self.active.pop_front() {
            self.discharge(item);
        }
        self.metrics.runs += 1;

        let closure = self.extract_min_cut();
        trace!(
            "min-cut run {}: {} pushes, {} relabels, closure {}",
            self.metrics.runs,
            self.metrics.push_operations,
            self.metrics.relabel_operations,
            closure
        );
        closure
    }

    /// Items that can reach the sink in the residual network.
    pub fn extract_min_cut(&self) -> ItemSet {
        let nodes = self.nodes();
        let mut reach = ItemSet::empty(nodes);
        let mut queue = VecDeque::new();

        for item in 0..nodes {
            if self.capacities.to_sink[item] > self.state.flow_to_sink[item] {
                reach.insert(item);
                queue.push_back(item);
            }
        }

        while let Some(head) = queue.pop_front() {
            for tail in 0..nodes {
                if reach.contains(tail) {
                    continue;
                }
                // open infinite arc tail -> head, or flow on head -> tail to undo
                if self.successors[tail].contains(head) || self.state.flow(head, tail) > 0 {
                    reach.insert(tail);
                    queue.push_back(tail);
                }
            }
        }

        debug_assert!(
            reach.iter().all(|item| self.state.excess[item] == 0),
            "excess left on the sink side"
        );
        reach
    }
}

/// Maximum-weight closure of a single weighting, computed from scratch.
///
/// Among all closures of maximum weight the inclusion-minimal one is
/// returned; zero-weight items are only included when something requires them.
pub fn max_weight_closure(cluster: &Cluster, weights: &[Capacity], policy: RelabelPolicy) -> Result<ItemSet, FlowError> {
    let mut engine = MinCutEngine::for_cluster(cluster, policy);
    engine.set_capacities(Capacities::from_weights(weights))?;
    Ok(engine.min_cut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::ClusterBuilder;

    /// `edges` are `(child, parent)` pairs.
    fn cluster(items: usize, edges: &[(usize, usize)]) -> Cluster {
        let mut builder = ClusterBuilder::new(32);
        for _ in 0..items {
            builder.item(1, 1);
        }
        for &(child, parent) in edges {
            builder.depends(child, parent);
        }
        builder.build().unwrap()
    }

    fn closure_of(cluster: &Cluster, weights: &[Capacity]) -> Vec<usize> {
        max_weight_closure(cluster, weights, RelabelPolicy::Increment)
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_capacities_from_weights() {
        let caps = Capacities::from_weights(&[5, -3, 0]);
        assert_eq!(caps.to_sink, vec![5, 0, 0]);
        assert_eq!(caps.to_source, vec![0, 3, 0]);
    }

    #[test]
    fn test_flow_state_creation() {
        let state = FlowState::new(3);
        assert_eq!(state.nodes(), 3);
        assert_eq!(state.flow.len(), 9);
        assert!(state.distance.iter().all(|&d| d == 0));
        assert_eq!(state.flow(2, 1), 0);
    }

    #[test]
    fn test_push_follows_labels_and_arcs() {
        // 1 depends on 0: infinite arc 0 -> 1
        let cluster = cluster(3, &[(1, 0)]);
        let mut engine = MinCutEngine::for_cluster(&cluster, RelabelPolicy::Increment);
        engine.set_capacities(Capacities::from_weights(&[-4, 0, 0])).unwrap();
        assert_eq!(engine.state().excess[0], 4);

        // equal labels: not admissible
        assert_eq!(engine.push(0, 1), 0);

        engine.relabel(0);
        assert_eq!(engine.push(0, 2), 0, "no arc between 0 and 2");
        assert_eq!(engine.push(0, 1), 4);
        assert_eq!(engine.state().flow(0, 1), 4);
        assert_eq!(engine.state().excess[1], 4);

        // undo along the reverse residual arc
        engine.relabel(1);
        engine.relabel(1);
        assert_eq!(engine.push(1, 0), 4);
        assert_eq!(engine.state().flow(0, 1), 0);
        assert_eq!(engine.state().excess[0], 4);
    }

    #[test]
    fn test_push_to_sink_is_bounded() {
        let cluster = cluster(1, &[]);
        let mut engine = MinCutEngine::for_cluster(&cluster, RelabelPolicy::Increment);
        engine.set_capacities(Capacities::from_weights(&[3])).unwrap();
        engine.state.excess[0] = 5;
        assert_eq!(engine.push_to_sink(0), 3);
        assert_eq!(engine.state().excess[0], 2);
        assert_eq!(engine.push_to_sink(0), 0);
    }

    #[test]
    fn test_single_items() {
        let cluster = cluster(3, &[]);
        assert_eq!(closure_of(&cluster, &[5, -1, 0]), vec![0]);
        assert_eq!(closure_of(&cluster, &[-5, -1, 0]), Vec::<usize>::new());
    }

    #[test]
    fn test_dependency_pays_off_or_not() {
        // 0 depends on 1
        let cluster = cluster(2, &[(0, 1)]);
        assert_eq!(closure_of(&cluster, &[5, -3]), vec![0, 1]);
        assert_eq!(closure_of(&cluster, &[5, -7]), Vec::<usize>::new());
        // zero total weight resolves towards the smaller closure
        assert_eq!(closure_of(&cluster, &[5, -5]), Vec::<usize>::new());
    }

    #[test]
    fn test_shared_dependency() {
        // 0 and 1 both depend on 2; neither pays for 2 alone, together they do
        let cluster = cluster(3, &[(0, 2), (1, 2)]);
        assert_eq!(closure_of(&cluster, &[3, 3, -5]), vec![0, 1, 2]);
        assert_eq!(closure_of(&cluster, &[3, 1, -5]), Vec::<usize>::new());
        assert_eq!(closure_of(&cluster, &[3, -1, -2]), vec![0, 2]);
    }

    #[test]
    fn test_diamond() {
        // 0 -> {1, 2}, {1, 2} -> 3
        let cluster = cluster(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(closure_of(&cluster, &[10, -1, -1, -5]), vec![0, 1, 2, 3]);
        assert_eq!(closure_of(&cluster, &[10, 4, -1, -20]), Vec::<usize>::new());
        assert_eq!(closure_of(&cluster, &[-1, 6, -1, -5]), vec![1, 3]);
    }

    #[test]
    fn test_relabel_policies_agree() {
        let cluster = cluster(5, &[(0, 1), (0, 2), (1, 3), (2, 3), (4, 3)]);
        let weights = [7, -2, 3, -6, 2];
        let increment = max_weight_closure(&cluster, &weights, RelabelPolicy::Increment).unwrap();
        let min_neighbor = max_weight_closure(&cluster, &weights, RelabelPolicy::MinNeighbor).unwrap();
        assert_eq!(increment, min_neighbor);
        assert!(cluster.is_closure(&increment));
    }

    #[test]
    fn test_min_neighbor_relabel_jumps() {
        let cluster = cluster(2, &[(1, 0)]);
        let mut engine = MinCutEngine::for_cluster(&cluster, RelabelPolicy::MinNeighbor);
        engine.set_capacities(Capacities::from_weights(&[-1, 0])).unwrap();
        engine.state.distance[1] = 2;
        engine.relabel(0);
        assert_eq!(engine.state().distance[0], 2 + 1);

        engine.relabel(1);
        // no residual neighbour: straight to dormant
        assert_eq!(engine.state().distance[1], engine.dormant_label());
    }

    #[test]
    fn test_reuse_across_capacity_updates() {
        let cluster = cluster(3, &[(0, 1), (2, 1)]);
        let mut engine = MinCutEngine::for_cluster(&cluster, RelabelPolicy::Increment);

        engine.set_capacities(Capacities::from_weights(&[4, -3, 2])).unwrap();
        let first = engine.min_cut();
        assert_eq!(first.to_vec(), vec![0, 1, 2]);

        // lower every weight: sink capacities shrink, source capacities grow
        engine.set_capacities(Capacities::from_weights(&[3, -4, 0])).unwrap();
        let second = engine.min_cut();
        assert!(second.is_empty());
        assert!(second.is_subset(&first));
        assert_eq!(engine.metrics().runs, 2);
    }

    #[test]
    fn test_capacity_regression_rejected() {
        let cluster = cluster(2, &[]);
        let mut engine = MinCutEngine::for_cluster(&cluster, RelabelPolicy::Increment);
        engine.set_capacities(Capacities::from_weights(&[3, -3])).unwrap();

        assert_eq!(
            engine.set_capacities(Capacities::from_weights(&[4, -3])),
            Err(FlowError::CapacityRegression {
                item: 0,
                arc: TerminalArc::Sink,
                previous: 3,
                current: 4,
            })
        );
        assert!(matches!(
            engine.set_capacities(Capacities::from_weights(&[3, -2])),
            Err(FlowError::CapacityRegression { item: 1, arc: TerminalArc::Source, .. })
        ));
        assert_eq!(
            engine.set_capacities(Capacities::zeroed(3)),
            Err(FlowError::SizeMismatch { expected: 2, got: 3 })
        );
    }

    #[test]
    fn test_empty_network() {
        let cluster = cluster(0, &[]);
        assert!(closure_of(&cluster, &[]).is_empty());
    }
}
