//! Weight assignment for a target feerate
//!
//! Turns "find a closure with feerate above `target`" into an integer
//! max-weight-closure instance. With `λ = floor(scale * fee / size)` of the
//! target, item `i` weighs `scale * fee_i - size_i * λ`. A closure whose rate
//! beats the target has positive total weight; the floor only ever rounds
//! weights up, by less than one unit per unit of size.
//!
//! The floor is harmless as long as `scale` exceeds `S * size(C)` for the
//! target size `S` and every closure `C`: a closure that does not beat the
//! target then weighs less than any closure that does. [`WeightAssignment::for_cluster`]
//! picks such a scale.
//!
//! Weights are non-increasing in the target, which is the monotonicity the
//! parametric driver relies on to keep its flow state.

use crate::data_structures::{Cluster, FeeRate};

use super::graph::min_cut::{Capacities, Capacity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightAssignment {
    scale: Capacity,
}

impl WeightAssignment {
    fn with_scale(scale: Capacity) -> Self {
        debug_assert!(scale > 0, "scale must be positive");
        Self { scale }
    }

    /// Lift for `cluster`: at least `configured`, and above the squared total
    /// size so every threshold comparison is exact.
    ///
    /// `None` when the weights, or the flow they can accumulate, would not fit
    /// in a [`Capacity`].
    pub fn for_cluster(cluster: &Cluster, configured: u64) -> Option<Self> {
        let total = cluster.feerate_of(&cluster.full_set());
        let size = total.size as Capacity;
        let scale = size.checked_mul(size)?.checked_add(1)?.max(configured as Capacity);

        // bounds the sum of all terminal capacities at any target
        scale
            .checked_mul((total.fee as Capacity).max(1))?
            .checked_mul(size.checked_add(2)?)?;
        Some(Self::with_scale(scale))
    }

    pub fn scale(&self) -> Capacity {
        self.scale
    }

    /// Lifted target rate `floor(scale * fee / size)`.
    ///
    /// A zero-size target is below every positive-size rate and maps to `-1`,
    /// under which every non-empty item weighs something positive.
    pub fn threshold(&self, target: &FeeRate) -> Capacity {
        if target.size == 0 {
            -1
        } else {
            self.scale * target.fee as Capacity / target.size as Capacity
        }
    }

    #[inline]
    pub fn weight(&self, item: &FeeRate, threshold: Capacity) -> Capacity {
        self.scale * item.fee as Capacity - item.size as Capacity * threshold
    }

    pub fn weights(&self, cluster: &Cluster, target: &FeeRate) -> Vec<Capacity> {
        let threshold = self.threshold(target);
        cluster
            .rates()
            .iter()
            .map(|rate| self.weight(rate, threshold))
            .collect()
    }

    pub fn capacities(&self, cluster: &Cluster, target: &FeeRate) -> Capacities {
        Capacities::from_weights(&self.weights(cluster, target))
    }
}
