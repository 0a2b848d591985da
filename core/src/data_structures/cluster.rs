//! Dependency clusters of weighted items
//!
//! A `Cluster` is the immutable problem instance: one `(fee, size)` pair per
//! item and, for each item, the set of items it directly depends on. Clusters
//! are only obtainable through [`ClusterBuilder::build`], which rejects
//! anything the solvers cannot handle (too many items, dangling indices,
//! cycles). Every algorithm downstream relies on that.

use thiserror::Error;

use super::fee_rate::FeeRate;
use super::item_set::ItemSet;

/// Construction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("cluster has {count} items, capacity is {max}")]
    TooManyItems { count: usize, max: usize },

    #[error("item index {index} out of range for {count} items")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("item {0} depends on itself")]
    SelfDependency(usize),

    #[error("dependency cycle through item {0}")]
    Cycle(usize),

    #[error("total {0} of the cluster does not fit in 64 bits")]
    TotalOverflow(&'static str),
}

/// Validated dependency DAG with per-item fee and size.
#[derive(Debug, Clone)]
pub struct Cluster {
    rates: Vec<FeeRate>,
    /// `dependencies[i]`: items `i` directly depends on.
    dependencies: Vec<ItemSet>,
    /// `dependents[i]`: items directly depending on `i`.
    dependents: Vec<ItemSet>,
}

impl Cluster {
    #[inline]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    #[inline]
    pub fn rate(&self, item: usize) -> FeeRate {
        self.rates[item]
    }

    pub fn rates(&self) -> &[FeeRate] {
        &self.rates
    }

    #[inline]
    pub fn dependencies(&self, item: usize) -> &ItemSet {
        &self.dependencies[item]
    }

    #[inline]
    pub fn dependents(&self, item: usize) -> &ItemSet {
        &self.dependents[item]
    }

    /// Reversed relation, indexed by item.
    pub fn dependents_relation(&self) -> &[ItemSet] {
        &self.dependents
    }

    /// Items with no dependencies, ascending.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.dependencies
            .iter()
            .enumerate()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(item, _)| item)
    }

    pub fn empty_set(&self) -> ItemSet {
        ItemSet::empty(self.len())
    }

    pub fn full_set(&self) -> ItemSet {
        ItemSet::full(self.len())
    }

    /// Aggregate rate of `subset`; `(0,0)` for the empty set.
    pub fn feerate_of(&self, subset: &ItemSet) -> FeeRate {
        subset.iter().map(|item| self.rates[item]).sum()
    }

    /// Whether every direct dependency of every member is also a member.
    pub fn is_closure(&self, subset: &ItemSet) -> bool {
        let mut expanded = subset.clone();
        for item in subset.iter() {
            expanded.union_with(&self.dependencies[item]);
        }
        expanded == *subset
    }
}

/// Accumulates items and dependency pairs before validation.
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    rates: Vec<FeeRate>,
    edges: Vec<(usize, usize)>,
    max_items: usize,
}

impl ClusterBuilder {
    pub fn new(max_items: usize) -> Self {
        Self {
            rates: Vec::new(),
            edges: Vec::new(),
            max_items,
        }
    }

    /// Appends an item and returns its index.
    pub fn item(&mut self, fee: u64, size: u64) -> usize {
        self.rates.push(FeeRate::new(fee, size));
        self.rates.len() - 1
    }

    /// Records that `child` depends on `parent`.
    pub fn depends(&mut self, child: usize, parent: usize) -> &mut Self {
        self.edges.push((child, parent));
        self
    }

    pub fn build(&self) -> Result<Cluster, ClusterError> {
        let count = self.rates.len();
        if count > self.max_items {
            return Err(ClusterError::TooManyItems {
                count,
                max: self.max_items,
            });
        }
        // Any subset sum is then representable.
        let mut total = FeeRate::ZERO;
        for rate in &self.rates {
            total.fee = total.fee.checked_add(rate.fee).ok_or(ClusterError::TotalOverflow("fee"))?;
            total.size = total.size.checked_add(rate.size).ok_or(ClusterError::TotalOverflow("size"))?;
        }

        let mut dependencies = vec![ItemSet::empty(count); count];
        let mut dependents = vec![ItemSet::empty(count); count];
        for &(child, parent) in &self.edges {
            for index in [child, parent] {
                if index >= count {
                    return Err(ClusterError::IndexOutOfRange { index, count });
                }
            }
            if child == parent {
                return Err(ClusterError::SelfDependency(child));
            }
            dependencies[child].insert(parent);
            dependents[parent].insert(child);
        }

        // Peel items whose dependencies are all peeled; leftovers sit on a cycle.
        let mut pending: Vec<usize> = dependencies.iter().map(ItemSet::len).collect();
        let mut ready: Vec<usize> = (0..count).filter(|&i| pending[i] == 0).collect();
        let mut peeled = 0;
        while let Some(item) = ready.pop() {
            peeled += 1;
            for child in dependents[item].iter() {
                pending[child] -= 1;
                if pending[child] == 0 {
                    ready.push(child);
                }
            }
        }
        if peeled < count {
            let stuck = (0..count).find(|&i| pending[i] > 0).unwrap_or(0);
            return Err(ClusterError::Cycle(stuck));
        }

        Ok(Cluster {
            rates: self.rates.clone(),
            dependencies,
            dependents,
        })
    }
}
