//! Index sets over a fixed universe of items
//!
//! An `ItemSet` holds one bit per item of a cluster. The universe size is
//! fixed when the set is created; every index stored is below it. Sets over
//! different universes are never mixed, which the binary operations assert.

use std::fmt;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Subset of `[0, universe)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSet {
    bits: BitVec<u64, Lsb0>,
}

impl ItemSet {
    /// The empty subset of `[0, universe)`.
    pub fn empty(universe: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, universe),
        }
    }

    /// All of `[0, universe)`.
    pub fn full(universe: usize) -> Self {
        Self {
            bits: BitVec::repeat(true, universe),
        }
    }

    pub fn singleton(universe: usize, index: usize) -> Self {
        let mut set = Self::empty(universe);
        set.insert(index);
        set
    }

    pub fn from_indices<I>(universe: usize, indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut set = Self::empty(universe);
        for index in indices {
            set.insert(index);
        }
        set
    }

    /// Set whose bit `i` is bit `i` of `mask`. Requires `universe <= 64`.
    pub fn from_mask(universe: usize, mask: u64) -> Self {
        debug_assert!(universe <= u64::BITS as usize);
        Self::from_indices(universe, (0..universe).filter(|&i| (mask >> i) & 1 == 1))
    }

    /// Number of items the set may range over.
    #[inline]
    pub fn universe(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < self.bits.len() && self.bits[index]
    }

    /// Population count.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Adds `index`; returns whether it was newly inserted.
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(
            index < self.universe(),
            "item {} outside universe of {}",
            index,
            self.universe()
        );
        let fresh = !self.bits[index];
        self.bits.set(index, true);
        fresh
    }

    /// In-place union.
    pub fn union_with(&mut self, other: &ItemSet) {
        debug_assert_eq!(self.universe(), other.universe());
        for index in other.iter() {
            self.bits.set(index, true);
        }
    }

    /// Every member of `self` is a member of `other`.
    pub fn is_subset(&self, other: &ItemSet) -> bool {
        self.iter().all(|index| other.contains(index))
    }

    pub fn is_disjoint(&self, other: &ItemSet) -> bool {
        !self.iter().any(|index| other.contains(index))
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

impl fmt::Display for ItemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (position, index) in self.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "}}")
    }
}
