//! Exact fee/size ratios
//!
//! A `FeeRate` is an aggregate `(fee, size)` pair whose value is the ratio
//! `fee / size`. Ordering is decided by cross-multiplication in 128-bit
//! integers, so no comparison ever goes through floating point. Floating
//! point is only used for display.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Aggregate fee and size of a set of items.
///
/// `PartialEq` is exact component equality (`2/4 != 1/2`); use
/// [`FeeRate::compare`] for the ratio order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeRate {
    pub fee: u64,
    pub size: u64,
}

impl FeeRate {
    /// The rate of the empty set and identity of [`FeeRate::combine`].
    pub const ZERO: FeeRate = FeeRate { fee: 0, size: 0 };

    #[inline]
    pub const fn new(fee: u64, size: u64) -> Self {
        Self { fee, size }
    }

    /// `self.fee * other.size - self.size * other.fee`
    ///
    /// Signed, so it only holds products that fit in `i128`; ordering goes
    /// through [`FeeRate::compare`] instead.
    #[inline]
    pub fn cross(&self, other: &FeeRate) -> i128 {
        (self.fee as i128) * (other.size as i128) - (self.size as i128) * (other.fee as i128)
    }

    /// Total order on ratios.
    ///
    /// A zero-size rate sits below every positive-size rate; two zero-size
    /// rates are ordered by their raw fees.
    pub fn compare(&self, other: &FeeRate) -> Ordering {
        match (self.size == 0, other.size == 0) {
            (true, true) => self.fee.cmp(&other.fee),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => {
                let lhs = (self.fee as u128) * (other.size as u128);
                let rhs = (other.fee as u128) * (self.size as u128);
                lhs.cmp(&rhs)
            }
        }
    }

    /// Strictly higher ratio than `other`.
    #[inline]
    pub fn is_better_than(&self, other: &FeeRate) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Same ratio as `other` (`1/2` is equivalent to `2/4`).
    #[inline]
    pub fn is_equivalent(&self, other: &FeeRate) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Componentwise sum, the rate of the union of two disjoint sets.
    #[inline]
    pub fn combine(&self, other: &FeeRate) -> FeeRate {
        FeeRate {
            fee: self.fee + other.fee,
            size: self.size + other.size,
        }
    }

    /// Ratio as a float, `None` for zero size.
    pub fn as_f64(&self) -> Option<f64> {
        if self.size == 0 {
            None
        } else {
            Some(self.fee as f64 / self.size as f64)
        }
    }
}

impl Add for FeeRate {
    type Output = FeeRate;

    fn add(self, rhs: FeeRate) -> FeeRate {
        self.combine(&rhs)
    }
}

impl AddAssign for FeeRate {
    fn add_assign(&mut self, rhs: FeeRate) {
        self.fee += rhs.fee;
        self.size += rhs.size;
    }
}

impl Sum for FeeRate {
    fn sum<I: Iterator<Item = FeeRate>>(iter: I) -> FeeRate {
        iter.fold(FeeRate::ZERO, |acc, rate| acc + rate)
    }
}

impl<'a> Sum<&'a FeeRate> for FeeRate {
    fn sum<I: Iterator<Item = &'a FeeRate>>(iter: I) -> FeeRate {
        iter.fold(FeeRate::ZERO, |acc, rate| acc + *rate)
    }
}

/// Renders as `rate fee size`, with `NAN` in place of the rate for zero size.
impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_f64() {
            Some(rate) => write!(f, "{} {} {}", rate, self.fee, self.size),
            None => write!(f, "NAN {} {}", self.fee, self.size),
        }
    }
}
