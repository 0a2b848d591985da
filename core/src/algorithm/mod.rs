//! Maximum Feerate Closure Algorithms
//! Parametric min-cut search over dependency clusters
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod traits;
pub mod graph;
pub mod weights;
pub mod parametric;

pub use self::traits::*;
pub use self::graph::*;
pub use self::weights::WeightAssignment;
pub use self::parametric::{ParametricSolver, SolveStats};
