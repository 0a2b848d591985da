//! MAXRATE Core
//!
//! Maximum feerate closure of a dependency cluster: among all subsets of
//! items that contain every dependency of their members, find one with the
//! highest aggregate `fee / size`.
//!
//! The primary solver is [`ParametricSolver`], a Gallo-Grigoriadis-Tarjan
//! parametric min-cut that keeps one push-relabel preflow alive across a
//! rising sequence of target rates. [`BruteForceSolver`] and
//! [`FractionalSolver`] compute the same optimum independently and serve as
//! oracles.
//!
//! ```
//! use maxrate_core::{ClosureSolver, ClusterBuilder, FeeRate, ParametricSolver};
//!
//! let mut builder = ClusterBuilder::new(32);
//! let parent = builder.item(1, 1);
//! let child = builder.item(10, 2);
//! builder.depends(child, parent);
//! let cluster = builder.build().unwrap();
//!
//! let solution = ParametricSolver::default().solve(&cluster).unwrap();
//! assert_eq!(solution.rate, FeeRate::new(11, 3));
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod config;
pub mod data_structures;
pub mod protocol;
pub mod validation;

pub use algorithm::{ClosureSolver, ParametricSolver, SolveError, SolveStats, Solution};
pub use config::{ConfigError, RelabelPolicy, SolverConfig};
pub use data_structures::{Cluster, ClusterBuilder, ClusterError, FeeRate, ItemSet};
pub use protocol::{format_solution, parse_claim, parse_cluster, parse_problem_and_claim, ProtocolError};
pub use validation::{validate, BruteForceSolver, Claim, FractionalSolver, Rejection};
