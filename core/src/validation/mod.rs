//! Validation Framework
//!
//! Reference solvers and the checker that judges claimed solutions against
//! them.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod checker;
pub mod oracle;

pub use self::checker::{reference_solver, validate, Claim, Rejection};
pub use self::oracle::{cross_weights, BruteForceSolver, FractionalSolver};
