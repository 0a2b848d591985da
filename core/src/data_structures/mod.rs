//! Value and set primitives shared by every solver
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod cluster;
pub mod fee_rate;
pub mod item_set;

pub use self::cluster::{Cluster, ClusterBuilder, ClusterError};
pub use self::fee_rate::FeeRate;
pub use self::item_set::ItemSet;
