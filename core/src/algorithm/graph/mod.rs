//! Flow algorithms over dependency graphs

pub mod min_cut;

pub use self::min_cut::{
    max_weight_closure, Capacities, Capacity, DistanceLabel, FlowError, FlowMetrics, FlowState, MinCutEngine,
    TerminalArc,
};
