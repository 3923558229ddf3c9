//! Per-task generator facades.
//!
//! `SuccessorGenerator` answers forward queries on full states;
//! `PredecessorGenerator` answers regression queries on partial assignments
//! and filters out operators that achieve nothing. `GeneratorCache` keeps one
//! of each per task identity and is owned by whoever drives the task.

mod cache;
mod predecessor;
mod successor;

pub use cache::{GeneratorCache, PerTaskSlot};
pub use predecessor::PredecessorGenerator;
pub use successor::SuccessorGenerator;

#[cfg(test)]
mod tests;
