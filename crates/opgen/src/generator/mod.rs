//! Generator tree: an index over operator preconditions.
//!
//! Purpose
//! - Answer "which operators are applicable here?" for full states and for
//!   partial assignments (unassigned variables act as wildcards) without
//!   scanning every operator.
//!
//! Why this design
//! - Closed node set (`Fork`, `Switch`, `Leaf`) as one enum; both query modes
//!   are a single recursive `match`.
//! - Children are owned (`Box`/`Vec`/`IndexMap`), the tree is immutable after
//!   `GeneratorFactory::build`, so queries take `&self` and the tree is
//!   `Send + Sync`.
//! - Switch storage (dense vector vs. sparse map) is a pluggable
//!   `SwitchLayoutPolicy`; it affects memory only.
//!
//! Layout
//! - `types.rs` (nodes, stats), `build.rs` (factory), `query.rs` (traversal),
//!   `policy.rs` (switch storage choice).

mod build;
mod policy;
mod query;
mod types;

pub use build::GeneratorFactory;
pub use policy::{
    estimate_dense_bytes, estimate_sparse_bytes, AlwaysDense, AlwaysSparse, MemoryEstimate,
    SwitchLayout, SwitchLayoutPolicy,
};
pub use types::{GeneratorNode, GeneratorStats, GeneratorTree, Switch, SwitchChildren};

#[cfg(test)]
mod tests;
