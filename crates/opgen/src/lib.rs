//! Operator generators for finite-domain planning tasks.
//!
//! Builds a decision tree over operator preconditions once per task and
//! answers "which operators apply?" for full states (forward search) and for
//! partial assignments (regression), plus random-walk sampling on top.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API.
//! - Prefer clarity over compatibility; `api` is the curated surface for
//!   callers such as the CLI and benches.

pub mod api;
pub mod facade;
pub mod generator;
pub mod randtask;
pub mod regression;
pub mod sampling;
pub mod task;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use facade::{GeneratorCache, PredecessorGenerator, SuccessorGenerator};
pub use task::{Fact, OperatorId, PartialAssignment, State, Task, Value};

/// Common exports for quick imports in callers and tests.
pub mod prelude {
    pub use crate::facade::{GeneratorCache, PredecessorGenerator, SuccessorGenerator};
    pub use crate::generator::{GeneratorFactory, GeneratorTree};
    pub use crate::regression::{IndexedOperator, RegressionOperator, RegressionTask};
    pub use crate::sampling::{RandomRegressionWalkSampler, RandomWalkSampler, WalkCfg, WalkHooks};
    pub use crate::task::{
        Effect, Fact, MutexTable, Operator, OperatorId, PartialAssignment, State, Task, Value,
        Variable,
    };
}
