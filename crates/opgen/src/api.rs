//! Curated internal API (UNSTABLE).
//!
//! Important
//! - This is not a public API. It is a convenience surface for the CLI,
//!   benches and experiments. Breaking changes are allowed and expected.

// Task model
pub use crate::task::{
    Effect, Fact, MutexTable, Operator, OperatorId, PartialAssignment, State, Task, TaskError,
    TaskId, Value, Variable,
};
// Regression view
pub use crate::regression::{IndexedOperator, RegressionEffect, RegressionOperator, RegressionTask};
// Generator tree
pub use crate::generator::{
    AlwaysDense, AlwaysSparse, GeneratorFactory, GeneratorNode, GeneratorStats, GeneratorTree,
    MemoryEstimate, SwitchLayout, SwitchLayoutPolicy,
};
// Facades
pub use crate::facade::{GeneratorCache, PerTaskSlot, PredecessorGenerator, SuccessorGenerator};
// Sampling
pub use crate::sampling::{
    walk_length, AreaSample, PartialAssignmentRegistry, RandomRegressionWalkSampler,
    RandomWalkSampler, WalkCfg, WalkHooks, MAX_WALK_TRIALS,
};
// Random tasks
pub use crate::randtask::{
    RandomTaskError, RandomTaskGenerator, RandomTaskParams, RandomTaskSample, SeedReplay,
};
