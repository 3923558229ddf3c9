//! State model and task abstraction.
//!
//! Purpose
//! - Dense per-variable assignments (`State`, `PartialAssignment`) with a
//!   private "unassigned" sentinel for partial ones.
//! - A validated ground task (`Task`): variables with finite domains,
//!   operators with preconditions and conditional effects, goal and mutexes.
//!
//! Everything downstream reads values by variable index in O(1); the task is
//! validated once so the hot paths never re-check domains.

mod state;
mod types;

pub(crate) use state::UNASSIGNED;
pub use state::{PartialAssignment, State};
pub(crate) use types::in_domain;
pub use types::{
    Effect, Fact, MutexTable, Operator, OperatorId, Task, TaskError, TaskId, Value, Variable,
};
