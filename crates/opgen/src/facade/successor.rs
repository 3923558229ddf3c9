use std::time::Instant;

use crate::generator::{GeneratorFactory, GeneratorTree};
use crate::task::{OperatorId, PartialAssignment, State, Task, TaskId};

/// Forward applicability index of one task.
#[derive(Clone, Debug)]
pub struct SuccessorGenerator {
    task_id: TaskId,
    tree: GeneratorTree,
}

impl SuccessorGenerator {
    pub fn new(task: &Task) -> Self {
        let start = Instant::now();
        let tree = GeneratorFactory::new(task.domain_sizes()).build(task.operators());
        let stats = tree.stats();
        tracing::info!(
            task = ?task.id(),
            operators = stats.operators,
            switches = stats.switches(),
            forks = stats.forks,
            depth = stats.max_switch_depth,
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "successor generator built"
        );
        Self {
            task_id: task.id(),
            tree,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn tree(&self) -> &GeneratorTree {
        &self.tree
    }

    /// Operators applicable in `state`, in tree order.
    pub fn generate_applicable_ops(&self, state: &State) -> Vec<OperatorId> {
        let mut out = Vec::new();
        self.generate_applicable_ops_into(state, &mut out);
        out
    }

    /// Like `generate_applicable_ops`, appending to `out` to reuse its buffer.
    pub fn generate_applicable_ops_into(&self, state: &State, out: &mut Vec<OperatorId>) {
        self.tree.generate_applicable_ops(state.as_partial(), out);
    }

    pub fn generate_min_applicable_op(
        &self,
        assignment: &PartialAssignment,
        reject_unassigned: bool,
    ) -> Option<OperatorId> {
        self.tree
            .generate_min_applicable_op(assignment, reject_unassigned)
    }
}
