use std::time::Instant;

use crate::generator::{GeneratorFactory, GeneratorTree};
use crate::regression::{RegressionOperator, RegressionTask};
use crate::task::{OperatorId, PartialAssignment, Task, TaskId};

/// Backward applicability index: a tree over regression preconditions plus
/// the regression operators needed for the achievement check.
#[derive(Clone, Debug)]
pub struct PredecessorGenerator {
    task: RegressionTask,
    tree: GeneratorTree,
}

impl PredecessorGenerator {
    pub fn new(task: RegressionTask) -> Self {
        let start = Instant::now();
        let tree = GeneratorFactory::new(task.domain_sizes()).build(task.operators());
        let stats = tree.stats();
        tracing::info!(
            task = ?task.task_id(),
            operators = stats.operators,
            switches = stats.switches(),
            forks = stats.forks,
            depth = stats.max_switch_depth,
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "predecessor generator built"
        );
        Self { task, tree }
    }

    pub fn from_task(task: &Task) -> Self {
        Self::new(RegressionTask::new(task))
    }

    pub fn task_id(&self) -> TaskId {
        self.task.task_id()
    }

    pub fn regression_task(&self) -> &RegressionTask {
        &self.task
    }

    pub fn operator(&self, id: OperatorId) -> &RegressionOperator {
        self.task.operator(id)
    }

    pub fn tree(&self) -> &GeneratorTree {
        &self.tree
    }

    /// Regression operators applicable to `assignment` that also achieve part
    /// of it.
    pub fn generate_applicable_ops(&self, assignment: &PartialAssignment) -> Vec<OperatorId> {
        let mut out = Vec::new();
        self.generate_applicable_ops_into(assignment, &mut out);
        out
    }

    pub fn generate_applicable_ops_into(
        &self,
        assignment: &PartialAssignment,
        out: &mut Vec<OperatorId>,
    ) {
        let start = out.len();
        self.tree.generate_applicable_ops(assignment, out);
        let mut keep = start;
        for i in start..out.len() {
            if self.task.operator(out[i]).achieves_subgoal(assignment) {
                out[keep] = out[i];
                keep += 1;
            }
        }
        out.truncate(keep);
    }

    /// Minimum-id probe on the tree alone; the achievement check is not applied.
    pub fn generate_min_applicable_op(
        &self,
        assignment: &PartialAssignment,
        reject_unassigned: bool,
    ) -> Option<OperatorId> {
        self.tree
            .generate_min_applicable_op(assignment, reject_unassigned)
    }
}
