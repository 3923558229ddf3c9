use crate::task::{OperatorId, PartialAssignment, Task, TaskId};

use super::operator::RegressionOperator;

/// The regression view of a task: one regression operator per forward operator
/// (same ids) and the goal as the starting partial assignment.
#[derive(Clone, Debug)]
pub struct RegressionTask {
    task_id: TaskId,
    domain_sizes: Vec<usize>,
    operators: Vec<RegressionOperator>,
    goal: PartialAssignment,
}

impl RegressionTask {
    pub fn new(task: &Task) -> Self {
        let operators = task
            .operators()
            .iter()
            .map(RegressionOperator::from_operator)
            .collect();
        Self {
            task_id: task.id(),
            domain_sizes: task.domain_sizes().to_vec(),
            operators,
            goal: task.goal_assignment(),
        }
    }

    /// Identity of the forward task this view was derived from.
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn num_variables(&self) -> usize {
        self.domain_sizes.len()
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    pub fn operators(&self) -> &[RegressionOperator] {
        &self.operators
    }

    pub fn operator(&self, id: OperatorId) -> &RegressionOperator {
        let op = &self.operators[id.0];
        debug_assert_eq!(op.id(), id);
        op
    }

    pub fn goal_assignment(&self) -> &PartialAssignment {
        &self.goal
    }

    pub fn average_operator_cost(&self) -> f64 {
        if self.operators.is_empty() {
            return 0.0;
        }
        let total: u64 = self.operators.iter().map(|op| u64::from(op.cost())).sum();
        total as f64 / self.operators.len() as f64
    }
}
