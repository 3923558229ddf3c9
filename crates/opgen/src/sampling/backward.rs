use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::facade::{GeneratorCache, PredecessorGenerator};
use crate::task::{OperatorId, PartialAssignment, Task};

use super::registry::PartialAssignmentRegistry;
use super::walk::{random_walk, walk_length, WalkCfg, WalkHooks, WalkSpace};

struct RegressionSpace<'a> {
    generator: &'a PredecessorGenerator,
}

impl WalkSpace for RegressionSpace<'_> {
    type Node = PartialAssignment;

    fn applicable(&self, node: &PartialAssignment, out: &mut Vec<OperatorId>) {
        self.generator.generate_applicable_ops_into(node, out);
    }

    fn candidate(&self, node: &PartialAssignment, op: OperatorId) -> PartialAssignment {
        self.generator.operator(op).predecessor(node)
    }
}

/// Result of `sample_area`: every registered assignment and, for the expanded
/// ones, the cheapest regression cost from the start (in expansion order).
#[derive(Clone, Debug, Default)]
pub struct AreaSample {
    pub registry: PartialAssignmentRegistry,
    pub costs: IndexMap<usize, u64>,
}

impl AreaSample {
    /// Expanded assignments with their costs.
    pub fn expanded(&self) -> impl Iterator<Item = (&PartialAssignment, u64)> + '_ {
        self.costs
            .iter()
            .map(|(&id, &cost)| (self.registry.lookup(id), cost))
    }
}

/// Samples partial assignments with backward walks from the goal.
pub struct RandomRegressionWalkSampler<'a> {
    task: &'a Task,
    generator: Arc<PredecessorGenerator>,
    goal: PartialAssignment,
    average_operator_cost: f64,
    rng: StdRng,
}

impl<'a> RandomRegressionWalkSampler<'a> {
    pub fn new(task: &'a Task, cache: &GeneratorCache, seed: u64) -> Self {
        let generator = cache.predecessor_generator(task);
        let goal = generator.regression_task().goal_assignment().clone();
        let average_operator_cost = generator.regression_task().average_operator_cost();
        Self {
            task,
            generator,
            goal,
            average_operator_cost,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One walk from the goal with a length drawn by `walk_length`.
    pub fn sample_state(
        &mut self,
        init_h: u64,
        cfg: &WalkCfg,
        hooks: &WalkHooks<'_, PartialAssignment>,
    ) -> PartialAssignment {
        let length = walk_length(init_h, self.average_operator_cost, &mut self.rng);
        let goal = self.goal.clone();
        self.sample_state_length(&goal, length, cfg, hooks)
    }

    pub fn sample_state_length(
        &mut self,
        start: &PartialAssignment,
        length: usize,
        cfg: &WalkCfg,
        hooks: &WalkHooks<'_, PartialAssignment>,
    ) -> PartialAssignment {
        let space = RegressionSpace {
            generator: &self.generator,
        };
        random_walk(&space, start, length, cfg, hooks, &mut self.rng)
    }

    pub fn sample_states(
        &mut self,
        num_samples: usize,
        init_h: u64,
        cfg: &WalkCfg,
        hooks: &WalkHooks<'_, PartialAssignment>,
    ) -> Vec<PartialAssignment> {
        let samples: Vec<PartialAssignment> = (0..num_samples)
            .map(|_| self.sample_state(init_h, cfg, hooks))
            .collect();
        tracing::debug!(samples = samples.len(), init_h, "regression walks done");
        samples
    }

    /// Uniform-cost exploration of regression space around `initial`.
    ///
    /// Stops when the cheapest open entry exceeds `max_cost` or once
    /// `max_states` assignments are expanded. With `check_mutexes`,
    /// predecessors violating a mutex are dropped.
    pub fn sample_area(
        &self,
        initial: &PartialAssignment,
        max_cost: u64,
        max_states: Option<usize>,
        check_mutexes: bool,
    ) -> AreaSample {
        let mut area = AreaSample::default();
        let mut open: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();
        let mut ops = Vec::new();
        open.push(Reverse((0, area.registry.lookup_or_insert(initial.clone()))));

        let mut progress: Option<u64> = None;
        while let Some(Reverse((cost, id))) = open.pop() {
            if progress.map_or(true, |p| cost > p) {
                progress = Some(cost);
                tracing::debug!(cost, open = open.len(), "area frontier");
            }
            if cost > max_cost {
                tracing::info!(expanded = area.costs.len(), "area hit cost limit");
                break;
            }
            if area.costs.contains_key(&id) {
                continue;
            }
            area.costs.insert(id, cost);
            if max_states.is_some_and(|max| area.costs.len() >= max) {
                tracing::info!(expanded = area.costs.len(), "area hit state limit");
                break;
            }

            let current = area.registry.lookup(id).clone();
            ops.clear();
            self.generator.generate_applicable_ops_into(&current, &mut ops);
            for &op in &ops {
                let rop = self.generator.operator(op);
                let next = rop.predecessor(&current);
                if check_mutexes && next.violates_mutexes(self.task) {
                    continue;
                }
                let next_id = area.registry.lookup_or_insert(next);
                open.push(Reverse((cost + u64::from(rop.cost()), next_id)));
            }
        }
        area
    }
}
