use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::facade::{GeneratorCache, SuccessorGenerator};
use crate::task::{OperatorId, State, Task};

use super::walk::{random_walk, walk_length, WalkCfg, WalkHooks, WalkSpace};

struct ForwardSpace<'a> {
    task: &'a Task,
    generator: &'a SuccessorGenerator,
}

impl WalkSpace for ForwardSpace<'_> {
    type Node = State;

    fn applicable(&self, node: &State, out: &mut Vec<OperatorId>) {
        self.generator.generate_applicable_ops_into(node, out);
    }

    fn candidate(&self, node: &State, op: OperatorId) -> State {
        node.successor(self.task.operator(op))
    }
}

/// Samples full states with forward random walks from the initial state.
pub struct RandomWalkSampler<'a> {
    task: &'a Task,
    generator: Arc<SuccessorGenerator>,
    initial_state: State,
    average_operator_cost: f64,
    rng: StdRng,
}

impl<'a> RandomWalkSampler<'a> {
    pub fn new(task: &'a Task, cache: &GeneratorCache, seed: u64) -> Self {
        Self {
            task,
            generator: cache.successor_generator(task),
            initial_state: task.initial_state(),
            average_operator_cost: task.average_operator_cost(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One walk from the initial state with a length drawn by `walk_length`.
    pub fn sample_state(
        &mut self,
        init_h: u64,
        cfg: &WalkCfg,
        hooks: &WalkHooks<'_, State>,
    ) -> State {
        let length = walk_length(init_h, self.average_operator_cost, &mut self.rng);
        let start = self.initial_state.clone();
        self.sample_state_length(&start, length, cfg, hooks)
    }

    pub fn sample_state_length(
        &mut self,
        start: &State,
        length: usize,
        cfg: &WalkCfg,
        hooks: &WalkHooks<'_, State>,
    ) -> State {
        let space = ForwardSpace {
            task: self.task,
            generator: &self.generator,
        };
        random_walk(&space, start, length, cfg, hooks, &mut self.rng)
    }

    pub fn sample_states(
        &mut self,
        num_samples: usize,
        init_h: u64,
        cfg: &WalkCfg,
        hooks: &WalkHooks<'_, State>,
    ) -> Vec<State> {
        let samples: Vec<State> = (0..num_samples)
            .map(|_| self.sample_state(init_h, cfg, hooks))
            .collect();
        tracing::debug!(samples = samples.len(), init_h, "forward walks done");
        samples
    }
}
