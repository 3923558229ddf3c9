//! Random ground tasks for tests, benchmarks and the CLI.
//!
//! Purpose
//! - Reproducible task streams: every sample carries the params snapshot and
//!   the seed that regenerates it.
//!
//! Why this design
//! - `RandomTaskGenerator` exposes streaming (`generate_next`) and replay
//!   (`regenerate`) entry points over one `generate_single(params, seed)`.
//! - Tasks go through `Task::new`, so they satisfy the same validation as
//!   loaded ones.

use rand::rngs::StdRng;
use rand::seq::index::sample as sample_indices;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;

use crate::task::{
    Effect, Fact, MutexTable, Operator, OperatorId, Task, TaskError, Value, Variable,
};

#[derive(Debug)]
pub enum RandomTaskError {
    InvalidParams { reason: String },
    InvalidTask(TaskError),
}

impl RandomTaskError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RandomTaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams { reason } => write!(f, "invalid random task params: {reason}"),
            Self::InvalidTask(err) => write!(f, "generated task is invalid: {err}"),
        }
    }
}

impl std::error::Error for RandomTaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::InvalidParams { .. } => None,
        }
    }
}

impl From<TaskError> for RandomTaskError {
    fn from(err: TaskError) -> Self {
        Self::InvalidTask(err)
    }
}

/// Shape of the generated tasks. Ranges are inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomTaskParams {
    pub num_variables: usize,
    pub domain_min: usize,
    pub domain_max: usize,
    pub num_operators: usize,
    pub max_preconditions: usize,
    pub max_effects: usize,
    pub cost_min: u32,
    pub cost_max: u32,
    /// Chance that an effect gets one firing condition.
    pub conditional_effect_prob: f64,
    pub goal_size: usize,
}

impl Default for RandomTaskParams {
    fn default() -> Self {
        Self {
            num_variables: 8,
            domain_min: 2,
            domain_max: 4,
            num_operators: 40,
            max_preconditions: 3,
            max_effects: 2,
            cost_min: 1,
            cost_max: 1,
            conditional_effect_prob: 0.0,
            goal_size: 2,
        }
    }
}

impl RandomTaskParams {
    pub fn validate(&self) -> Result<(), RandomTaskError> {
        if self.num_variables == 0 {
            return Err(RandomTaskError::invalid("need at least one variable"));
        }
        if self.domain_min < 2 {
            return Err(RandomTaskError::invalid("domain_min must be >= 2"));
        }
        if self.domain_min > self.domain_max {
            return Err(RandomTaskError::invalid("domain_min <= domain_max required"));
        }
        if self.domain_max > Value::MAX as usize {
            return Err(RandomTaskError::invalid("domain_max exceeds the value range"));
        }
        if self.max_preconditions > self.num_variables {
            return Err(RandomTaskError::invalid(
                "max_preconditions must not exceed num_variables",
            ));
        }
        if self.max_effects == 0 || self.max_effects > self.num_variables {
            return Err(RandomTaskError::invalid(
                "max_effects must be in 1..=num_variables",
            ));
        }
        if self.cost_min > self.cost_max {
            return Err(RandomTaskError::invalid("cost_min <= cost_max required"));
        }
        if !(0.0..=1.0).contains(&self.conditional_effect_prob) {
            return Err(RandomTaskError::invalid(
                "conditional_effect_prob must lie in [0, 1]",
            ));
        }
        if self.goal_size > self.num_variables {
            return Err(RandomTaskError::invalid(
                "goal_size must not exceed num_variables",
            ));
        }
        Ok(())
    }
}

/// Replay token: the seed that regenerates one task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedReplay {
    pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct RandomTaskSample {
    pub task: Task,
    pub params: RandomTaskParams,
    pub replay: SeedReplay,
}

pub struct RandomTaskGenerator {
    params: RandomTaskParams,
    master_rng: StdRng,
}

impl RandomTaskGenerator {
    pub fn new(params: RandomTaskParams, seed: u64) -> Result<Self, RandomTaskError> {
        params.validate()?;
        Ok(Self {
            params,
            master_rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn params(&self) -> &RandomTaskParams {
        &self.params
    }

    pub fn generate_next(&mut self) -> Result<RandomTaskSample, RandomTaskError> {
        let seed = self.master_rng.next_u64();
        let task = Self::generate_single(&self.params, seed)?;
        Ok(RandomTaskSample {
            task,
            params: self.params.clone(),
            replay: SeedReplay { seed },
        })
    }

    pub fn regenerate(&self, replay: &SeedReplay) -> Result<Task, RandomTaskError> {
        Self::generate_single(&self.params, replay.seed)
    }

    pub fn generate_single(params: &RandomTaskParams, seed: u64) -> Result<Task, RandomTaskError> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let n = params.num_variables;

        let variables: Vec<Variable> = (0..n)
            .map(|i| Variable {
                name: format!("var{i}"),
                domain_size: rng.gen_range(params.domain_min..=params.domain_max),
            })
            .collect();
        let domains: Vec<usize> = variables.iter().map(|v| v.domain_size).collect();

        let operators = (0..params.num_operators)
            .map(|i| random_operator(&mut rng, params, &domains, OperatorId(i)))
            .collect();
        let initial_state = domains
            .iter()
            .map(|&d| random_value(&mut rng, d))
            .collect();
        let goal = {
            let mut vars = sample_indices(&mut rng, n, params.goal_size).into_vec();
            vars.sort_unstable();
            vars.into_iter()
                .map(|var| Fact::new(var, random_value(&mut rng, domains[var])))
                .collect()
        };
        Ok(Task::new(
            variables,
            operators,
            initial_state,
            goal,
            MutexTable::new(),
        )?)
    }
}

fn random_value(rng: &mut StdRng, domain_size: usize) -> Value {
    rng.gen_range(0..domain_size) as Value
}

/// No variable repeats within the preconditions or within the effects. An
/// effect on a precondition variable always changes its value.
fn random_operator(
    rng: &mut StdRng,
    params: &RandomTaskParams,
    domains: &[usize],
    id: OperatorId,
) -> Operator {
    let n = domains.len();
    let num_pre = rng.gen_range(0..=params.max_preconditions);
    let mut pre_vars = sample_indices(rng, n, num_pre).into_vec();
    pre_vars.sort_unstable();
    let preconditions: Vec<Fact> = pre_vars
        .iter()
        .map(|&var| Fact::new(var, random_value(rng, domains[var])))
        .collect();

    let num_eff = rng.gen_range(1..=params.max_effects);
    let mut eff_vars = sample_indices(rng, n, num_eff).into_vec();
    eff_vars.sort_unstable();
    let effects = eff_vars
        .into_iter()
        .map(|var| {
            let value = match preconditions.iter().find(|f| f.var == var) {
                // Shift by 1..domain to skip the precondition value.
                Some(pre) => {
                    let shift = rng.gen_range(1..domains[var]) as Value;
                    (pre.value + shift) % domains[var] as Value
                }
                None => random_value(rng, domains[var]),
            };
            let conditions = if n > 1 && rng.gen_bool(params.conditional_effect_prob) {
                let mut cvar = rng.gen_range(0..n - 1);
                if cvar >= var {
                    cvar += 1;
                }
                vec![Fact::new(cvar, random_value(rng, domains[cvar]))]
            } else {
                Vec::new()
            };
            Effect {
                fact: Fact::new(var, value),
                conditions,
            }
        })
        .collect();

    Operator {
        id,
        name: format!("op{}", id.0),
        cost: rng.gen_range(params.cost_min..=params.cost_max),
        preconditions,
        effects,
    }
}
