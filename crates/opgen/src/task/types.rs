//! Task data: variables, facts, operators and the mutex table.
//!
//! A `Task` is validated once at construction; everything downstream (the
//! generator factory, regression, sampling) may then index without checks.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::state::{PartialAssignment, State};

/// Value of a state variable, in `0..domain_size`.
pub type Value = u32;

/// A `(variable, value)` pair. Orders lexicographically by variable, then value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fact {
    pub var: usize,
    pub value: Value,
}

impl Fact {
    pub const fn new(var: usize, value: Value) -> Self {
        Self { var, value }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}={}", self.var, self.value)
    }
}

/// Identifier types for clarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperatorId(pub usize);

/// Identity of a constructed task. Clones share it; modified tasks get a fresh one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub domain_size: usize,
}

/// An effect `fact` that fires when all `conditions` hold in the pre-state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effect {
    pub fact: Fact,
    pub conditions: Vec<Fact>,
}

impl Effect {
    pub fn unconditional(fact: Fact) -> Self {
        Self {
            fact,
            conditions: Vec::new(),
        }
    }

    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    pub id: OperatorId,
    pub name: String,
    pub cost: u32,
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Effect>,
}

impl Operator {
    pub fn is_applicable(&self, state: &State) -> bool {
        self.preconditions
            .iter()
            .all(|pre| state.get(pre.var) == pre.value)
    }
}

/// Symmetric set of mutually exclusive fact pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutexTable {
    pairs: HashSet<(Fact, Fact)>,
}

impl MutexTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: Fact, b: Fact) {
        self.pairs.insert(ordered(a, b));
    }

    pub fn are_facts_mutex(&self, a: Fact, b: Fact) -> bool {
        if a.var == b.var {
            // Two values of one variable never hold together.
            return a.value != b.value;
        }
        self.pairs.contains(&ordered(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Stored pairs, each once with the smaller fact first; unordered.
    pub fn iter(&self) -> impl Iterator<Item = &(Fact, Fact)> {
        self.pairs.iter()
    }
}

impl FromIterator<(Fact, Fact)> for MutexTable {
    fn from_iter<I: IntoIterator<Item = (Fact, Fact)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (a, b) in iter {
            table.insert(a, b);
        }
        table
    }
}

fn ordered(a: Fact, b: Fact) -> (Fact, Fact) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Error type for task construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    EmptyDomain { var: usize },
    /// Domain values must stay below `Value::MAX`, which marks unassigned.
    DomainTooLarge { var: usize, domain_size: usize },
    OperatorIdMismatch { position: usize, id: OperatorId },
    FactOutOfRange { context: String, fact: Fact },
    StateLength { expected: usize, actual: usize },
}

impl TaskError {
    fn out_of_range(context: impl Into<String>, fact: Fact) -> Self {
        Self::FactOutOfRange {
            context: context.into(),
            fact,
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain { var } => write!(f, "variable {var} has an empty domain"),
            Self::DomainTooLarge { var, domain_size } => write!(
                f,
                "variable {var} has {domain_size} values, at most {} are supported",
                Value::MAX
            ),
            Self::OperatorIdMismatch { position, id } => write!(
                f,
                "operator at position {position} carries id {}",
                id.0
            ),
            Self::FactOutOfRange { context, fact } => {
                write!(f, "fact {fact} out of range in {context}")
            }
            Self::StateLength { expected, actual } => write!(
                f,
                "state has {actual} values but the task has {expected} variables"
            ),
        }
    }
}

impl std::error::Error for TaskError {}

/// A ground planning task in finite-domain representation.
#[derive(Clone, Debug)]
pub struct Task {
    id: TaskId,
    variables: Vec<Variable>,
    domain_sizes: Vec<usize>,
    operators: Vec<Operator>,
    initial_state: Vec<Value>,
    goal: Vec<Fact>,
    mutexes: MutexTable,
}

impl Task {
    pub fn new(
        variables: Vec<Variable>,
        operators: Vec<Operator>,
        initial_state: Vec<Value>,
        goal: Vec<Fact>,
        mutexes: MutexTable,
    ) -> Result<Self, TaskError> {
        let domain_sizes: Vec<usize> = variables.iter().map(|v| v.domain_size).collect();
        if let Some(var) = domain_sizes.iter().position(|&d| d == 0) {
            return Err(TaskError::EmptyDomain { var });
        }
        if let Some(var) = domain_sizes.iter().position(|&d| d > Value::MAX as usize) {
            return Err(TaskError::DomainTooLarge {
                var,
                domain_size: domain_sizes[var],
            });
        }
        let check = |context: &dyn Fn() -> String, fact: Fact| {
            if in_domain(&domain_sizes, fact) {
                Ok(())
            } else {
                Err(TaskError::out_of_range(context(), fact))
            }
        };
        for (position, op) in operators.iter().enumerate() {
            if op.id.0 != position {
                return Err(TaskError::OperatorIdMismatch {
                    position,
                    id: op.id,
                });
            }
            let ctx = || format!("operator '{}'", op.name);
            for &pre in &op.preconditions {
                check(&ctx, pre)?;
            }
            for eff in &op.effects {
                check(&ctx, eff.fact)?;
                for &cond in &eff.conditions {
                    check(&ctx, cond)?;
                }
            }
        }
        if initial_state.len() != domain_sizes.len() {
            return Err(TaskError::StateLength {
                expected: domain_sizes.len(),
                actual: initial_state.len(),
            });
        }
        for (var, &value) in initial_state.iter().enumerate() {
            check(&|| "initial state".to_string(), Fact::new(var, value))?;
        }
        for &g in &goal {
            check(&|| "goal".to_string(), g)?;
        }
        for &(a, b) in mutexes.iter() {
            check(&|| "mutex table".to_string(), a)?;
            check(&|| "mutex table".to_string(), b)?;
        }
        Ok(Self {
            id: TaskId::fresh(),
            variables,
            domain_sizes,
            operators,
            initial_state,
            goal,
            mutexes,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn operator(&self, id: OperatorId) -> &Operator {
        &self.operators[id.0]
    }

    pub fn initial_state(&self) -> State {
        State::from_trusted(self.initial_state.clone())
    }

    pub fn goal(&self) -> &[Fact] {
        &self.goal
    }

    /// The goal as a partial assignment over the goal variables.
    pub fn goal_assignment(&self) -> PartialAssignment {
        let mut goal = PartialAssignment::unassigned(self.num_variables());
        for g in &self.goal {
            goal.set(g.var, Some(g.value));
        }
        goal
    }

    pub fn mutexes(&self) -> &MutexTable {
        &self.mutexes
    }

    pub fn are_facts_mutex(&self, a: Fact, b: Fact) -> bool {
        self.mutexes.are_facts_mutex(a, b)
    }

    pub fn is_unit_cost(&self) -> bool {
        self.operators.iter().all(|op| op.cost == 1)
    }

    pub fn has_conditional_effects(&self) -> bool {
        self.operators
            .iter()
            .any(|op| op.effects.iter().any(Effect::is_conditional))
    }

    /// Mean operator cost; 0.0 for a task without operators.
    pub fn average_operator_cost(&self) -> f64 {
        if self.operators.is_empty() {
            return 0.0;
        }
        let total: u64 = self.operators.iter().map(|op| u64::from(op.cost)).sum();
        total as f64 / self.operators.len() as f64
    }

    /// Same variables and operators with another initial state (fresh identity).
    pub fn with_initial_state(&self, state: &State) -> Result<Self, TaskError> {
        Self::new(
            self.variables.clone(),
            self.operators.clone(),
            state.values().to_vec(),
            self.goal.clone(),
            self.mutexes.clone(),
        )
    }

    /// Same variables and operators with another goal (fresh identity).
    pub fn with_goal(&self, goal: Vec<Fact>) -> Result<Self, TaskError> {
        Self::new(
            self.variables.clone(),
            self.operators.clone(),
            self.initial_state.clone(),
            goal,
            self.mutexes.clone(),
        )
    }
}

pub(crate) fn in_domain(domain_sizes: &[usize], fact: Fact) -> bool {
    fact.var < domain_sizes.len() && (fact.value as usize) < domain_sizes[fact.var]
}
