//! Dense variable assignments: partial assignments and full states.
//!
//! Both store one `Value` per variable. Partial assignments mark free
//! variables with a crate-private sentinel that lies outside every domain;
//! the public surface only ever speaks `Option<Value>`.

use rand::seq::SliceRandom;
use rand::Rng;

use super::types::{in_domain, Fact, Operator, Task, TaskError, Value};

/// Marker for an unassigned variable. Never a valid domain value.
pub(crate) const UNASSIGNED: Value = Value::MAX;

/// Number of random variable orders tried when completing under mutexes.
const MAX_TRIES_EXTEND: usize = 10_000;

/// A variable assignment in which any variable may be left free.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartialAssignment {
    values: Vec<Value>,
}

impl PartialAssignment {
    /// The assignment over `num_variables` variables with nothing assigned.
    pub fn unassigned(num_variables: usize) -> Self {
        Self {
            values: vec![UNASSIGNED; num_variables],
        }
    }

    /// Build from per-variable options, validating length and domains.
    pub fn from_options(task: &Task, values: Vec<Option<Value>>) -> Result<Self, TaskError> {
        if values.len() != task.num_variables() {
            return Err(TaskError::StateLength {
                expected: task.num_variables(),
                actual: values.len(),
            });
        }
        let mut out = Self::unassigned(values.len());
        for (var, value) in values.into_iter().enumerate() {
            if let Some(value) = value {
                let fact = Fact::new(var, value);
                if !in_domain(task.domain_sizes(), fact) {
                    return Err(TaskError::FactOutOfRange {
                        context: "partial assignment".to_string(),
                        fact,
                    });
                }
                out.values[var] = value;
            }
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, var: usize) -> Option<Value> {
        let value = self.values[var];
        (value != UNASSIGNED).then_some(value)
    }

    #[inline]
    pub fn is_assigned(&self, var: usize) -> bool {
        self.values[var] != UNASSIGNED
    }

    pub(crate) fn set(&mut self, var: usize, value: Option<Value>) {
        self.values[var] = value.unwrap_or(UNASSIGNED);
    }

    /// Copy with `var` set to `value` (or freed for `None`).
    pub fn with_value(&self, var: usize, value: Option<Value>) -> Self {
        let mut out = self.clone();
        out.set(var, value);
        out
    }

    pub fn num_assigned(&self) -> usize {
        self.values.iter().filter(|&&v| v != UNASSIGNED).count()
    }

    pub fn is_full(&self) -> bool {
        self.values.iter().all(|&v| v != UNASSIGNED)
    }

    /// Assigned facts in variable order.
    pub fn facts(&self) -> impl Iterator<Item = Fact> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != UNASSIGNED)
            .map(|(var, &value)| Fact::new(var, value))
    }

    /// True if every assigned variable agrees with `state`.
    pub fn is_consistent_with(&self, state: &State) -> bool {
        self.facts().all(|f| state.get(f.var) == f.value)
    }

    /// Raw value array including sentinels; used by the generator tree.
    #[inline]
    pub(crate) fn raw(&self) -> &[Value] {
        &self.values
    }

    pub fn violates_mutexes(&self, task: &Task) -> bool {
        contains_mutex(task, &self.values)
    }

    /// Fill the free variables with random values.
    ///
    /// With `check_mutexes`, returns `None` if the assigned part already
    /// violates a mutex or no mutex-free completion is found within a bounded
    /// number of random variable orders.
    pub fn complete<R: Rng>(
        &self,
        task: &Task,
        check_mutexes: bool,
        rng: &mut R,
    ) -> Option<State> {
        let mut values = self.values.clone();
        if !check_mutexes {
            for (var, value) in values.iter_mut().enumerate() {
                if *value == UNASSIGNED {
                    *value = rng.gen_range(0..task.domain_sizes()[var]) as Value;
                }
            }
            return Some(State::from_trusted(values));
        }
        if contains_mutex(task, &values) {
            return None;
        }
        let mut order: Vec<usize> = (0..values.len()).collect();
        for _ in 0..MAX_TRIES_EXTEND {
            order.shuffle(rng);
            let mut candidate = values.clone();
            let ok = order
                .iter()
                .filter(|&&var| values[var] == UNASSIGNED)
                .all(|&var| replace_with_non_mutex_value(task, &mut candidate, var, rng));
            if ok {
                return Some(State::from_trusted(candidate));
            }
        }
        None
    }
}

fn contains_mutex_with_variable(task: &Task, var: usize, values: &[Value], from: usize) -> bool {
    if values[var] == UNASSIGNED {
        return false;
    }
    let fact = Fact::new(var, values[var]);
    (from..values.len())
        .filter(|&var2| var2 != var && values[var2] != UNASSIGNED)
        .any(|var2| task.are_facts_mutex(fact, Fact::new(var2, values[var2])))
}

fn contains_mutex(task: &Task, values: &[Value]) -> bool {
    if task.mutexes().is_empty() {
        return false;
    }
    (0..values.len()).any(|var| contains_mutex_with_variable(task, var, values, var + 1))
}

/// Try the values of `var` in random order; keep the first one without a mutex.
fn replace_with_non_mutex_value<R: Rng>(
    task: &Task,
    values: &mut [Value],
    var: usize,
    rng: &mut R,
) -> bool {
    let old = values[var];
    let mut domain: Vec<Value> = (0..task.domain_sizes()[var] as Value).collect();
    domain.shuffle(rng);
    for value in domain {
        values[var] = value;
        if !contains_mutex_with_variable(task, var, values, 0) {
            return true;
        }
    }
    values[var] = old;
    false
}

/// A full assignment: every variable holds a domain value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    inner: PartialAssignment,
}

impl State {
    pub fn from_values(task: &Task, values: Vec<Value>) -> Result<Self, TaskError> {
        if values.len() != task.num_variables() {
            return Err(TaskError::StateLength {
                expected: task.num_variables(),
                actual: values.len(),
            });
        }
        for (var, &value) in values.iter().enumerate() {
            let fact = Fact::new(var, value);
            if !in_domain(task.domain_sizes(), fact) {
                return Err(TaskError::FactOutOfRange {
                    context: "state".to_string(),
                    fact,
                });
            }
        }
        Ok(Self::from_trusted(values))
    }

    /// Caller guarantees length and domains (task-validated data).
    pub(crate) fn from_trusted(values: Vec<Value>) -> Self {
        debug_assert!(values.iter().all(|&v| v != UNASSIGNED));
        Self {
            inner: PartialAssignment { values },
        }
    }

    #[inline]
    pub fn get(&self, var: usize) -> Value {
        self.inner.values[var]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.inner.values
    }

    pub fn as_partial(&self) -> &PartialAssignment {
        &self.inner
    }

    pub fn satisfies(&self, facts: &[Fact]) -> bool {
        facts.iter().all(|f| self.get(f.var) == f.value)
    }

    /// Apply `op`; effects fire if their conditions hold in `self`.
    pub fn successor(&self, op: &Operator) -> State {
        debug_assert!(op.is_applicable(self), "operator '{}' not applicable", op.name);
        let mut values = self.inner.values.clone();
        for eff in &op.effects {
            if self.satisfies(&eff.conditions) {
                values[eff.fact.var] = eff.fact.value;
            }
        }
        Self::from_trusted(values)
    }
}

impl From<State> for PartialAssignment {
    fn from(state: State) -> Self {
        state.inner
    }
}
