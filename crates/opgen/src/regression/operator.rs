//! Regression ("backward") operators derived from forward operators.
//!
//! Rules, per variable `v` of a forward operator:
//! 1. `pre(v) = x`, unconditional `eff(v) = y`  =>  `rpre(v) = y`, `reff(v) = x`
//! 2. `pre(v) = x`, no effect on `v`            =>  `rpre(v) = x`, `reff(v) = x`
//! 3. no `pre(v)`, unconditional `eff(v) = y`   =>  `rpre(v) = y`, `reff(v) = free`
//! 4. `pre(v) = x`, conditional effect on `v`   =>  no `rpre(v)`, `reff(v) = x`
//! 5. no `pre(v)`, conditional effect on `v`    =>  no `rpre(v)`, `reff(v) = free`
//!    unless the successor rules the effect out.
//!
//! Case 2 keeps `reff(v) = x` instead of leaving `v` alone: a free `v` in the
//! successor must become `x` in the predecessor.
//!
//! Effect conditions talk about the forward pre-state. A condition on a
//! precondition variable is decided when the operator is built; a condition on
//! a variable the operator may change says nothing about the successor, so the
//! effect frees `v` unconditionally. Only conditions on untouched variables
//! survive, and they are read off the successor, where those variables still
//! hold their pre-state values.

use std::collections::{BTreeMap, BTreeSet};

use crate::task::{Fact, Operator, OperatorId, PartialAssignment, Value};

use super::view::IndexedOperator;

/// Effect of a regression operator: set `var` to `value` (`None` frees it).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegressionEffect {
    pub var: usize,
    pub value: Option<Value>,
    /// Facts on variables the forward operator leaves untouched. The effect
    /// is skipped if `assignment` contradicts one of them.
    pub conditions: Vec<Fact>,
}

impl RegressionEffect {
    /// No condition is assigned to a different value in `assignment`.
    pub fn fires(&self, assignment: &PartialAssignment) -> bool {
        self.conditions
            .iter()
            .all(|c| assignment.get(c.var).map_or(true, |v| v == c.value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegressionOperator {
    id: OperatorId,
    cost: u32,
    name: String,
    preconditions: Vec<Fact>,
    effects: Vec<RegressionEffect>,
    original_effect_vars: BTreeSet<usize>,
}

impl RegressionOperator {
    pub fn from_operator(op: &Operator) -> Self {
        let mut original_effect_vars = BTreeSet::new();
        let mut conditional_vars = BTreeSet::new();
        for eff in &op.effects {
            original_effect_vars.insert(eff.fact.var);
            if eff.is_conditional() {
                conditional_vars.insert(eff.fact.var);
            }
        }
        // A variable counts as unconditionally set only if no effect on it
        // has a condition; the last listed effect wins, as in `successor`.
        let unconditional: BTreeMap<usize, Value> = op
            .effects
            .iter()
            .filter(|eff| !conditional_vars.contains(&eff.fact.var))
            .map(|eff| (eff.fact.var, eff.fact.value))
            .collect();
        let pre_values: BTreeMap<usize, Value> =
            op.preconditions.iter().map(|f| (f.var, f.value)).collect();

        let mut preconditions = Vec::new();
        let mut effects = Vec::new();
        for (&var, &x) in &pre_values {
            if !conditional_vars.contains(&var) {
                let rpre = unconditional.get(&var).copied().unwrap_or(x);
                preconditions.push(Fact::new(var, rpre));
            }
            effects.push(RegressionEffect {
                var,
                value: Some(x),
                conditions: Vec::new(),
            });
        }
        for (&var, &value) in &unconditional {
            if !pre_values.contains_key(&var) {
                preconditions.push(Fact::new(var, value));
                effects.push(RegressionEffect {
                    var,
                    value: None,
                    conditions: Vec::new(),
                });
            }
        }
        for eff in op.effects.iter().filter(|e| e.is_conditional()) {
            let var = eff.fact.var;
            if pre_values.contains_key(&var) {
                continue;
            }
            let mut conditions = Vec::new();
            let mut possible = true;
            let mut unknown = false;
            for c in &eff.conditions {
                if let Some(&x) = pre_values.get(&c.var) {
                    possible &= x == c.value;
                } else if original_effect_vars.contains(&c.var) {
                    unknown = true;
                } else {
                    conditions.push(*c);
                }
            }
            if !possible {
                // Never fires going forward; `var` keeps its value.
                continue;
            }
            if unknown {
                conditions.clear();
            }
            effects.push(RegressionEffect {
                var,
                value: None,
                conditions,
            });
        }

        Self {
            id: op.id,
            cost: op.cost,
            name: op.name.clone(),
            preconditions,
            effects,
            original_effect_vars,
        }
    }

    pub fn id(&self) -> OperatorId {
        self.id
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn name(&self) -> String {
        format!("Regression{}", self.name)
    }

    pub fn original_name(&self) -> &str {
        &self.name
    }

    pub fn preconditions(&self) -> &[Fact] {
        &self.preconditions
    }

    pub fn effects(&self) -> &[RegressionEffect] {
        &self.effects
    }

    pub fn original_effect_vars(&self) -> &BTreeSet<usize> {
        &self.original_effect_vars
    }

    /// Some variable the forward operator writes is assigned in `assignment`.
    ///
    /// Regressing through an operator that touches none of the assigned
    /// variables makes no progress towards the subgoal.
    pub fn achieves_subgoal(&self, assignment: &PartialAssignment) -> bool {
        self.original_effect_vars
            .iter()
            .any(|&var| assignment.is_assigned(var))
    }

    pub fn is_applicable(&self, assignment: &PartialAssignment) -> bool {
        self.achieves_subgoal(assignment)
            && self
                .preconditions
                .iter()
                .all(|pre| assignment.get(pre.var).map_or(true, |v| v == pre.value))
    }

    /// The partial predecessor of `assignment`: firing effects applied,
    /// everything else copied.
    pub fn predecessor(&self, assignment: &PartialAssignment) -> PartialAssignment {
        let mut out = assignment.clone();
        for eff in &self.effects {
            if eff.fires(assignment) {
                out.set(eff.var, eff.value);
            }
        }
        out
    }
}

impl IndexedOperator for RegressionOperator {
    fn operator_id(&self) -> OperatorId {
        self.id
    }

    fn precondition_facts(&self) -> Vec<Fact> {
        self.preconditions.clone()
    }
}
