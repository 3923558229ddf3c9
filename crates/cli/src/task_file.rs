//! JSON task files.
//!
//! Facts are `[var, value]` pairs. Operator ids are implicit (list position).

use anyhow::{Context, Result};
use opgen::api::{Effect, Fact, MutexTable, Operator, OperatorId, Task, Value, Variable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

type FactSpec = (usize, Value);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub domain_size: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub fact: FactSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<FactSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperatorSpec {
    pub name: String,
    #[serde(default = "unit_cost")]
    pub cost: u32,
    #[serde(default)]
    pub preconditions: Vec<FactSpec>,
    pub effects: Vec<EffectSpec>,
}

fn unit_cost() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskFile {
    pub variables: Vec<VariableSpec>,
    pub operators: Vec<OperatorSpec>,
    pub initial_state: Vec<Value>,
    #[serde(default)]
    pub goal: Vec<FactSpec>,
    #[serde(default)]
    pub mutexes: Vec<(FactSpec, FactSpec)>,
}

fn fact((var, value): FactSpec) -> Fact {
    Fact::new(var, value)
}

fn spec(f: &Fact) -> FactSpec {
    (f.var, f.value)
}

impl TaskFile {
    pub fn into_task(self) -> Result<Task> {
        let variables = self
            .variables
            .into_iter()
            .map(|v| Variable {
                name: v.name,
                domain_size: v.domain_size,
            })
            .collect();
        let operators = self
            .operators
            .into_iter()
            .enumerate()
            .map(|(i, op)| Operator {
                id: OperatorId(i),
                name: op.name,
                cost: op.cost,
                preconditions: op.preconditions.into_iter().map(fact).collect(),
                effects: op
                    .effects
                    .into_iter()
                    .map(|e| Effect {
                        fact: fact(e.fact),
                        conditions: e.conditions.into_iter().map(fact).collect(),
                    })
                    .collect(),
            })
            .collect();
        let goal = self.goal.into_iter().map(fact).collect();
        let mutexes: MutexTable = self
            .mutexes
            .into_iter()
            .map(|(a, b)| (fact(a), fact(b)))
            .collect();
        Ok(Task::new(
            variables,
            operators,
            self.initial_state,
            goal,
            mutexes,
        )?)
    }

    /// Mutex pairs are written sorted so equal tasks give equal files.
    pub fn from_task(task: &Task) -> Self {
        let mut mutexes: Vec<(FactSpec, FactSpec)> = task
            .mutexes()
            .iter()
            .map(|(a, b)| (spec(a), spec(b)))
            .collect();
        mutexes.sort_unstable();
        Self {
            variables: task
                .variables()
                .iter()
                .map(|v| VariableSpec {
                    name: v.name.clone(),
                    domain_size: v.domain_size,
                })
                .collect(),
            operators: task
                .operators()
                .iter()
                .map(|op| OperatorSpec {
                    name: op.name.clone(),
                    cost: op.cost,
                    preconditions: op.preconditions.iter().map(spec).collect(),
                    effects: op
                        .effects
                        .iter()
                        .map(|e| EffectSpec {
                            fact: spec(&e.fact),
                            conditions: e.conditions.iter().map(spec).collect(),
                        })
                        .collect(),
                })
                .collect(),
            initial_state: task.initial_state().values().to_vec(),
            goal: task.goal().iter().map(spec).collect(),
            mutexes,
        }
    }
}

pub fn load(path: &Path) -> Result<Task> {
    let bytes = fs::read(path).with_context(|| format!("reading task file {}", path.display()))?;
    let file: TaskFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing task file {}", path.display()))?;
    file.into_task()
        .with_context(|| format!("validating task file {}", path.display()))
}

pub fn save(path: &Path, task: &Task) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating task dir {}", parent.display()))?;
        }
    }
    let file = TaskFile::from_task(task);
    fs::write(path, serde_json::to_vec_pretty(&file)?)
        .with_context(|| format!("writing task file {}", path.display()))
}
