//! Per-task memoization of built generators.
//!
//! A slot holds at most one value, tagged with the task it was built for.
//! Asking for another task replaces it. Callers keep their `Arc`, so a
//! replacement never invalidates a generator that is still in use.

use std::sync::{Arc, PoisonError, RwLock};

use crate::task::{Task, TaskId};

use super::{PredecessorGenerator, SuccessorGenerator};

#[derive(Debug)]
pub struct PerTaskSlot<T> {
    slot: RwLock<Option<(TaskId, Arc<T>)>>,
}

impl<T> Default for PerTaskSlot<T> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<T> PerTaskSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value for `task_id`, building it with `build` if the slot is
    /// empty or holds another task's value.
    pub fn get_or_build<F>(&self, task_id: TaskId, build: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(task_id) {
            return value;
        }
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have filled the slot meanwhile.
        if let Some((id, value)) = guard.as_ref() {
            if *id == task_id {
                return Arc::clone(value);
            }
            tracing::debug!(old = ?id, new = ?task_id, "replacing per-task slot");
        }
        let value = Arc::new(build());
        *guard = Some((task_id, Arc::clone(&value)));
        value
    }

    /// The cached value if it belongs to `task_id`.
    pub fn get(&self, task_id: TaskId) -> Option<Arc<T>> {
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some((id, value)) if *id == task_id => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Task the slot currently holds a value for.
    pub fn current_task(&self) -> Option<TaskId> {
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(|(id, _)| *id)
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Forward and backward generators for the most recently used task.
#[derive(Debug, Default)]
pub struct GeneratorCache {
    successors: PerTaskSlot<SuccessorGenerator>,
    predecessors: PerTaskSlot<PredecessorGenerator>,
}

impl GeneratorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successor_generator(&self, task: &Task) -> Arc<SuccessorGenerator> {
        self.successors
            .get_or_build(task.id(), || SuccessorGenerator::new(task))
    }

    pub fn predecessor_generator(&self, task: &Task) -> Arc<PredecessorGenerator> {
        self.predecessors
            .get_or_build(task.id(), || PredecessorGenerator::from_task(task))
    }
}
