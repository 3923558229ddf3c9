use indexmap::IndexSet;

use crate::task::PartialAssignment;

/// Interns partial assignments as dense ids `0..len()`, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct PartialAssignmentRegistry {
    assignments: IndexSet<PartialAssignment>,
}

impl PartialAssignmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `assignment`, registering it if unseen.
    pub fn lookup_or_insert(&mut self, assignment: PartialAssignment) -> usize {
        self.assignments.insert_full(assignment).0
    }

    /// Panics for an id that was never handed out.
    pub fn lookup(&self, id: usize) -> &PartialAssignment {
        match self.assignments.get_index(id) {
            Some(assignment) => assignment,
            None => panic!("unknown partial assignment id {id}"),
        }
    }

    pub fn id_of(&self, assignment: &PartialAssignment) -> Option<usize> {
        self.assignments.get_index_of(assignment)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &PartialAssignment)> {
        self.assignments.iter().enumerate()
    }
}
