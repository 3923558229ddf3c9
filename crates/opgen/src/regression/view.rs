//! The precondition view the generator factory indexes by.

use crate::task::{Fact, Operator, OperatorId};

/// An operator as seen by the generator factory: an id and a precondition.
///
/// Forward operators expose their preconditions directly; regression
/// operators expose their regression preconditions.
pub trait IndexedOperator {
    fn operator_id(&self) -> OperatorId;

    /// Precondition facts in any order; the factory sorts them.
    fn precondition_facts(&self) -> Vec<Fact>;
}

impl IndexedOperator for Operator {
    fn operator_id(&self) -> OperatorId {
        self.id
    }

    fn precondition_facts(&self) -> Vec<Fact> {
        self.preconditions.clone()
    }
}

impl<T: IndexedOperator + ?Sized> IndexedOperator for &T {
    fn operator_id(&self) -> OperatorId {
        (**self).operator_id()
    }

    fn precondition_facts(&self) -> Vec<Fact> {
        (**self).precondition_facts()
    }
}
