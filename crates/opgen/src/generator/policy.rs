//! Choice of switch storage (dense vector vs. sparse map).
//!
//! Only memory and lookup speed depend on this choice; query results do not.

use std::mem::size_of;

use indexmap::IndexMap;

use crate::task::Value;

use super::types::GeneratorNode;

/// Storage layout of a switch node with two or more children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchLayout {
    Dense,
    Sparse,
}

/// Decide the layout of a switch given the variable's domain size and the
/// number of populated values (always >= 2).
pub trait SwitchLayoutPolicy {
    fn layout(&self, domain_size: usize, num_children: usize) -> SwitchLayout;
}

/// Pick whichever layout has the smaller estimated footprint.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryEstimate;

#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysDense;

#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysSparse;

impl SwitchLayoutPolicy for MemoryEstimate {
    fn layout(&self, domain_size: usize, num_children: usize) -> SwitchLayout {
        if estimate_sparse_bytes(num_children) < estimate_dense_bytes(domain_size) {
            SwitchLayout::Sparse
        } else {
            SwitchLayout::Dense
        }
    }
}

impl SwitchLayoutPolicy for AlwaysDense {
    fn layout(&self, _domain_size: usize, _num_children: usize) -> SwitchLayout {
        SwitchLayout::Dense
    }
}

impl SwitchLayoutPolicy for AlwaysSparse {
    fn layout(&self, _domain_size: usize, _num_children: usize) -> SwitchLayout {
        SwitchLayout::Sparse
    }
}

impl<F> SwitchLayoutPolicy for F
where
    F: Fn(usize, usize) -> SwitchLayout,
{
    fn layout(&self, domain_size: usize, num_children: usize) -> SwitchLayout {
        self(domain_size, num_children)
    }
}

/// Allocator bookkeeping per heap block.
const ALLOC_OVERHEAD: usize = 2 * size_of::<usize>();

/// `Vec<Option<GeneratorNode>>` with one slot per domain value.
pub fn estimate_dense_bytes(domain_size: usize) -> usize {
    ALLOC_OVERHEAD
        + size_of::<Vec<Option<GeneratorNode>>>()
        + domain_size * size_of::<Option<GeneratorNode>>()
}

/// `IndexMap<Value, GeneratorNode>`: an entry vector (hash, key, value) plus a
/// hashbrown index table sized for 7/8 load and one control byte per bucket.
pub fn estimate_sparse_bytes(num_children: usize) -> usize {
    let entry = size_of::<u64>() + size_of::<Value>() + size_of::<GeneratorNode>();
    let buckets = (num_children * 8 / 7).max(4).next_power_of_two();
    2 * ALLOC_OVERHEAD
        + size_of::<IndexMap<Value, GeneratorNode>>()
        + num_children * entry
        + buckets * (size_of::<usize>() + 1)
}
