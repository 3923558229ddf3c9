//! Tree construction from a flat operator list.
//!
//! Operators are sorted by their sorted precondition (ties by id) once up
//! front. Every recursive call then works on a contiguous range that shares the
//! first `depth` precondition facts, so grouping by the fact at `depth` never
//! needs to re-sort.

use indexmap::IndexMap;
use tracing::debug;

use crate::regression::IndexedOperator;
use crate::task::{Fact, OperatorId, Value};

use super::policy::{MemoryEstimate, SwitchLayout, SwitchLayoutPolicy};
use super::types::{GeneratorNode, GeneratorTree, Switch, SwitchChildren};

/// One operator as seen by the factory.
#[derive(Clone, Debug, PartialEq, Eq)]
struct OperatorInfo {
    id: OperatorId,
    precondition: Vec<Fact>,
}

impl OperatorInfo {
    #[inline]
    fn fact_at(&self, depth: usize) -> Option<Fact> {
        self.precondition.get(depth).copied()
    }
}

/// Builds generator trees for one set of domain sizes.
#[derive(Clone, Debug)]
pub struct GeneratorFactory<P = MemoryEstimate> {
    domain_sizes: Vec<usize>,
    policy: P,
}

impl GeneratorFactory<MemoryEstimate> {
    pub fn new(domain_sizes: &[usize]) -> Self {
        Self {
            domain_sizes: domain_sizes.to_vec(),
            policy: MemoryEstimate,
        }
    }
}

impl<P: SwitchLayoutPolicy> GeneratorFactory<P> {
    /// Replace the switch layout policy.
    pub fn with_policy<Q: SwitchLayoutPolicy>(self, policy: Q) -> GeneratorFactory<Q> {
        GeneratorFactory {
            domain_sizes: self.domain_sizes,
            policy,
        }
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    /// Build the tree over `ops`.
    ///
    /// Panics if a precondition names a variable or value outside the
    /// declared domains.
    pub fn build<O, I>(&self, ops: I) -> GeneratorTree
    where
        O: IndexedOperator,
        I: IntoIterator<Item = O>,
    {
        let mut infos: Vec<OperatorInfo> = ops
            .into_iter()
            .map(|op| self.operator_info(&op))
            .collect();
        infos.sort_by(|a, b| {
            a.precondition
                .cmp(&b.precondition)
                .then_with(|| a.id.cmp(&b.id))
        });
        debug!(operators = infos.len(), "building generator tree");
        let root = self.construct_recursive(0, &infos);
        GeneratorTree {
            root,
            num_variables: self.domain_sizes.len(),
        }
    }

    fn operator_info<O: IndexedOperator>(&self, op: &O) -> OperatorInfo {
        let id = op.operator_id();
        let mut precondition = op.precondition_facts();
        for fact in &precondition {
            assert!(
                fact.var < self.domain_sizes.len()
                    && (fact.value as usize) < self.domain_sizes[fact.var],
                "operator {} has precondition {} outside the declared domains",
                id.0,
                fact
            );
        }
        precondition.sort_unstable();
        precondition.dedup();
        OperatorInfo { id, precondition }
    }

    fn construct_recursive(&self, depth: usize, range: &[OperatorInfo]) -> GeneratorNode {
        let mut nodes = Vec::new();
        for group in contiguous_groups(range, |info| info.fact_at(depth).map(|f| f.var)) {
            match group[0].fact_at(depth) {
                // Exhausted preconditions sort first within the shared prefix.
                None => nodes.push(construct_leaf(group)),
                Some(fact) => nodes.push(self.construct_switch(fact.var, depth, group)),
            }
        }
        construct_fork(nodes)
    }

    fn construct_switch(&self, var: usize, depth: usize, group: &[OperatorInfo]) -> GeneratorNode {
        let mut children: Vec<(Value, GeneratorNode)> = Vec::new();
        for sub in contiguous_groups(group, |info| info.fact_at(depth).map(|f| f.value)) {
            let value = sub[0].precondition[depth].value;
            children.push((value, self.construct_recursive(depth + 1, sub)));
        }

        let domain_size = self.domain_sizes[var];
        let covers_all_values = children.len() == domain_size;
        let children = if children.len() == 1 {
            let (value, child) = children.remove(0);
            SwitchChildren::Single {
                value,
                child: Box::new(child),
            }
        } else {
            match self.policy.layout(domain_size, children.len()) {
                SwitchLayout::Dense => {
                    let mut slots: Vec<Option<GeneratorNode>> =
                        (0..domain_size).map(|_| None).collect();
                    for (value, child) in children {
                        slots[value as usize] = Some(child);
                    }
                    SwitchChildren::Dense(slots)
                }
                SwitchLayout::Sparse => {
                    SwitchChildren::Sparse(children.into_iter().collect::<IndexMap<_, _>>())
                }
            }
        };
        GeneratorNode::Switch(Switch {
            var,
            covers_all_values,
            children,
        })
    }
}

fn construct_leaf(group: &[OperatorInfo]) -> GeneratorNode {
    match group {
        [single] => GeneratorNode::LeafSingle(single.id),
        _ => GeneratorNode::LeafMulti(group.iter().map(|info| info.id).collect()),
    }
}

fn construct_fork(mut nodes: Vec<GeneratorNode>) -> GeneratorNode {
    match nodes.len() {
        1 => nodes.swap_remove(0),
        2 => {
            let second = nodes.swap_remove(1);
            let first = nodes.swap_remove(0);
            GeneratorNode::ForkBinary(Box::new((first, second)))
        }
        _ => GeneratorNode::ForkMulti(nodes),
    }
}

/// Split a sorted slice into maximal runs with equal `key`.
fn contiguous_groups<K, F>(range: &[OperatorInfo], key: F) -> Vec<&[OperatorInfo]>
where
    K: PartialEq,
    F: Fn(&OperatorInfo) -> K,
{
    let mut groups = Vec::new();
    let mut start = 0;
    while start < range.len() {
        let current = key(&range[start]);
        let mut end = start + 1;
        while end < range.len() && key(&range[end]) == current {
            end += 1;
        }
        groups.push(&range[start..end]);
        start = end;
    }
    groups
}
