//! Node types of the generator tree.
//!
//! Kept small and explicit to make `build` and `query` easy to read. The node
//! set is closed; both query modes dispatch with a `match`.

use indexmap::IndexMap;

use crate::task::{OperatorId, Value};

/// One node of the decision tree. Children are owned; nothing is shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeneratorNode {
    /// Two independent subtrees, both queried.
    ForkBinary(Box<(GeneratorNode, GeneratorNode)>),
    /// Any number of independent subtrees. Zero children only for the empty root.
    ForkMulti(Vec<GeneratorNode>),
    Switch(Switch),
    LeafSingle(OperatorId),
    LeafMulti(Vec<OperatorId>),
}

/// Dispatch on the value of `var`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Switch {
    pub var: usize,
    /// A child exists for every value in the variable's domain.
    pub covers_all_values: bool,
    pub children: SwitchChildren,
}

/// Storage of a switch's children, chosen at construction time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwitchChildren {
    /// Indexed by value; `None` for values without operators.
    Dense(Vec<Option<GeneratorNode>>),
    /// Populated values only, in ascending value order.
    Sparse(IndexMap<Value, GeneratorNode>),
    Single {
        value: Value,
        child: Box<GeneratorNode>,
    },
}

impl SwitchChildren {
    /// Child for a concrete value, if any.
    #[inline]
    pub fn get(&self, value: Value) -> Option<&GeneratorNode> {
        match self {
            Self::Dense(children) => children.get(value as usize).and_then(Option::as_ref),
            Self::Sparse(children) => children.get(&value),
            Self::Single { value: v, child } => (*v == value).then_some(&**child),
        }
    }

    /// Populated children in ascending value order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &GeneratorNode> + '_> {
        match self {
            Self::Dense(children) => Box::new(children.iter().flatten()),
            Self::Sparse(children) => Box::new(children.values()),
            Self::Single { child, .. } => Box::new(std::iter::once(&**child)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Dense(children) => children.iter().filter(|c| c.is_some()).count(),
            Self::Sparse(children) => children.len(),
            Self::Single { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Node counts of a built tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub forks: usize,
    pub dense_switches: usize,
    pub sparse_switches: usize,
    pub single_switches: usize,
    pub leaves: usize,
    /// Operator ids stored in leaves (each indexed operator appears once).
    pub operators: usize,
    /// Longest root-to-leaf path, counted in switch nodes.
    pub max_switch_depth: usize,
}

impl GeneratorStats {
    pub fn switches(&self) -> usize {
        self.dense_switches + self.sparse_switches + self.single_switches
    }

    pub fn nodes(&self) -> usize {
        self.forks + self.switches() + self.leaves
    }
}

/// The immutable decision tree over operator preconditions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorTree {
    pub(crate) root: GeneratorNode,
    pub(crate) num_variables: usize,
}

impl GeneratorTree {
    pub fn root(&self) -> &GeneratorNode {
        &self.root
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn stats(&self) -> GeneratorStats {
        let mut stats = GeneratorStats::default();
        collect_stats(&self.root, 0, &mut stats);
        stats
    }
}

fn collect_stats(node: &GeneratorNode, depth: usize, stats: &mut GeneratorStats) {
    match node {
        GeneratorNode::ForkBinary(pair) => {
            stats.forks += 1;
            collect_stats(&pair.0, depth, stats);
            collect_stats(&pair.1, depth, stats);
        }
        GeneratorNode::ForkMulti(children) => {
            stats.forks += 1;
            for child in children {
                collect_stats(child, depth, stats);
            }
        }
        GeneratorNode::Switch(switch) => {
            match switch.children {
                SwitchChildren::Dense(_) => stats.dense_switches += 1,
                SwitchChildren::Sparse(_) => stats.sparse_switches += 1,
                SwitchChildren::Single { .. } => stats.single_switches += 1,
            }
            for child in switch.children.iter() {
                collect_stats(child, depth + 1, stats);
            }
        }
        GeneratorNode::LeafSingle(_) => {
            stats.leaves += 1;
            stats.operators += 1;
            stats.max_switch_depth = stats.max_switch_depth.max(depth);
        }
        GeneratorNode::LeafMulti(ops) => {
            stats.leaves += 1;
            stats.operators += ops.len();
            stats.max_switch_depth = stats.max_switch_depth.max(depth);
        }
    }
}
