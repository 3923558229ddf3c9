//! Tree traversal: collect-all and minimum-id probe.

use crate::task::{OperatorId, PartialAssignment, Value, UNASSIGNED};

use super::types::{GeneratorNode, GeneratorTree, SwitchChildren};

impl GeneratorTree {
    /// Append every operator whose precondition is consistent with
    /// `assignment` to `out`, in traversal order.
    ///
    /// Unassigned variables match every value. Panics if `assignment` does
    /// not cover exactly the tree's variables.
    pub fn generate_applicable_ops(
        &self,
        assignment: &PartialAssignment,
        out: &mut Vec<OperatorId>,
    ) {
        self.check_len(assignment);
        collect(&self.root, assignment.raw(), out);
    }

    /// Smallest id among the applicable operators, or `None`.
    ///
    /// With `reject_unassigned` an unassigned switch variable only passes if
    /// the switch covers all values of the variable, and then yields the
    /// largest of the children's minima (`None` if any child has none). The
    /// result is then an upper bound on the smallest applicable id in every
    /// completion of `assignment`.
    pub fn generate_min_applicable_op(
        &self,
        assignment: &PartialAssignment,
        reject_unassigned: bool,
    ) -> Option<OperatorId> {
        self.check_len(assignment);
        min_op(&self.root, assignment.raw(), reject_unassigned)
    }

    #[inline]
    fn check_len(&self, assignment: &PartialAssignment) {
        assert_eq!(
            assignment.len(),
            self.num_variables,
            "assignment length does not match the generator's variable count"
        );
    }
}

fn collect(node: &GeneratorNode, values: &[Value], out: &mut Vec<OperatorId>) {
    match node {
        GeneratorNode::ForkBinary(pair) => {
            collect(&pair.0, values, out);
            collect(&pair.1, values, out);
        }
        GeneratorNode::ForkMulti(children) => {
            for child in children {
                collect(child, values, out);
            }
        }
        GeneratorNode::Switch(switch) => {
            let value = values[switch.var];
            if value != UNASSIGNED {
                if let Some(child) = switch.children.get(value) {
                    collect(child, values, out);
                }
                return;
            }
            match &switch.children {
                SwitchChildren::Dense(children) => {
                    for child in children.iter().flatten() {
                        collect(child, values, out);
                    }
                }
                SwitchChildren::Sparse(children) => {
                    for child in children.values() {
                        collect(child, values, out);
                    }
                }
                SwitchChildren::Single { child, .. } => collect(child, values, out),
            }
        }
        GeneratorNode::LeafSingle(id) => out.push(*id),
        GeneratorNode::LeafMulti(ids) => out.extend_from_slice(ids),
    }
}

fn min_op(node: &GeneratorNode, values: &[Value], reject_unassigned: bool) -> Option<OperatorId> {
    match node {
        GeneratorNode::ForkBinary(pair) => {
            let a = min_op(&pair.0, values, reject_unassigned);
            let b = min_op(&pair.1, values, reject_unassigned);
            match (a, b) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }
        }
        GeneratorNode::ForkMulti(children) => children
            .iter()
            .filter_map(|child| min_op(child, values, reject_unassigned))
            .min(),
        GeneratorNode::Switch(switch) => {
            let value = values[switch.var];
            if value != UNASSIGNED {
                return switch
                    .children
                    .get(value)
                    .and_then(|child| min_op(child, values, reject_unassigned));
            }
            if !reject_unassigned {
                return switch
                    .children
                    .iter()
                    .filter_map(|child| min_op(child, values, reject_unassigned))
                    .min();
            }
            if !switch.covers_all_values {
                return None;
            }
            let mut worst = None;
            for child in switch.children.iter() {
                let best = min_op(child, values, reject_unassigned)?;
                worst = worst.max(Some(best));
            }
            worst
        }
        GeneratorNode::LeafSingle(id) => Some(*id),
        GeneratorNode::LeafMulti(ids) => ids.iter().min().copied(),
    }
}
