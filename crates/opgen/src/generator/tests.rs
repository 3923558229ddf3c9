use super::*;
use crate::regression::IndexedOperator;
use crate::task::{Fact, OperatorId, PartialAssignment, State, Value};
use proptest::prelude::*;

#[derive(Clone, Debug)]
struct TestOp {
    id: usize,
    pre: Vec<Fact>,
}

impl IndexedOperator for TestOp {
    fn operator_id(&self) -> OperatorId {
        OperatorId(self.id)
    }

    fn precondition_facts(&self) -> Vec<Fact> {
        self.pre.clone()
    }
}

fn op(id: usize, pre: &[(usize, Value)]) -> TestOp {
    TestOp {
        id,
        pre: pre.iter().map(|&(v, x)| Fact::new(v, x)).collect(),
    }
}

fn partial(values: &[Option<Value>]) -> PartialAssignment {
    let mut p = PartialAssignment::unassigned(values.len());
    for (var, &value) in values.iter().enumerate() {
        p.set(var, value);
    }
    p
}

fn full(values: &[Value]) -> PartialAssignment {
    State::from_trusted(values.to_vec()).into()
}

fn query(tree: &GeneratorTree, p: &PartialAssignment) -> Vec<usize> {
    let mut out = Vec::new();
    tree.generate_applicable_ops(p, &mut out);
    out.into_iter().map(|id| id.0).collect()
}

fn applicable_reference(ops: &[TestOp], p: &PartialAssignment) -> Vec<usize> {
    let mut ids: Vec<usize> = ops
        .iter()
        .filter(|op| op.pre.iter().all(|f| p.get(f.var).map_or(true, |v| v == f.value)))
        .map(|op| op.id)
        .collect();
    ids.sort_unstable();
    ids
}

#[test]
fn single_operator_over_three_booleans() {
    let tree = GeneratorFactory::new(&[2, 2, 2]).build(vec![op(0, &[(0, 1)])]);
    assert_eq!(query(&tree, &full(&[1, 0, 0])), vec![0]);
    assert!(query(&tree, &full(&[0, 0, 0])).is_empty());
    assert_eq!(query(&tree, &partial(&[None, Some(0), Some(0)])), vec![0]);
}

#[test]
fn empty_operator_list_yields_empty_fork() {
    let tree = GeneratorFactory::new(&[3, 2]).build(Vec::<TestOp>::new());
    assert_eq!(tree.root(), &GeneratorNode::ForkMulti(Vec::new()));
    assert!(query(&tree, &full(&[2, 1])).is_empty());
    assert!(query(&tree, &partial(&[None, None])).is_empty());
    assert_eq!(tree.generate_min_applicable_op(&full(&[0, 0]), false), None);
}

#[test]
fn equal_preconditions_keep_id_order_regardless_of_input_order() {
    for ops in [
        vec![op(3, &[(0, 0)]), op(1, &[(0, 0)])],
        vec![op(1, &[(0, 0)]), op(3, &[(0, 0)])],
    ] {
        let tree = GeneratorFactory::new(&[2]).build(ops);
        assert_eq!(query(&tree, &full(&[0])), vec![1, 3]);
        assert_eq!(query(&tree, &partial(&[None])), vec![1, 3]);
    }
}

#[test]
fn operators_without_precondition_come_first() {
    let ops = vec![op(0, &[(1, 1)]), op(1, &[]), op(2, &[(0, 0)])];
    let tree = GeneratorFactory::new(&[2, 2]).build(ops);
    assert_eq!(query(&tree, &full(&[0, 1])), vec![1, 2, 0]);
}

#[test]
#[should_panic(expected = "assignment length")]
fn wrong_length_query_panics() {
    let tree = GeneratorFactory::new(&[2, 2]).build(vec![op(0, &[(0, 1)])]);
    query(&tree, &full(&[1, 0, 0]));
}

#[test]
#[should_panic(expected = "operator 7")]
fn out_of_domain_precondition_panics() {
    GeneratorFactory::new(&[2, 2]).build(vec![op(7, &[(1, 2)])]);
}

#[test]
#[should_panic(expected = "operator 2")]
fn unknown_variable_panics() {
    GeneratorFactory::new(&[2]).build(vec![op(2, &[(5, 0)])]);
}

#[test]
fn covers_all_values_is_recorded() {
    let tree = GeneratorFactory::new(&[2, 3]).build(vec![
        op(0, &[(0, 0)]),
        op(1, &[(0, 1)]),
        op(2, &[(0, 1), (1, 2)]),
    ]);
    let GeneratorNode::Switch(top) = tree.root() else {
        panic!("expected switch root, got {:?}", tree.root());
    };
    assert_eq!(top.var, 0);
    assert!(top.covers_all_values);
    let inner = top.children.get(1).expect("child for v0=1");
    let GeneratorNode::ForkBinary(pair) = inner else {
        panic!("expected fork under v0=1, got {inner:?}");
    };
    let GeneratorNode::Switch(v1) = &pair.1 else {
        panic!("expected switch on v1, got {:?}", pair.1);
    };
    assert!(!v1.covers_all_values);
    assert!(matches!(v1.children, SwitchChildren::Single { value: 2, .. }));
}

#[test]
fn min_probe_with_and_without_reject() {
    let both = GeneratorFactory::new(&[2]).build(vec![op(0, &[(0, 0)]), op(1, &[(0, 1)])]);
    let wildcard = partial(&[None]);
    assert_eq!(both.generate_min_applicable_op(&wildcard, false), Some(OperatorId(0)));
    assert_eq!(both.generate_min_applicable_op(&wildcard, true), Some(OperatorId(1)));
    assert_eq!(both.generate_min_applicable_op(&full(&[1]), true), Some(OperatorId(1)));

    let one = GeneratorFactory::new(&[2]).build(vec![op(0, &[(0, 0)])]);
    assert_eq!(one.generate_min_applicable_op(&wildcard, false), Some(OperatorId(0)));
    assert_eq!(one.generate_min_applicable_op(&wildcard, true), None);

    let with_free = GeneratorFactory::new(&[2]).build(vec![op(0, &[(0, 0)]), op(5, &[])]);
    assert_eq!(with_free.generate_min_applicable_op(&wildcard, true), Some(OperatorId(5)));
    assert_eq!(with_free.generate_min_applicable_op(&wildcard, false), Some(OperatorId(0)));
}

#[test]
fn reject_fails_when_any_child_fails() {
    // v0=0 leads to a switch on v1 that only covers v1=1.
    let tree = GeneratorFactory::new(&[2, 2]).build(vec![
        op(0, &[(0, 0), (1, 1)]),
        op(1, &[(0, 1)]),
    ]);
    assert_eq!(tree.generate_min_applicable_op(&partial(&[None, None]), true), None);
    assert_eq!(
        tree.generate_min_applicable_op(&partial(&[None, Some(1)]), true),
        Some(OperatorId(1))
    );
}

#[test]
fn layout_policy_controls_switch_storage() {
    let ops = vec![op(0, &[(0, 0)]), op(1, &[(0, 2)]), op(2, &[(1, 1)])];
    let dense = GeneratorFactory::new(&[3, 2]).with_policy(AlwaysDense).build(ops.clone());
    let sparse = GeneratorFactory::new(&[3, 2]).with_policy(AlwaysSparse).build(ops);
    let (d, s) = (dense.stats(), sparse.stats());
    assert_eq!((d.dense_switches, d.sparse_switches, d.single_switches), (1, 0, 1));
    assert_eq!((s.dense_switches, s.sparse_switches, s.single_switches), (0, 1, 1));
    for state in [[0, 0], [0, 1], [2, 1], [1, 0]] {
        assert_eq!(query(&dense, &full(&state)), query(&sparse, &full(&state)));
    }
}

#[test]
fn stats_count_nodes_and_operators() {
    let tree = GeneratorFactory::new(&[2, 2]).build(vec![
        op(0, &[]),
        op(1, &[]),
        op(2, &[(0, 1), (1, 0)]),
        op(3, &[(1, 1)]),
    ]);
    let stats = tree.stats();
    assert_eq!(stats.operators, 4);
    assert_eq!(stats.leaves, 3);
    assert_eq!(stats.forks, 1);
    assert_eq!(stats.switches(), 3);
    assert_eq!(stats.max_switch_depth, 2);
    assert_eq!(stats.nodes(), 7);
}

#[test]
fn tree_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GeneratorTree>();
}

#[derive(Clone, Debug)]
struct Instance {
    domains: Vec<usize>,
    ops: Vec<TestOp>,
    state: Vec<Value>,
    mask: Vec<bool>,
}

impl Instance {
    fn full(&self) -> PartialAssignment {
        full(&self.state)
    }

    /// The state with masked variables freed; `full()` is one of its completions.
    fn partial(&self) -> PartialAssignment {
        let values: Vec<Option<Value>> = self
            .state
            .iter()
            .zip(&self.mask)
            .map(|(&v, &free)| (!free).then_some(v))
            .collect();
        partial(&values)
    }
}

fn arb_instance() -> impl Strategy<Value = Instance> {
    prop::collection::vec(1usize..=4, 1..=5)
        .prop_flat_map(|domains| {
            let pre: Vec<_> = domains
                .iter()
                .map(|&d| prop::option::weighted(0.4, 0..d as Value))
                .collect();
            let state: Vec<_> = domains.iter().map(|&d| 0..d as Value).collect();
            let mask = prop::collection::vec(any::<bool>(), domains.len());
            (Just(domains), prop::collection::vec(pre, 0..16), state, mask)
        })
        .prop_map(|(domains, pres, state, mask)| {
            let ops = pres
                .into_iter()
                .enumerate()
                .map(|(id, pre)| TestOp {
                    id,
                    pre: pre
                        .into_iter()
                        .enumerate()
                        .filter_map(|(var, value)| value.map(|x| Fact::new(var, x)))
                        .rev()
                        .collect(),
                })
                .collect();
            Instance {
                domains,
                ops,
                state,
                mask,
            }
        })
}

proptest! {
    /// Full states: every applicable operator exactly once, nothing else.
    #[test]
    fn full_state_query_is_complete_and_sound(inst in arb_instance()) {
        let tree = GeneratorFactory::new(&inst.domains).build(inst.ops.clone());
        let mut got = query(&tree, &inst.full());
        got.sort_unstable();
        prop_assert_eq!(got, applicable_reference(&inst.ops, &inst.full()));
    }

    #[test]
    fn wildcards_only_add_candidates(inst in arb_instance()) {
        let tree = GeneratorFactory::new(&inst.domains).build(inst.ops.clone());
        let mut wide = query(&tree, &inst.partial());
        wide.sort_unstable();
        let narrow = query(&tree, &inst.full());
        prop_assert!(narrow.iter().all(|id| wide.binary_search(id).is_ok()));
        prop_assert_eq!(wide, applicable_reference(&inst.ops, &inst.partial()));
    }

    #[test]
    fn construction_is_deterministic(inst in arb_instance()) {
        let factory = GeneratorFactory::new(&inst.domains);
        let first = factory.build(inst.ops.clone());
        let again = factory.build(inst.ops.clone());
        let reversed = factory.build(inst.ops.iter().rev().cloned());
        prop_assert_eq!(&first, &again);
        let expected = query(&first, &inst.partial());
        prop_assert_eq!(&query(&again, &inst.partial()), &expected);
        prop_assert_eq!(&query(&reversed, &inst.partial()), &expected);
    }

    #[test]
    fn layouts_agree(inst in arb_instance()) {
        let dense = GeneratorFactory::new(&inst.domains).with_policy(AlwaysDense).build(inst.ops.clone());
        let sparse = GeneratorFactory::new(&inst.domains).with_policy(AlwaysSparse).build(inst.ops.clone());
        let default = GeneratorFactory::new(&inst.domains).build(inst.ops.clone());
        let p = inst.partial();
        prop_assert_eq!(query(&dense, &p), query(&sparse, &p));
        prop_assert_eq!(query(&dense, &p), query(&default, &p));
        prop_assert_eq!(dense.stats().operators, inst.ops.len());
    }

    #[test]
    fn min_probe_matches_collect_all(inst in arb_instance()) {
        let tree = GeneratorFactory::new(&inst.domains).build(inst.ops.clone());
        for p in [inst.full(), inst.partial()] {
            let expected = query(&tree, &p).into_iter().min().map(OperatorId);
            prop_assert_eq!(tree.generate_min_applicable_op(&p, false), expected);
        }
        prop_assert_eq!(
            tree.generate_min_applicable_op(&inst.full(), true),
            tree.generate_min_applicable_op(&inst.full(), false)
        );
    }

    /// A rejecting probe bounds the best operator of every completion.
    #[test]
    fn rejecting_probe_is_pessimistic(inst in arb_instance()) {
        let tree = GeneratorFactory::new(&inst.domains).build(inst.ops.clone());
        if let Some(bound) = tree.generate_min_applicable_op(&inst.partial(), true) {
            let best = query(&tree, &inst.full()).into_iter().min();
            prop_assert!(best.is_some_and(|id| id <= bound.0));
        }
    }
}
